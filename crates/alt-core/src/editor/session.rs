//! Per-image edit session

use super::keys::ListenerId;
use super::state::SessionState;
use crate::error::EditorError;
use crate::types::{AssetId, SessionId};
use alt_dom::NodeId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Transient state of one image's edit interaction
///
/// Owns its cancellation token and key listener; both are released when the
/// editor closes the session.
#[derive(Debug)]
pub struct EditSession {
    /// Session id
    pub id: SessionId,
    /// Image being edited
    pub image: NodeId,
    /// Image `src` at open time
    pub source_locator: String,
    /// Asset confirmed by the bridge
    pub asset_id: Option<AssetId>,
    /// Asset id sniffed from markup
    pub hinted_id: Option<AssetId>,
    /// Value typed into the form
    pub pending: String,
    /// Current state
    pub state: SessionState,
    /// Mounted form, if any
    pub modal: Option<NodeId>,
    /// Last bridge failure shown to the user
    pub last_error: Option<EditorError>,
    /// When a succeeded form closes
    pub closes_at: Option<Instant>,
    pub(crate) cancel: CancellationToken,
    pub(crate) listener: Option<ListenerId>,
    pub(crate) generation: u64,
}

impl EditSession {
    pub(crate) fn new(image: NodeId, source_locator: String, hinted_id: Option<AssetId>) -> Self {
        Self {
            id: SessionId::new(),
            image,
            source_locator,
            asset_id: None,
            hinted_id,
            pending: String::new(),
            state: SessionState::Idle,
            modal: None,
            last_error: None,
            closes_at: None,
            cancel: CancellationToken::new(),
            listener: None,
            generation: 0,
        }
    }

    /// Asset the next save would target without re-resolving
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<AssetId> {
        self.asset_id.or(self.hinted_id)
    }

    /// Key listener held by this session
    #[inline]
    #[must_use]
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Move to `to` if the state machine allows it
    pub(crate) fn transition(&mut self, to: SessionState) -> Result<(), EditorError> {
        super::state::validate_transition(self.state, to)?;
        tracing::debug!(session = %self.id, from = ?self.state, to = ?to, "session transition");
        self.state = to;
        Ok(())
    }

    /// Start a new bridge call, invalidating outcomes of earlier ones
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
