//! Inline Editor
//!
//! One [`EditSession`] per image, driven through the [`SessionState`]
//! machine. The editor owns all sessions and is mutated from a single task.
//! Bridge work is handed back to the caller as `'static` futures
//! ([`PendingResolve`], [`PendingSave`]) so the owner keeps handling other
//! interactions while requests are outstanding; their outcomes are applied
//! with `complete_*`, which ignores anything that no longer matches the
//! session.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut editor = InlineEditor::new(bridge, EditorConfig::default());
//! let session = editor.open(&mut doc, image).await?;
//! editor.save(&mut doc, session, "A red bicycle").await?;
//! ```

pub mod keys;
pub mod session;
pub mod state;

pub use keys::{Key, KeyListeners, ListenerId};
pub use session::EditSession;
pub use state::{allowed_transitions, validate_transition, SessionState};

use crate::audit::image_element;
use crate::bridge::{bounded, AssetBridge};
use crate::config::EditorConfig;
use crate::error::{BridgeError, EditorError};
use crate::render::{self, NoticeKind};
use crate::types::{AssetId, ResolvedAsset, SessionId};
use alt_dom::{Document, NodeId};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::time::Instant;

/// Message raised outside a form, e.g. when resolution fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Session that raised it
    pub session: SessionId,
    /// Image concerned
    pub image: NodeId,
    /// User-facing text
    pub message: String,
}

/// Result of applying a bridge outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Outcome applied; the session moved on
    Applied,
    /// Bridge call failed; the user was told
    Failed(BridgeError),
    /// Outcome no longer matches a live session; nothing changed
    Ignored,
}

/// First half of opening a session
#[derive(Debug)]
pub enum OpenStep {
    /// Form is already mounted
    Ready(SessionId),
    /// Resolution must finish first
    Pending(PendingResolve),
}

/// Outcome of a resolution request
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    /// Session the request belongs to
    pub session: SessionId,
    generation: u64,
    /// `None` when the session was cancelled before the bridge answered
    pub result: Option<Result<ResolvedAsset, BridgeError>>,
}

/// Outcome of a save request
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Session the request belongs to
    pub session: SessionId,
    generation: u64,
    /// Value that was sent
    pub value: String,
    /// Asset written, or the failure
    pub result: Result<AssetId, BridgeError>,
}

/// In-flight resolution; await it, then pass the outcome to
/// [`InlineEditor::complete_open`]
#[must_use = "the session stays in Resolving until the outcome is applied"]
pub struct PendingResolve {
    session: SessionId,
    future: BoxFuture<'static, ResolveOutcome>,
}

impl PendingResolve {
    /// Session this request belongs to
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }
}

impl std::fmt::Debug for PendingResolve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResolve")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Future for PendingResolve {
    type Output = ResolveOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().future.as_mut().poll(cx)
    }
}

/// In-flight save; not cancellable once created
#[must_use = "the session stays in Saving until the outcome is applied"]
pub struct PendingSave {
    session: SessionId,
    future: BoxFuture<'static, SaveOutcome>,
}

impl PendingSave {
    /// Session this request belongs to
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }
}

impl std::fmt::Debug for PendingSave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSave")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Future for PendingSave {
    type Output = SaveOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().future.as_mut().poll(cx)
    }
}

/// Owner of every edit session on a document
pub struct InlineEditor<B: AssetBridge + ?Sized> {
    bridge: Arc<B>,
    config: EditorConfig,
    sessions: BTreeMap<SessionId, EditSession>,
    by_image: HashMap<NodeId, SessionId>,
    listeners: KeyListeners,
    notices: Vec<Notice>,
}

impl<B: AssetBridge + ?Sized> std::fmt::Debug for InlineEditor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineEditor")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<B: AssetBridge + ?Sized + 'static> InlineEditor<B> {
    /// Create editor
    #[must_use]
    pub fn new(bridge: Arc<B>, config: EditorConfig) -> Self {
        Self {
            bridge,
            config,
            sessions: BTreeMap::new(),
            by_image: HashMap::new(),
            listeners: KeyListeners::new(),
            notices: Vec::new(),
        }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Open session by id
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&EditSession> {
        self.sessions.get(&id)
    }

    /// Open session for an image
    #[must_use]
    pub fn session_for(&self, image: NodeId) -> Option<&EditSession> {
        self.by_image.get(&image).and_then(|id| self.sessions.get(id))
    }

    /// Number of open sessions
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of registered key listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Earliest scheduled close, for drivers that sleep until then
    #[must_use]
    pub fn next_close(&self) -> Option<Instant> {
        self.sessions.values().filter_map(|s| s.closes_at).min()
    }

    /// Take notices raised outside a form
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn live(&mut self, id: SessionId) -> Result<&mut EditSession, EditorError> {
        self.sessions
            .get_mut(&id)
            .ok_or(EditorError::UnknownSession(id))
    }

    // ---------------------------------------------------------------
    // Opening
    // ---------------------------------------------------------------

    /// Start a session for `image`
    ///
    /// With a trusted markup hint the form opens immediately; otherwise the
    /// returned future resolves the image first.
    ///
    /// # Errors
    /// - `EditorError::NotAnImage` if `image` is not an `<img>`
    /// - `EditorError::SessionAlreadyOpen` if the image is being edited
    /// - `EditorError::Dom` if the form cannot be mounted
    pub fn begin_open(&mut self, doc: &mut Document, image: NodeId) -> Result<OpenStep, EditorError> {
        let element = image_element(doc, image).ok_or(EditorError::NotAnImage(image))?;
        if let Some(existing) = self.by_image.get(&image) {
            return Err(EditorError::SessionAlreadyOpen {
                image,
                session: *existing,
            });
        }

        let mut session = EditSession::new(
            image,
            element.source_locator.clone(),
            element.known_asset_id,
        );
        let id = session.id;

        if let (true, Some(hint)) = (self.config.trust_hints, element.known_asset_id) {
            session.transition(SessionState::Editing)?;
            session.pending = element.current_alt.clone().unwrap_or_default();
            tracing::info!(session = %id, asset_id = %hint, "opening editor from markup hint");
            self.insert(session);
            self.mount(doc, id)?;
            return Ok(OpenStep::Ready(id));
        }

        session.transition(SessionState::Resolving)?;
        let generation = session.next_generation();
        let token = session.cancel.clone();
        let bridge = Arc::clone(&self.bridge);
        let limit = self.config.request_timeout();
        let locator = element.source_locator;
        tracing::info!(session = %id, src = %locator, "resolving image");
        self.insert(session);

        let future = async move {
            let result = tokio::select! {
                biased;
                () = token.cancelled() => None,
                result = bounded(limit, bridge.resolve(&locator)) => Some(result),
            };
            ResolveOutcome {
                session: id,
                generation,
                result,
            }
        }
        .boxed();

        Ok(OpenStep::Pending(PendingResolve {
            session: id,
            future,
        }))
    }

    /// Apply a resolution outcome
    ///
    /// # Errors
    /// - `EditorError::Dom` if the form cannot be mounted
    pub fn complete_open(
        &mut self,
        doc: &mut Document,
        outcome: ResolveOutcome,
    ) -> Result<Completion, EditorError> {
        let fresh = self.sessions.get(&outcome.session).is_some_and(|s| {
            s.state == SessionState::Resolving && s.generation == outcome.generation
        });
        let Some(result) = outcome.result.filter(|_| fresh) else {
            tracing::debug!(session = %outcome.session, "ignoring stale resolve outcome");
            return Ok(Completion::Ignored);
        };

        let id = outcome.session;
        match result {
            Ok(asset) => {
                let session = self.live(id)?;
                session.transition(SessionState::Editing)?;
                session.asset_id = Some(asset.id);
                session.pending = asset.alt_text;
                tracing::info!(session = %id, asset_id = %asset.id, "image resolved");
                self.mount(doc, id)?;
                Ok(Completion::Applied)
            }
            Err(error) => {
                let session = self.live(id)?;
                session.transition(SessionState::Failed)?;
                tracing::warn!(session = %id, src = %session.source_locator, %error, "image resolution failed");
                let notice = Notice {
                    session: id,
                    image: session.image,
                    message: error.user_message(),
                };
                self.notices.push(notice);
                self.close(doc, id, SessionState::Idle)?;
                Ok(Completion::Failed(error))
            }
        }
    }

    /// Open a session and wait for the form
    ///
    /// # Errors
    /// - `EditorError::Bridge` if the image cannot be resolved
    /// - see [`begin_open`](Self::begin_open)
    pub async fn open(&mut self, doc: &mut Document, image: NodeId) -> Result<SessionId, EditorError> {
        match self.begin_open(doc, image)? {
            OpenStep::Ready(id) => Ok(id),
            OpenStep::Pending(pending) => {
                let id = pending.session();
                let outcome = pending.await;
                match self.complete_open(doc, outcome)? {
                    Completion::Applied => Ok(id),
                    Completion::Failed(error) => Err(error.into()),
                    Completion::Ignored => Err(EditorError::UnknownSession(id)),
                }
            }
        }
    }

    fn insert(&mut self, session: EditSession) {
        self.by_image.insert(session.image, session.id);
        self.sessions.insert(session.id, session);
    }

    fn mount(&mut self, doc: &mut Document, id: SessionId) -> Result<(), EditorError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(EditorError::UnknownSession(id))?;
        session.listener = Some(self.listeners.register(id));
        let modal = render::mount_form(doc, id, &session.source_locator, &session.pending)?;
        session.modal = Some(modal);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Editing and saving
    // ---------------------------------------------------------------

    /// Replace the value typed into the form
    ///
    /// # Errors
    /// - `EditorError::UnknownSession` if the session is closed
    /// - `EditorError::IllegalTransition` unless the form is editable
    pub fn set_pending(
        &mut self,
        doc: &mut Document,
        id: SessionId,
        value: &str,
    ) -> Result<(), EditorError> {
        let session = self.live(id)?;
        if session.state != SessionState::Editing {
            return Err(EditorError::IllegalTransition {
                from: session.state,
                to: SessionState::Editing,
            });
        }
        session.pending = value.to_string();
        if let Some(modal) = session.modal {
            render::set_form_value(doc, modal, value)?;
        }
        Ok(())
    }

    /// Submit the pending value
    ///
    /// When the session was opened from a markup hint, the save first checks
    /// the hint against the resolution bridge; a different resolved id wins
    /// and an unresolvable locator fails the save without writing.
    ///
    /// # Errors
    /// - `EditorError::UnknownSession` if the session is closed
    /// - `EditorError::IllegalTransition` unless the session is `Editing`
    /// - `EditorError::Dom` if the form is no longer on the page; the
    ///   session stays `Editing`
    pub fn begin_save(&mut self, doc: &mut Document, id: SessionId) -> Result<PendingSave, EditorError> {
        let session = self.live(id)?;
        state::validate_transition(session.state, SessionState::Saving)?;
        if let Some(modal) = session.modal {
            render::set_saving(doc, modal, true)?;
            render::clear_form_messages(doc, modal);
        }
        session.transition(SessionState::Saving)?;
        let generation = session.next_generation();
        session.last_error = None;

        let confirmed = session.asset_id;
        let hinted = session.hinted_id;
        let locator = session.source_locator.clone();
        let value = session.pending.clone();
        let bridge = Arc::clone(&self.bridge);
        let limit = self.config.request_timeout();

        tracing::info!(session = %id, "saving alt text");

        let future = async move {
            let target = match (confirmed, hinted) {
                (Some(asset), _) => Ok(asset),
                (None, Some(hint)) => match bounded(limit, bridge.resolve(&locator)).await {
                    Ok(resolved) => {
                        if resolved.id != hint {
                            tracing::warn!(
                                session = %id,
                                hinted = %hint,
                                resolved = %resolved.id,
                                "markup hint disagrees with resolved asset"
                            );
                        }
                        Ok(resolved.id)
                    }
                    Err(error) => {
                        if matches!(error, BridgeError::ResolutionNotFound { .. }) {
                            tracing::warn!(
                                session = %id,
                                hinted = %hint,
                                "locator unresolved, refusing to write hinted asset"
                            );
                        }
                        Err(error)
                    }
                },
                (None, None) => Err(BridgeError::ResolutionNotFound { locator }),
            };

            let result = match target {
                Ok(asset) => bounded(limit, bridge.set_alt_text(asset, &value))
                    .await
                    .map(|()| asset),
                Err(error) => Err(error),
            };

            SaveOutcome {
                session: id,
                generation,
                value,
                result,
            }
        }
        .boxed();

        Ok(PendingSave {
            session: id,
            future,
        })
    }

    /// Apply a save outcome
    ///
    /// Success updates the image and schedules the form to close; failure
    /// shows an inline error and keeps the typed value. Outcomes for closed
    /// or superseded sessions change nothing.
    ///
    /// # Errors
    /// - `EditorError::Dom` if the document cannot be updated
    pub fn complete_save(
        &mut self,
        doc: &mut Document,
        outcome: SaveOutcome,
    ) -> Result<Completion, EditorError> {
        let fresh = self.sessions.get(&outcome.session).is_some_and(|s| {
            s.state == SessionState::Saving && s.generation == outcome.generation
        });
        if !fresh {
            tracing::debug!(session = %outcome.session, "ignoring stale save outcome");
            return Ok(Completion::Ignored);
        }

        let id = outcome.session;
        let close_delay = self.config.close_delay();
        let session = self.live(id)?;

        match outcome.result {
            Ok(asset) => {
                session.transition(SessionState::Succeeded)?;
                session.asset_id = Some(asset);
                session.closes_at = Some(Instant::now() + close_delay);
                render::apply_alt(doc, session.image, &outcome.value)?;
                if let Some(modal) = session.modal {
                    render::set_saving(doc, modal, false)?;
                    render::show_form_message(doc, modal, NoticeKind::Success, render::SUCCESS_TEXT)?;
                }
                tracing::info!(session = %id, asset_id = %asset, "alt text saved");
                Ok(Completion::Applied)
            }
            Err(error) => {
                session.transition(SessionState::Failed)?;
                session.transition(SessionState::Editing)?;
                session.last_error = Some(error.clone().into());
                if let Some(modal) = session.modal {
                    render::set_saving(doc, modal, false)?;
                    render::show_form_message(doc, modal, NoticeKind::Error, &error.user_message())?;
                }
                tracing::warn!(session = %id, %error, retryable = error.is_retryable(), "alt text save failed");
                Ok(Completion::Failed(error))
            }
        }
    }

    /// Type `value` and save it
    ///
    /// # Errors
    /// - `EditorError::Bridge` if the save failed (the form stays open)
    /// - see [`set_pending`](Self::set_pending) and [`begin_save`](Self::begin_save)
    pub async fn save(
        &mut self,
        doc: &mut Document,
        id: SessionId,
        value: &str,
    ) -> Result<(), EditorError> {
        self.set_pending(doc, id, value)?;
        let outcome = self.begin_save(doc, id)?.await;
        match self.complete_save(doc, outcome)? {
            Completion::Applied => Ok(()),
            Completion::Failed(error) => Err(error.into()),
            Completion::Ignored => Err(EditorError::UnknownSession(id)),
        }
    }

    // ---------------------------------------------------------------
    // Closing
    // ---------------------------------------------------------------

    /// Discard the session: pending value dropped, form and listener removed
    ///
    /// An in-flight save keeps running; its outcome is ignored.
    ///
    /// # Errors
    /// - `EditorError::UnknownSession` if the session is already closed
    pub fn cancel(&mut self, doc: &mut Document, id: SessionId) -> Result<(), EditorError> {
        if !self.sessions.contains_key(&id) {
            return Err(EditorError::UnknownSession(id));
        }
        tracing::info!(session = %id, "edit cancelled");
        self.close(doc, id, SessionState::Idle)
    }

    /// Deliver a document-level key press
    ///
    /// Escape cancels every session holding a listener.
    ///
    /// # Errors
    /// - `EditorError::Dom` if a form cannot be removed
    pub fn handle_key(&mut self, doc: &mut Document, key: &Key) -> Result<Vec<SessionId>, EditorError> {
        let targets = self.listeners.dispatch(key);
        for id in &targets {
            tracing::info!(session = %id, "edit closed with Escape");
            self.close(doc, *id, SessionState::Idle)?;
        }
        Ok(targets)
    }

    /// Close succeeded sessions whose delay has elapsed
    ///
    /// # Errors
    /// - `EditorError::Dom` if a form cannot be removed
    pub fn close_expired(&mut self, doc: &mut Document, now: Instant) -> Result<Vec<SessionId>, EditorError> {
        let due: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| s.state == SessionState::Succeeded && s.closes_at.is_some_and(|at| at <= now))
            .map(|s| s.id)
            .collect();
        for id in &due {
            self.close(doc, *id, SessionState::Idle)?;
        }
        Ok(due)
    }

    fn close(&mut self, doc: &mut Document, id: SessionId, to: SessionState) -> Result<(), EditorError> {
        let Some(mut session) = self.sessions.remove(&id) else {
            return Ok(());
        };
        self.by_image.remove(&session.image);
        if session.state != to {
            session.transition(to)?;
        }
        session.cancel.cancel();
        if let Some(listener) = session.listener.take() {
            self.listeners.remove(listener);
        }
        if let Some(modal) = session.modal.take() {
            render::unmount_form(doc, modal);
        }
        tracing::debug!(session = %id, listeners = self.listeners.len(), "session closed");
        Ok(())
    }
}
