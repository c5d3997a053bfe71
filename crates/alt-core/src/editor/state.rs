//! Edit session state machine

use crate::error::EditorError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of one edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No form, nothing in flight
    Idle,
    /// Waiting for the resolution bridge
    Resolving,
    /// Form open, accepting input
    Editing,
    /// Save request in flight
    Saving,
    /// Save confirmed, form closing
    Succeeded,
    /// Last bridge call failed
    Failed,
}

impl SessionState {
    /// Check if a bridge call is outstanding
    #[inline]
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Resolving | Self::Saving)
    }

    /// Check if the edit form is shown in this state
    #[inline]
    #[must_use]
    pub fn shows_form(self) -> bool {
        matches!(self, Self::Editing | Self::Saving | Self::Succeeded)
    }
}

/// Validate a state transition
///
/// # Errors
/// - `EditorError::IllegalTransition` when `to` is not reachable from `from`
pub fn validate_transition(from: SessionState, to: SessionState) -> Result<(), EditorError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(EditorError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SessionState) -> &'static [SessionState] {
    use SessionState::{Editing, Failed, Idle, Resolving, Saving, Succeeded};
    match from {
        Idle => &[Resolving, Editing],
        Resolving => &[Editing, Failed, Idle],
        Editing => &[Saving, Idle],
        Saving => &[Succeeded, Failed, Idle],
        Succeeded => &[Idle],
        // Failed resolve returns to Idle, failed save back to Editing
        Failed => &[Idle, Editing],
    }
}
