//! Error types for alt core
//!
//! Provides the error taxonomy for:
//! - Asset resolution and persistence (bridge calls)
//! - Edit session lifecycle
//! - Wire requests

use crate::editor::SessionState;
use crate::types::{AssetId, SessionId};
use alt_dom::{DomError, NodeId};

/// Errors surfaced by an [`AssetBridge`](crate::bridge::AssetBridge)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// No asset matches the locator under any strategy
    #[error("no asset found for {locator}")]
    ResolutionNotFound {
        /// Locator that failed to resolve
        locator: String,
    },

    /// Asset disappeared between resolve and save
    #[error("asset {0} not found")]
    PersistenceNotFound(AssetId),

    /// Store rejected the update
    #[error("write rejected: {0}")]
    Write(String),

    /// Network failure, non-success status or unparsable payload
    #[error("transport error: {0}")]
    Transport(String),

    /// Host refused the caller
    #[error("not authorized: {0}")]
    Authorization(String),

    /// Request did not complete in time
    #[error("request timed out after {millis}ms")]
    Timeout {
        /// Configured timeout
        millis: u64,
    },
}

impl BridgeError {
    /// Message shown inline to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ResolutionNotFound { .. } => "This image could not be found in the media library. \
                 Only images uploaded to this site can have their alt text updated."
                .to_string(),
            Self::PersistenceNotFound(_) => {
                "This image no longer exists in the media library.".to_string()
            }
            Self::Write(message) | Self::Authorization(message) => message.clone(),
            Self::Transport(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            Self::Timeout { .. } => "The server took too long to respond. Please try again.".to_string(),
        }
    }

    /// Check if a retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}

/// Errors from the inline editor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Bridge call failed
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Node is not an `<img>` element
    #[error("node {0} is not an image")]
    NotAnImage(NodeId),

    /// A session for this image is already open
    #[error("an edit session is already open for image {image}")]
    SessionAlreadyOpen {
        /// Image node
        image: NodeId,
        /// Session holding it
        session: SessionId,
    },

    /// Session id is not (or no longer) open
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// State machine refused a transition
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: SessionState,
        /// Requested state
        to: SessionState,
    },

    /// Document mutation failed
    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

impl EditorError {
    /// Message shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Bridge(e) => e.user_message(),
            Self::SessionAlreadyOpen { .. } => "This image is already being edited.".to_string(),
            _ => "An error occurred. Please try again.".to_string(),
        }
    }
}

/// Errors decoding an incoming wire request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// `action` names no known operation
    #[error("unknown action: '{0}'")]
    UnknownAction(String),

    /// Required field absent or empty
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Field present but malformed
    #[error("invalid {field}: {value}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_display() {
        let err = BridgeError::PersistenceNotFound(AssetId(9));
        assert!(err.to_string().contains("asset 9"));
    }

    #[test]
    fn resolution_message_mentions_media_library() {
        let err = BridgeError::ResolutionNotFound {
            locator: "x.jpg".into(),
        };
        assert!(err.user_message().contains("media library"));
    }

    #[test]
    fn server_messages_pass_through() {
        let err = BridgeError::Authorization("Permission denied".into());
        assert_eq!(err.user_message(), "Permission denied");
    }

    #[test]
    fn retry_classification() {
        assert!(BridgeError::Transport("reset".into()).is_retryable());
        assert!(BridgeError::Timeout { millis: 10 }.is_retryable());
        assert!(!BridgeError::Write("no".into()).is_retryable());
    }

    #[test]
    fn editor_error_wraps_bridge() {
        let err: EditorError = BridgeError::Transport("x".into()).into();
        assert!(matches!(err, EditorError::Bridge(BridgeError::Transport(_))));
        assert!(err.user_message().starts_with("Network error"));
    }
}
