//! Document-level key listeners
//!
//! Each open form registers one listener; closing the form removes it.
//! The registry makes a leaked handler observable as a non-zero count.

use crate::types::SessionId;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Key press delivered to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Closes every open form
    Escape,
    /// Any other key, ignored
    Other(String),
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_string()),
        })
    }
}

/// Handle of a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl Display for ListenerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Registry of key listeners owned by edit sessions
#[derive(Debug, Default)]
pub struct KeyListeners {
    next: u64,
    listeners: BTreeMap<ListenerId, SessionId>,
}

impl KeyListeners {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `session`
    pub fn register(&mut self, session: SessionId) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.listeners.insert(id, session);
        id
    }

    /// Remove a listener; `false` if it was already gone
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Sessions that receive `key`, in registration order
    #[must_use]
    pub fn dispatch(&self, key: &Key) -> Vec<SessionId> {
        match key {
            Key::Escape => self.listeners.values().copied().collect(),
            Key::Other(_) => Vec::new(),
        }
    }

    /// Number of live listeners
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
