//! Server error types

use std::net::SocketAddr;

/// Errors starting the HTTP server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying failure
        #[source]
        source: warp::Error,
    },

    /// The endpoint path is empty or contains empty segments
    #[error("invalid endpoint path: {0:?}")]
    InvalidPath(String),
}

impl ServerError {
    /// Check if this error comes from the listen socket
    #[inline]
    #[must_use]
    pub fn is_bind(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            ServerError::InvalidPath("a//b".into()).to_string(),
            "invalid endpoint path: \"a//b\""
        );
        assert!(!ServerError::InvalidPath(String::new()).is_bind());
    }
}
