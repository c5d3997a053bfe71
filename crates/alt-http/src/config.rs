//! Server configuration

use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Default endpoint path, relative to the server root
pub const DEFAULT_PATH: &str = "admin-ajax.php";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8787;

/// Where and how the service is exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Endpoint path accepting form posts
    pub path: String,
    /// Largest accepted request body in bytes
    pub max_body_bytes: u64,
}

impl ServerConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With listen address
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With endpoint path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Endpoint path split into segments
    ///
    /// # Errors
    /// - `ServerError::InvalidPath` for an empty path or empty segments
    pub fn segments(&self) -> Result<Vec<String>, ServerError> {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() || trimmed.split('/').any(str::is_empty) {
            return Err(ServerError::InvalidPath(self.path.clone()));
        }
        Ok(trimmed.split('/').map(str::to_string).collect())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            path: DEFAULT_PATH.to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8787");
        assert_eq!(config.segments().unwrap(), vec!["admin-ajax.php"]);
    }

    #[test]
    fn nested_paths() {
        let config = ServerConfig::new().with_path("/wp-admin/admin-ajax.php");
        assert_eq!(config.segments().unwrap(), vec!["wp-admin", "admin-ajax.php"]);
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(ServerConfig::new().with_path("/").segments().is_err());
        assert!(ServerConfig::new().with_path("a//b").segments().is_err());
    }
}
