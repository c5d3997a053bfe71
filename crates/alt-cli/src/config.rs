//! Application configuration
//!
//! Loaded from TOML; every field has a default so an empty file (or no file)
//! yields a working setup.
//!
//! ```toml
//! enabled = true
//!
//! [log]
//! filter = "info"
//! json = false
//!
//! [server]
//! bind = "127.0.0.1:8787"
//! path = "admin-ajax.php"
//!
//! [store]
//! upload_base_url = "https://example.org/wp-content/uploads"
//! manifest = "assets.json"
//!
//! [auth]
//! nonces = ["d41d8cd98f"]
//!
//! [editor]
//! request_timeout_ms = 5000
//! ```

use alt_core::{AuditConfig, EditorConfig};
use alt_http::ServerConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "ALTTEXT_LOG";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Master switch for the editor; when off nothing is mutated or served
    pub enabled: bool,
    /// Logging
    pub log: LogConfig,
    /// HTTP endpoint
    pub server: ServerConfig,
    /// Asset store seeding
    pub store: StoreConfig,
    /// Request authorization
    pub auth: AuthConfig,
    /// Image discovery
    pub audit: AuditConfig,
    /// Edit sessions
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log: LogConfig::default(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            audit: AuditConfig::default(),
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Fails on malformed TOML or mistyped fields.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load a TOML file
    ///
    /// Relative manifest paths are taken relative to the file's directory.
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("in {}", path.display()))?;
        if let (Some(manifest), Some(dir)) = (&config.store.manifest, path.parent()) {
            if manifest.is_relative() {
                config.store.manifest = Some(dir.join(manifest));
            }
        }
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Logging setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `ALTTEXT_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Asset store seeding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Public URL of the uploads directory
    pub upload_base_url: String,
    /// JSON list of assets to load at startup
    pub manifest: Option<PathBuf>,
    /// Refuse every write
    pub read_only: bool,
}

/// Request authorization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted request tokens
    pub nonces: Vec<String>,
    /// Accept requests carrying no token
    pub allow_anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert!(config.enabled);
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:8787");
        assert_eq!(config.server.path, "admin-ajax.php");
        assert_eq!(config.audit.host_chrome_ids, vec!["wpadminbar"]);
        assert_eq!(config.editor.close_delay(), Duration::from_millis(1500));
        assert_eq!(config.editor.request_timeout(), Duration::from_secs(10));
        assert!(config.editor.trust_hints);
        assert!(!config.auth.allow_anonymous);
    }

    #[test]
    fn partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            enabled = false

            [server]
            bind = "0.0.0.0:9000"

            [auth]
            nonces = ["abc"]

            [editor]
            trust_hints = false
            "#,
        )
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.server.path, "admin-ajax.php");
        assert_eq!(config.auth.nonces, vec!["abc"]);
        assert!(!config.editor.trust_hints);
        assert_eq!(config.editor.request_timeout_ms, 10_000);
    }

    #[test]
    fn mistyped_field() {
        assert!(AppConfig::from_toml_str("enabled = \"yes\"").is_err());
    }
}
