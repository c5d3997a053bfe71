//! Auditor and editor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auditor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Element ids whose subtrees are host chrome and never audited
    pub host_chrome_ids: Vec<String>,
}

impl AuditConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With host chrome ids
    #[must_use]
    pub fn with_host_chrome_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.host_chrome_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            host_chrome_ids: vec!["wpadminbar".to_string()],
        }
    }
}

/// Inline editor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delay before a succeeded form closes, in milliseconds
    pub close_delay_ms: u64,
    /// Bound on every bridge call, in milliseconds
    pub request_timeout_ms: u64,
    /// Open the form straight away when markup carries an asset id
    pub trust_hints: bool,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With close delay
    #[inline]
    #[must_use]
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay_ms = duration_millis(delay);
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = duration_millis(timeout);
        self
    }

    /// With hint trust
    #[inline]
    #[must_use]
    pub fn with_trust_hints(mut self, trust: bool) -> Self {
        self.trust_hints = trust;
        self
    }

    /// Close delay as a duration
    #[inline]
    #[must_use]
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            close_delay_ms: 1500,
            request_timeout_ms: 10_000,
            trust_hints: true,
        }
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
