//! Asset resolution and persistence bridge
//!
//! The editor never talks to a store directly. Hosts provide an
//! [`AssetBridge`]: in-process over a local store, or over HTTP.

use crate::error::BridgeError;
use crate::types::{AssetId, ResolvedAsset};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Host collaborator mapping locators to assets and reading/writing alt text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetBridge: Send + Sync {
    /// Resolve a displayed image locator to its backing asset
    async fn resolve(&self, locator: &str) -> Result<ResolvedAsset, BridgeError>;

    /// Read stored alt text
    async fn get_alt_text(&self, id: AssetId) -> Result<String, BridgeError>;

    /// Persist alt text; empty is a legal value
    async fn set_alt_text(&self, id: AssetId, alt_text: &str) -> Result<(), BridgeError>;
}

/// Run a bridge call under a deadline
///
/// # Errors
/// - `BridgeError::Timeout` when `limit` elapses first
/// - whatever the call itself returns
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, BridgeError>
where
    F: Future<Output = Result<T, BridgeError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::Timeout {
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
