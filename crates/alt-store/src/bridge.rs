//! In-process [`AssetBridge`]
//!
//! Runs requests straight through the [`AltTextService`] and decodes the
//! serialized envelope with the same protocol code the HTTP client uses.

use crate::auth::Credentials;
use crate::service::AltTextService;
use alt_core::protocol::{self, AjaxForm, Envelope};
use alt_core::{AssetBridge, AssetId, BridgeError, ResolvedAsset};
use async_trait::async_trait;

/// Bridge calling the service in the same process
#[derive(Debug, Clone)]
pub struct LocalBridge {
    service: AltTextService,
    credentials: Credentials,
}

impl LocalBridge {
    /// Create bridge presenting `credentials` on every call
    #[must_use]
    pub fn new(service: AltTextService, credentials: Credentials) -> Self {
        Self {
            service,
            credentials,
        }
    }

    fn call(&self, form: AjaxForm) -> Result<String, BridgeError> {
        let envelope: Envelope = self.service.handle(&self.credentials, form);
        serde_json::to_string(&envelope).map_err(|e| BridgeError::Transport(e.to_string()))
    }

    fn nonce(&self) -> Option<&str> {
        self.credentials.nonce.as_deref()
    }
}

#[async_trait]
impl AssetBridge for LocalBridge {
    async fn resolve(&self, locator: &str) -> Result<ResolvedAsset, BridgeError> {
        let body = self.call(AjaxForm::resolve(locator, self.nonce()))?;
        protocol::decode_resolve(locator, &body)
    }

    async fn get_alt_text(&self, id: AssetId) -> Result<String, BridgeError> {
        let body = self.call(AjaxForm::get(id, self.nonce()))?;
        protocol::decode_get(id, &body)
    }

    async fn set_alt_text(&self, id: AssetId, alt_text: &str) -> Result<(), BridgeError> {
        let body = self.call(AjaxForm::update(id, alt_text, self.nonce()))?;
        protocol::decode_update(id, &body)
    }
}
