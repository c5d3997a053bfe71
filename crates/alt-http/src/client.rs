//! reqwest [`AssetBridge`] talking to a remote endpoint

use alt_core::protocol::{self, AjaxForm};
use alt_core::{AssetBridge, AssetId, BridgeError, ResolvedAsset};
use async_trait::async_trait;

/// Bridge posting forms to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpBridge {
    client: reqwest::Client,
    endpoint: String,
    nonce: Option<String>,
}

impl HttpBridge {
    /// Create bridge posting to `endpoint`
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            nonce: None,
        }
    }

    /// With request token sent as the `nonce` field
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// With a preconfigured client
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, form: &AjaxForm) -> Result<String, BridgeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, action = %form.action, %status, "endpoint refused request");
            return Err(BridgeError::Transport(format!("HTTP {status}")));
        }
        response.text().await.map_err(|e| transport(&e))
    }

    fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }
}

fn transport(error: &reqwest::Error) -> BridgeError {
    tracing::warn!(%error, "request failed");
    BridgeError::Transport(error.to_string())
}

#[async_trait]
impl AssetBridge for HttpBridge {
    async fn resolve(&self, locator: &str) -> Result<ResolvedAsset, BridgeError> {
        let body = self.post(&AjaxForm::resolve(locator, self.nonce())).await?;
        protocol::decode_resolve(locator, &body)
    }

    async fn get_alt_text(&self, id: AssetId) -> Result<String, BridgeError> {
        let body = self.post(&AjaxForm::get(id, self.nonce())).await?;
        protocol::decode_get(id, &body)
    }

    async fn set_alt_text(&self, id: AssetId, alt_text: &str) -> Result<(), BridgeError> {
        let body = self.post(&AjaxForm::update(id, alt_text, self.nonce())).await?;
        protocol::decode_update(id, &body)
    }
}
