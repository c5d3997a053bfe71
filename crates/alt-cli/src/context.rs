//! Application context
//!
//! Built once from [`AppConfig`] and handed to every command; holds the
//! shared store and the request service in front of it.

use crate::config::{AppConfig, AuthConfig, StoreConfig};
use alt_core::{Auditor, EditorConfig};
use alt_store::{
    AllowAll, AltTextService, AssetStore, Authorizer, Credentials, LocalBridge, NonceAuthorizer,
};
use anyhow::Context;
use std::sync::Arc;

/// Shared state for one process
#[derive(Debug, Clone)]
pub struct AppContext {
    config: AppConfig,
    store: Arc<AssetStore>,
    service: AltTextService,
}

impl AppContext {
    /// Build the store and service described by `config`
    ///
    /// # Errors
    /// Fails if the asset manifest cannot be loaded.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(open_store(&config.store)?);
        let service = AltTextService::new(Arc::clone(&store), authorizer(&config.auth));
        Ok(Self {
            config,
            store,
            service,
        })
    }

    /// Configuration this context was built from
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared asset store
    #[must_use]
    pub fn store(&self) -> &Arc<AssetStore> {
        &self.store
    }

    /// Request service over the store
    #[must_use]
    pub fn service(&self) -> &AltTextService {
        &self.service
    }

    /// Auditor using the configured chrome ids
    #[must_use]
    pub fn auditor(&self) -> Auditor {
        Auditor::new(self.config.audit.clone())
    }

    /// Editor settings
    #[must_use]
    pub fn editor_config(&self) -> EditorConfig {
        self.config.editor
    }

    /// Fail unless the editor is switched on
    ///
    /// # Errors
    /// Fails when `enabled = false`.
    pub fn ensure_enabled(&self, operation: &str) -> anyhow::Result<()> {
        if self.config.enabled {
            Ok(())
        } else {
            tracing::warn!(operation, "refused: alt text editor is disabled");
            anyhow::bail!("{operation} refused: alt text editor is disabled (enabled = false)")
        }
    }

    /// In-process bridge presenting the first configured token
    #[must_use]
    pub fn local_bridge(&self) -> LocalBridge {
        let credentials = self
            .config
            .auth
            .nonces
            .first()
            .map_or_else(Credentials::anonymous, Credentials::with_nonce);
        LocalBridge::new(self.service.clone(), credentials)
    }
}

fn open_store(config: &StoreConfig) -> anyhow::Result<AssetStore> {
    let store = match &config.manifest {
        Some(path) => AssetStore::load_manifest(config.upload_base_url.as_str(), path)
            .with_context(|| format!("failed to load asset manifest {}", path.display()))?,
        None => AssetStore::new(config.upload_base_url.as_str()),
    };
    store.set_read_only(config.read_only);
    Ok(store)
}

/// Authorizer for `config`
///
/// No tokens plus `allow_anonymous` means an open endpoint.
#[must_use]
pub fn authorizer(config: &AuthConfig) -> Arc<dyn Authorizer> {
    if config.nonces.is_empty() && config.allow_anonymous {
        tracing::warn!("endpoint accepts unauthenticated writes");
        Arc::new(AllowAll)
    } else {
        Arc::new(
            NonceAuthorizer::new(config.nonces.iter().cloned())
                .with_allow_anonymous(config.allow_anonymous),
        )
    }
}
