//! Request service behind both transports
//!
//! Authorizes, decodes the form, runs the operation against the store and
//! wraps the answer in an [`Envelope`]. Never fails: every problem becomes an
//! error envelope.

use crate::auth::{Authorizer, Credentials};
use crate::error::StoreError;
use crate::resolve::Resolver;
use crate::store::AssetStore;
use alt_core::protocol::{AjaxForm, AjaxRequest, Envelope, ErrorCode, UPDATE_OK_MESSAGE};
use alt_core::{AssetId, ResolvedAsset};
use std::sync::Arc;

const NOT_FOUND_MESSAGE: &str = "Attachment not found";
const WRITE_FAILED_MESSAGE: &str = "Failed to update alt text";

/// Alt text operations over an [`AssetStore`]
#[derive(Debug, Clone)]
pub struct AltTextService {
    store: Arc<AssetStore>,
    authorizer: Arc<dyn Authorizer>,
}

impl AltTextService {
    /// Create service
    #[must_use]
    pub fn new(store: Arc<AssetStore>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { store, authorizer }
    }

    /// Backing store
    #[must_use]
    pub fn store(&self) -> &Arc<AssetStore> {
        &self.store
    }

    /// Handle one request
    #[must_use]
    pub fn handle(&self, credentials: &Credentials, form: AjaxForm) -> Envelope {
        if let Err(denied) = self.authorizer.authorize(credentials, &form.action) {
            return Envelope::error(ErrorCode::Forbidden, denied.to_string());
        }

        let action = form.action.clone();
        let request = match form.into_request() {
            Ok(request) => request,
            Err(error) => {
                tracing::debug!(%action, %error, "rejected request");
                return Envelope::error(ErrorCode::InvalidRequest, error.to_string());
            }
        };

        match request {
            AjaxRequest::Resolve { url } => self.resolve(&url),
            AjaxRequest::Get { id } => self.get(id),
            AjaxRequest::Update { id, alt_text } => self.update(id, &alt_text),
        }
    }

    fn resolve(&self, url: &str) -> Envelope {
        match Resolver::new(&self.store).resolve(url) {
            Some((record, strategy)) => {
                tracing::info!(url, asset_id = %record.id, %strategy, "locator resolved");
                Envelope::ok(&ResolvedAsset {
                    id: record.id,
                    alt_text: record.alt_text,
                })
            }
            None => {
                tracing::info!(url, "locator matched no asset");
                Envelope::error(ErrorCode::NotFound, NOT_FOUND_MESSAGE)
            }
        }
    }

    fn get(&self, id: AssetId) -> Envelope {
        match self.store.alt_text(id) {
            Ok(alt_text) => Envelope::ok(&ResolvedAsset { id, alt_text }),
            Err(error) => store_failure(&error),
        }
    }

    fn update(&self, id: AssetId, alt_text: &str) -> Envelope {
        match self.store.set_alt_text(id, alt_text) {
            Ok(stored) => {
                tracing::info!(asset_id = %id, empty = stored.is_empty(), "alt text updated");
                Envelope::message(UPDATE_OK_MESSAGE)
            }
            Err(error) => {
                tracing::warn!(asset_id = %id, %error, "alt text update failed");
                store_failure(&error)
            }
        }
    }
}

fn store_failure(error: &StoreError) -> Envelope {
    if error.is_not_found() {
        Envelope::error(ErrorCode::NotFound, NOT_FOUND_MESSAGE)
    } else {
        Envelope::error(ErrorCode::WriteFailed, WRITE_FAILED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AllowAll, NonceAuthorizer};
    use alt_core::protocol::MessageData;

    fn service() -> (AltTextService, AssetId) {
        let store = Arc::new(AssetStore::new("https://site.test/wp-content/uploads"));
        let id = store.insert("2024/05/photo.jpg", "");
        (AltTextService::new(store, Arc::new(AllowAll)), id)
    }

    fn message(envelope: &Envelope) -> MessageData {
        serde_json::from_value(envelope.data.clone()).unwrap()
    }

    #[test]
    fn resolve_returns_id_and_alt() {
        let (service, id) = service();
        let reply = service.handle(
            &Credentials::anonymous(),
            AjaxForm::resolve(
                "https://site.test/wp-content/uploads/2024/05/photo-300x200.jpg",
                None,
            ),
        );
        assert!(reply.success);
        let asset: ResolvedAsset = serde_json::from_value(reply.data).unwrap();
        assert_eq!(asset, ResolvedAsset { id, alt_text: String::new() });
    }

    #[test]
    fn resolve_not_found() {
        let (service, _) = service();
        let reply = service.handle(&Credentials::anonymous(), AjaxForm::resolve("nope.gif", None));
        assert!(!reply.success);
        assert_eq!(message(&reply).code, Some(ErrorCode::NotFound));
    }

    #[test]
    fn update_then_get() {
        let (service, id) = service();
        let creds = Credentials::anonymous();
        let reply = service.handle(&creds, AjaxForm::update(id, "A red bicycle", None));
        assert!(reply.success);
        assert_eq!(message(&reply).message, UPDATE_OK_MESSAGE);

        let reply = service.handle(&creds, AjaxForm::get(id, None));
        let asset: ResolvedAsset = serde_json::from_value(reply.data).unwrap();
        assert_eq!(asset.alt_text, "A red bicycle");
    }

    #[test]
    fn update_unknown_asset() {
        let (service, _) = service();
        let reply = service.handle(&Credentials::anonymous(), AjaxForm::update(AssetId(999), "x", None));
        assert!(!reply.success);
        assert_eq!(message(&reply).code, Some(ErrorCode::NotFound));
    }

    #[test]
    fn read_only_store_reports_write_failure() {
        let (service, id) = service();
        service.store().set_read_only(true);
        let reply = service.handle(&Credentials::anonymous(), AjaxForm::update(id, "x", None));
        let data = message(&reply);
        assert_eq!(data.code, Some(ErrorCode::WriteFailed));
        assert_eq!(data.message, WRITE_FAILED_MESSAGE);
    }

    #[test]
    fn authorization_runs_first() {
        let store = Arc::new(AssetStore::default());
        let id = store.insert("a.jpg", "Old");
        let service = AltTextService::new(Arc::clone(&store), Arc::new(NonceAuthorizer::new(["good"])));

        let reply = service.handle(&Credentials::with_nonce("bad"), AjaxForm::update(id, "New", None));
        assert!(!reply.success);
        assert_eq!(message(&reply).code, Some(ErrorCode::Forbidden));
        assert_eq!(store.alt_text(id).unwrap(), "Old");

        // malformed requests are still refused as forbidden
        let reply = service.handle(&Credentials::anonymous(), AjaxForm::default());
        assert_eq!(message(&reply).code, Some(ErrorCode::Forbidden));
    }

    #[test]
    fn malformed_request() {
        let (service, _) = service();
        let form = AjaxForm {
            action: alt_core::protocol::ACTION_UPDATE.into(),
            id: Some("x".into()),
            ..AjaxForm::default()
        };
        let reply = service.handle(&Credentials::anonymous(), form);
        assert_eq!(message(&reply).code, Some(ErrorCode::InvalidRequest));
    }
}
