//! Alt Store - asset store and request service
//!
//! The host side of the alt text bridge:
//! - [`AssetStore`]: concurrent in-memory map of media assets
//! - [`Resolver`]: exact, size-suffix and filename resolution of locators
//! - [`AltTextService`]: authorized request handling producing envelopes
//! - [`LocalBridge`]: the service as an in-process [`alt_core::AssetBridge`]
//!
//! # Example
//!
//! ```rust
//! use alt_store::{AssetStore, Resolver};
//!
//! let store = AssetStore::new("https://site.test/wp-content/uploads");
//! let id = store.insert("2024/05/photo.jpg", "");
//!
//! let (record, _) = Resolver::new(&store)
//!     .resolve("https://site.test/wp-content/uploads/2024/05/photo-300x200.jpg")
//!     .unwrap();
//! assert_eq!(record.id, id);
//! ```

#![warn(unreachable_pub)]

pub mod auth;
pub mod bridge;
pub mod error;
pub mod resolve;
pub mod sanitize;
pub mod service;
pub mod store;

pub use auth::{AllowAll, AuthError, Authorizer, Credentials, NonceAuthorizer};
pub use bridge::LocalBridge;
pub use error::StoreError;
pub use resolve::{MatchStrategy, Resolver};
pub use sanitize::sanitize_text_field;
pub use service::AltTextService;
pub use store::{AssetRecord, AssetStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
