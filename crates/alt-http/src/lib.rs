//! Alt HTTP - transport for the alt text service
//!
//! - [`routes`] / [`serve`]: warp server exposing an [`alt_store::AltTextService`]
//!   at one form-post endpoint
//! - [`HttpBridge`]: reqwest implementation of [`alt_core::AssetBridge`]
//!
//! # Example
//!
//! ```rust,ignore
//! use alt_http::{serve, ServerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let shutdown = CancellationToken::new();
//! serve(service, &ServerConfig::default(), shutdown.clone()).await?;
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
pub mod server;

pub use client::HttpBridge;
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{bind, routes, serve, wait_for_shutdown_signal};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
