//! Alt Core - alt text auditing and inline editing
//!
//! The pieces that:
//! - Find images in a rendered document and classify their alt text
//! - Annotate non-compliant images with a badge and an edit affordance
//! - Drive per-image edit sessions through an explicit state machine
//! - Talk to the host's asset store through an [`AssetBridge`]
//!
//! # Example
//!
//! ```rust,ignore
//! use alt_core::prelude::*;
//! use alt_dom::Document;
//!
//! # async fn example(bridge: std::sync::Arc<impl AssetBridge + 'static>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::parse(r#"<img src="/uploads/bike-300x200.jpg" alt="">"#)?;
//! let report = Auditor::new(AuditConfig::default()).run(&mut doc)?;
//! assert_eq!(report.missing_count(), 1);
//!
//! let mut editor = InlineEditor::new(bridge, EditorConfig::default());
//! let image = report.results[0].image.node;
//! let session = editor.open(&mut doc, image).await?;
//! editor.save(&mut doc, session, "A red bicycle").await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod audit;
pub mod bridge;
pub mod config;
pub mod editor;
pub mod error;
pub mod hint;
pub mod protocol;
pub mod render;
pub mod types;

pub use audit::{audit, discover, Auditor, Discovery};
pub use bridge::{bounded, AssetBridge};
pub use config::{AuditConfig, EditorConfig};
pub use editor::{
    Completion, EditSession, InlineEditor, Key, Notice, OpenStep, PendingResolve, PendingSave,
    ResolveOutcome, SaveOutcome, SessionState,
};
pub use error::{BridgeError, EditorError, RequestError};
pub use protocol::{AjaxForm, AjaxRequest, Envelope, ErrorCode, MessageData};
pub use types::{
    is_missing_alt, AssetId, AuditEntry, AuditReport, AuditResult, ImageElement, ResolvedAsset,
    SessionId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Alt Core
    pub use crate::{
        AssetBridge, AssetId, AuditConfig, AuditReport, Auditor, BridgeError, EditorConfig,
        EditorError, InlineEditor, Key, SessionState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
