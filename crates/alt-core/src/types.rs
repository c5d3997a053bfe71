//! Core types for alt text auditing
//!
//! Defines the fundamental data model:
//! - Asset and session identifiers
//! - Image elements discovered in a document
//! - Audit results and reports

use alt_dom::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;
use ulid::Ulid;

/// Identifier of a stored media asset
///
/// Stable and assigned by the asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Raw numeric value
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for AssetId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Unique edit session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an alt value counts as missing: absent or empty after trimming
#[inline]
#[must_use]
pub fn is_missing_alt(alt: Option<&str>) -> bool {
    alt.map_or(true, |a| a.trim().is_empty())
}

/// Image discovered in a document
///
/// The element itself is owned by the document; this is a snapshot taken at
/// scan time plus the node it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    /// Node of the `<img>` element
    pub node: NodeId,
    /// Value of `src`
    pub source_locator: String,
    /// Value of `alt`, `None` when the attribute is absent
    pub current_alt: Option<String>,
    /// Asset id sniffed from markup, if any
    pub known_asset_id: Option<AssetId>,
}

impl ImageElement {
    /// Whether this image lacks usable alt text
    #[inline]
    #[must_use]
    pub fn is_missing_alt(&self) -> bool {
        is_missing_alt(self.current_alt.as_deref())
    }

    /// Last path segment of the source locator
    #[must_use]
    pub fn filename(&self) -> &str {
        let path = self
            .source_locator
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// Classification of a single image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResult {
    /// Audited image
    pub image: ImageElement,
    /// `true` when alt text is absent or whitespace-only
    pub is_missing_alt: bool,
}

/// Serializable summary of one audited image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in document order among audited images
    pub index: usize,
    /// Image source locator
    pub src: String,
    /// Current alt text, if the attribute is present
    pub alt: Option<String>,
    /// Asset id hint, if any
    pub asset_id: Option<AssetId>,
    /// Missing-alt classification
    pub missing: bool,
}

/// Outcome of one auditor pass
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Per-image results in document order
    pub results: Vec<AuditResult>,
    /// Images skipped because they sit in host chrome or editor UI
    pub skipped_chrome: usize,
    /// Images skipped because a previous pass already wrapped them
    pub skipped_wrapped: usize,
}

impl AuditReport {
    /// Number of images missing alt text
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_missing_alt).count()
    }

    /// Number of newly audited images
    #[inline]
    #[must_use]
    pub fn audited_count(&self) -> usize {
        self.results.len()
    }

    /// Serializable per-image entries
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.results
            .iter()
            .enumerate()
            .map(|(index, r)| AuditEntry {
                index,
                src: r.image.source_locator.clone(),
                alt: r.image.current_alt.clone(),
                asset_id: r.image.known_asset_id,
                missing: r.is_missing_alt,
            })
            .collect()
    }
}

/// Asset resolved from a source locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    /// Backing asset id
    pub id: AssetId,
    /// Alt text currently stored for the asset
    pub alt_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn asset_id_parse_and_display() {
        let id: AssetId = " 42 ".parse().unwrap();
        assert_eq!(id, AssetId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<AssetId>().is_err());
    }

    #[test]
    fn asset_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&AssetId(7)).unwrap(), "7");
    }

    #[test]
    fn missing_alt_classification() {
        assert!(is_missing_alt(None));
        assert!(is_missing_alt(Some("")));
        assert!(is_missing_alt(Some("  \t\n")));
        assert!(!is_missing_alt(Some(" a ")));
    }

    #[test]
    fn filename_ignores_query() {
        let img = ImageElement {
            node: alt_dom::Document::new().root(),
            source_locator: "https://x.test/a/photo-300x200.jpg?ver=2#top".into(),
            current_alt: None,
            known_asset_id: None,
        };
        assert_eq!(img.filename(), "photo-300x200.jpg");
    }

    proptest! {
        #[test]
        fn whitespace_only_is_missing(ws in "[ \t\r\n]{0,12}") {
            prop_assert!(is_missing_alt(Some(&ws)));
        }

        #[test]
        fn any_visible_char_is_present(pre in "[ \t]{0,4}", body in "[a-zA-Z0-9.,]{1,16}", post in "[ \t]{0,4}") {
            let alt = format!("{pre}{body}{post}");
            prop_assert!(!is_missing_alt(Some(&alt)));
        }
    }
}
