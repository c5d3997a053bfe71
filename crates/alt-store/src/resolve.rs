//! Locator resolution policy
//!
//! Displayed image URLs are often resized derivatives (`photo-300x200.jpg`)
//! of the stored original, so resolution degrades through three strategies
//! and the first hit wins.

use crate::store::{AssetRecord, AssetStore};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display, Formatter};

static SIZE_SUFFIX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"-\d+x\d+(\.[a-zA-Z0-9]+)$").ok());

/// Strategy that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Locator equals the stored URL or upload-relative path
    Exact,
    /// Match after removing a `-<w>x<h>` size suffix
    SizeSuffix,
    /// Basename compared with stored file paths
    Filename,
}

impl Display for MatchStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::SizeSuffix => "size_suffix",
            Self::Filename => "filename",
        })
    }
}

/// Locator without query string or fragment
#[must_use]
pub fn strip_query(locator: &str) -> &str {
    locator
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
}

/// Remove a trailing `-<width>x<height>` before the extension
///
/// Returns `None` when the locator carries no size suffix.
#[must_use]
pub fn strip_size_suffix(locator: &str) -> Option<String> {
    let re = SIZE_SUFFIX.as_ref()?;
    let stripped = re.replace(locator, "$1");
    (stripped != locator).then(|| stripped.into_owned())
}

/// Last path segment
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Resolves locators against an [`AssetStore`]
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a AssetStore,
}

impl<'a> Resolver<'a> {
    /// Create resolver over `store`
    #[must_use]
    pub fn new(store: &'a AssetStore) -> Self {
        Self { store }
    }

    /// Find the asset behind `locator`
    #[must_use]
    pub fn resolve(&self, locator: &str) -> Option<(AssetRecord, MatchStrategy)> {
        let path = strip_query(locator);
        if path.is_empty() {
            return None;
        }
        let records = self.store.records();

        if let Some(record) = self.exact(&records, path) {
            return Some((record, MatchStrategy::Exact));
        }

        let stripped = strip_size_suffix(path);
        if let Some(stripped) = &stripped {
            if let Some(record) = self.exact(&records, stripped) {
                return Some((record, MatchStrategy::SizeSuffix));
            }
        }

        let name = basename(stripped.as_deref().unwrap_or(path));
        if name.is_empty() {
            return None;
        }
        // records are ordered by id, so ties go to the lowest id
        records
            .into_iter()
            .find(|r| r.file == name || r.file.ends_with(&format!("/{name}")))
            .map(|record| (record, MatchStrategy::Filename))
    }

    fn exact(&self, records: &[AssetRecord], path: &str) -> Option<AssetRecord> {
        let base = self.store.upload_base_url();
        let relative = if base.is_empty() {
            None
        } else {
            path.strip_prefix(base).map(|rest| rest.trim_start_matches('/'))
        };

        records
            .iter()
            .find(|r| self.store.url_for(r) == path || relative.is_some_and(|rel| r.file == rel))
            .cloned()
    }
}
