//! Store error types

use alt_core::AssetId;

/// Errors from the asset store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No asset with this id
    #[error("asset {0} not found")]
    NotFound(AssetId),

    /// Id already taken
    #[error("asset {0} already exists")]
    DuplicateId(AssetId),

    /// Store refuses writes
    #[error("store is read-only, cannot update asset {0}")]
    ReadOnly(AssetId),

    /// Manifest could not be decoded
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Manifest could not be read
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check if the error means the asset does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
