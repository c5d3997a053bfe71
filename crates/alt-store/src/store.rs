//! In-memory asset store

use crate::error::StoreError;
use crate::sanitize::sanitize_text_field;
use alt_core::AssetId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Stored media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Stable id
    pub id: AssetId,
    /// Path relative to the uploads directory, e.g. `2024/05/photo.jpg`
    pub file: String,
    /// Alternative text; empty when unset
    #[serde(default)]
    pub alt_text: String,
}

impl AssetRecord {
    /// Last path segment of `file`
    #[must_use]
    pub fn basename(&self) -> &str {
        self.file.rsplit('/').next().unwrap_or(&self.file)
    }
}

/// Concurrent map of assets shared by request handlers
#[derive(Debug)]
pub struct AssetStore {
    upload_base_url: String,
    assets: DashMap<AssetId, AssetRecord>,
    next_id: AtomicU64,
    read_only: AtomicBool,
}

impl AssetStore {
    /// Create empty store serving files under `upload_base_url`
    #[must_use]
    pub fn new(upload_base_url: impl Into<String>) -> Self {
        Self {
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            assets: DashMap::new(),
            next_id: AtomicU64::new(1),
            read_only: AtomicBool::new(false),
        }
    }

    /// Seed a store from a JSON array of [`AssetRecord`]s
    ///
    /// # Errors
    /// - `StoreError::Manifest` for malformed JSON
    /// - `StoreError::DuplicateId` if two records share an id
    pub fn from_manifest_json(upload_base_url: impl Into<String>, json: &str) -> Result<Self, StoreError> {
        let records: Vec<AssetRecord> = serde_json::from_str(json)?;
        let store = Self::new(upload_base_url);
        for record in records {
            store.insert_record(record)?;
        }
        tracing::info!(assets = store.len(), "asset manifest loaded");
        Ok(store)
    }

    /// Seed a store from a manifest file
    ///
    /// # Errors
    /// - `StoreError::Io` if the file cannot be read
    /// - see [`from_manifest_json`](Self::from_manifest_json)
    pub fn load_manifest(upload_base_url: impl Into<String>, path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_manifest_json(upload_base_url, &json)
    }

    /// Refuse or accept writes
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    /// Base URL of the uploads directory, without trailing slash
    #[must_use]
    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    /// Public URL of a stored file
    #[must_use]
    pub fn url_for(&self, record: &AssetRecord) -> String {
        if self.upload_base_url.is_empty() {
            record.file.clone()
        } else {
            format!("{}/{}", self.upload_base_url, record.file.trim_start_matches('/'))
        }
    }

    /// Add an asset under the next free id
    pub fn insert(&self, file: impl Into<String>, alt_text: impl Into<String>) -> AssetId {
        let (file, alt_text) = (file.into(), alt_text.into());
        loop {
            let id = AssetId(self.next_id.fetch_add(1, Ordering::Relaxed));
            if let Entry::Vacant(slot) = self.assets.entry(id) {
                slot.insert(AssetRecord { id, file, alt_text });
                return id;
            }
        }
    }

    /// Add an asset with an externally assigned id
    ///
    /// # Errors
    /// - `StoreError::DuplicateId` if the id is taken
    pub fn insert_record(&self, record: AssetRecord) -> Result<(), StoreError> {
        let id = record.id;
        match self.assets.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                self.next_id.fetch_max(id.get().saturating_add(1), Ordering::Relaxed);
                Ok(())
            }
        }
    }

    /// Snapshot of one asset
    #[must_use]
    pub fn get(&self, id: AssetId) -> Option<AssetRecord> {
        self.assets.get(&id).map(|r| r.value().clone())
    }

    /// Snapshot of every asset, ordered by id
    #[must_use]
    pub fn records(&self) -> Vec<AssetRecord> {
        let mut records: Vec<AssetRecord> = self.assets.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Stored alt text
    ///
    /// # Errors
    /// - `StoreError::NotFound` for unknown ids
    pub fn alt_text(&self, id: AssetId) -> Result<String, StoreError> {
        self.assets
            .get(&id)
            .map(|r| r.alt_text.clone())
            .ok_or(StoreError::NotFound(id))
    }

    /// Sanitize and store alt text, returning the stored value
    ///
    /// # Errors
    /// - `StoreError::NotFound` for unknown ids
    /// - `StoreError::ReadOnly` when writes are disabled
    pub fn set_alt_text(&self, id: AssetId, alt_text: &str) -> Result<String, StoreError> {
        let mut record = self.assets.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if self.read_only.load(Ordering::Relaxed) {
            return Err(StoreError::ReadOnly(id));
        }
        let clean = sanitize_text_field(alt_text);
        record.alt_text.clone_from(&clean);
        tracing::debug!(asset_id = %id, len = clean.len(), "alt text stored");
        Ok(clean)
    }

    /// Number of assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the store holds no assets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new("")
    }
}
