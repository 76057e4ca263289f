//! Status persistence.
//!
//! A single JSON file maps each item key to its last observed record:
//!
//! ```text
//! {
//!   "<name>_<url>": {
//!     "in_stock": true | false | null,
//!     "message": "...",
//!     "last_checked": "2026-08-07T12:00:00Z"
//!   }
//! }
//! ```
//!
//! The file is read once at startup and rewritten in full after every
//! check. There is exactly one writer, so last-writer-wins with no locking;
//! the write itself is atomic (temp file + rename) so a tail reader or a
//! kill mid-write never sees a torn file.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StatusRecord;

/// File-backed store of per-item status records.
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    records: HashMap<String, StatusRecord>,
}

impl StatusStore {
    /// Load the store from disk; a missing file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(Self { path, records })
    }

    /// Get the record for an item key.
    pub fn get(&self, key: &str) -> Option<&StatusRecord> {
        self.records.get(key)
    }

    /// Insert or replace the record for an item key.
    pub fn insert(&mut self, key: String, record: StatusRecord) {
        self.records.insert(key, record);
    }

    /// Advance only the timestamp of an existing record.
    pub fn touch(&mut self, key: &str, at: DateTime<Utc>) {
        if let Some(record) = self.records.get_mut(key) {
            record.last_checked = at;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &HashMap<String, StatusRecord> {
        &self.records
    }

    /// Persist the whole store atomically (write to temp, then rename).
    pub async fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.records)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reading, StockStatus};
    use tempfile::TempDir;

    fn record(status: StockStatus, message: &str) -> StatusRecord {
        let reading = Reading {
            status,
            message: message.to_string(),
        };
        StatusRecord::from_reading(&reading, Utc::now())
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = StatusStore::load(tmp.path().join("status.json"))
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");

        let mut store = StatusStore::load(&path).await.unwrap();
        store.insert(
            "a_https://example.com/a".to_string(),
            record(StockStatus::Available, "Product is in stock"),
        );
        store.insert(
            "b_https://example.com/b".to_string(),
            record(StockStatus::Unavailable, "Product is not in stock"),
        );
        store.insert(
            "c_https://example.com/c".to_string(),
            record(StockStatus::Unknown, "Network error: timeout"),
        );
        store.save().await.unwrap();

        let loaded = StatusStore::load(&path).await.unwrap();
        assert_eq!(loaded.records(), store.records());
    }

    #[tokio::test]
    async fn test_touch_only_moves_timestamp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");

        let mut store = StatusStore::load(&path).await.unwrap();
        let original = record(StockStatus::Unavailable, "Product is not in stock");
        store.insert("key".to_string(), original.clone());

        let later = original.last_checked + chrono::Duration::seconds(90);
        store.touch("key", later);

        let updated = store.get("key").unwrap();
        assert_eq!(updated.in_stock, original.in_stock);
        assert_eq!(updated.message, original.message);
        assert_eq!(updated.last_checked, later);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("status.json");

        let mut store = StatusStore::load(&path).await.unwrap();
        store.insert(
            "key".to_string(),
            record(StockStatus::Unavailable, "Product is not in stock"),
        );
        store.save().await.unwrap();

        store.insert(
            "key".to_string(),
            record(StockStatus::Available, "Product is in stock"),
        );
        store.save().await.unwrap();

        let loaded = StatusStore::load(&path).await.unwrap();
        assert_eq!(
            loaded.get("key").unwrap().in_stock,
            StockStatus::Available
        );
    }
}
