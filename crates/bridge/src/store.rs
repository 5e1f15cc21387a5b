//! File-backed persistence for journal records.
//!
//! Stores every persisted record in one JSON file keyed by entity id — the
//! shape the host app uses for its local journal library in the app's
//! document directory. Not a database; fine for the few hundred records a
//! personal journal accumulates.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::seams::{Persistence, Result};
use crate::types::EntityId;

/// JSON-file-backed [`Persistence`] implementation.
pub struct JsonStore {
    path: PathBuf,
    records: Mutex<HashMap<EntityId, serde_json::Value>>,
}

impl JsonStore {
    /// Open a store at `path`, loading existing records if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, records: Mutex::new(records) })
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Fetch a stored record by id.
    pub async fn get(&self, id: EntityId) -> Option<serde_json::Value> {
        self.records.lock().await.get(&id).cloned()
    }

    async fn save(&self, records: &HashMap<EntityId, serde_json::Value>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl Persistence for JsonStore {
    async fn persist(&self, record: serde_json::Value) -> Result<EntityId> {
        let id = EntityId::new();
        let mut records = self.records.lock().await;
        records.insert(id, record);
        self.save(&records).await?;
        tracing::debug!(%id, path = %self.path.display(), "persisted journal record");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_persist_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::open(temp_dir.path().join("journal.json")).await.unwrap();

        let id = store.persist(json!({ "title": "Iceland Trip" })).await.unwrap();

        assert_eq!(store.len().await, 1);
        let record = store.get(id).await.unwrap();
        assert_eq!(record["title"], "Iceland Trip");
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("journal.json");

        let id = {
            let store = JsonStore::open(&path).await.unwrap();
            store.persist(json!({ "title": "Kyoto" })).await.unwrap()
        };

        let reopened = JsonStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().await, 1);
        assert_eq!(reopened.get(id).await.unwrap()["title"], "Kyoto");
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::open(temp_dir.path().join("nothing_here.json")).await.unwrap();
        assert!(store.is_empty().await);
    }
}
