use std::path::{Path, PathBuf};

use antgrid::record::{Collection, DeviceRecord};

use indexmap::IndexMap;

use serde::Deserialize;

use tokio::sync::RwLock;

use tracing::info;

/// Record store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The seed file cannot be read.
    #[error("failed to read the records file {}: {source}", path.display())]
    Read {
        /// Seed file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The seed file is not a valid records document.
    #[error("invalid records document: {0}")]
    Document(#[from] serde_json::Error),
    /// A record identifier is already taken in its collection.
    #[error("duplicate {collection} identifier `{id}`")]
    Duplicate {
        /// Collection of the record.
        collection: Collection,
        /// Duplicated identifier.
        id: String,
    },
    /// The backing storage is not available.
    #[error("record storage unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the persisted device records.
///
/// Implementations provide their own synchronization: the store is shared
/// among concurrent requests.
pub trait RecordStore: Send + Sync + 'static {
    /// Looks up a record by its identifier within a collection.
    ///
    /// Returns [`None`] when no record matches.
    fn find_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, StoreError>> + Send;
}

/// The records document used to seed a [`MemoryStore`].
#[derive(Debug, Default, Deserialize)]
pub struct RecordsDocument {
    /// Records of the [`Collection::Ant`] collection.
    #[serde(default)]
    pub ants: Vec<DeviceRecord>,
    /// Records of the [`Collection::Spoke`] collection.
    #[serde(default)]
    pub spokes: Vec<DeviceRecord>,
}

/// An in-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    ants: RwLock<IndexMap<String, DeviceRecord>>,
    spokes: RwLock<IndexMap<String, DeviceRecord>>,
}

impl MemoryStore {
    /// Creates an empty [`MemoryStore`].
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`MemoryStore`] from a [`RecordsDocument`].
    ///
    /// # Errors
    ///
    /// An error is returned when an identifier appears twice in the same
    /// collection.
    pub async fn from_document(document: RecordsDocument) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in document.ants {
            store.insert(Collection::Ant, record).await?;
        }
        for record in document.spokes {
            store.insert(Collection::Spoke, record).await?;
        }
        Ok(store)
    }

    /// Loads a [`MemoryStore`] from a JSON records file.
    ///
    /// # Errors
    ///
    /// An error is returned when the file cannot be read, is not a valid
    /// [`RecordsDocument`], or contains duplicated identifiers.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_document(serde_json::from_str(&content)?).await?;

        let ants = store.len(Collection::Ant).await;
        let spokes = store.len(Collection::Spoke).await;
        info!(ants, spokes, "Records loaded from {}", path.display());

        Ok(store)
    }

    /// Inserts a record into a collection.
    ///
    /// # Errors
    ///
    /// An error is returned when the record identifier is already taken.
    pub async fn insert(&self, collection: Collection, record: DeviceRecord) -> Result<(), StoreError> {
        let mut records = self.collection(collection).write().await;
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate {
                collection,
                id: record.id,
            });
        }
        let _ = records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Returns the number of records in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collection(collection).read().await.len()
    }

    const fn collection(&self, collection: Collection) -> &RwLock<IndexMap<String, DeviceRecord>> {
        match collection {
            Collection::Ant => &self.ants,
            Collection::Spoke => &self.spokes,
        }
    }
}

impl RecordStore for MemoryStore {
    async fn find_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<DeviceRecord>, StoreError> {
        Ok(self.collection(collection).read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use antgrid::record::{Collection, DeviceRecord, NodeType};

    use super::{MemoryStore, RecordStore, RecordsDocument, StoreError};

    fn spoke(id: &str) -> DeviceRecord {
        DeviceRecord::new(id, id, NodeType::Spoke, "us")
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = MemoryStore::new();
        store.insert(Collection::Spoke, spoke("node-1")).await.unwrap();

        assert_eq!(
            store.find_by_id(Collection::Spoke, "node-1").await.unwrap(),
            Some(spoke("node-1"))
        );
        assert_eq!(
            store.find_by_id(Collection::Ant, "node-1").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn duplicate_identifier() {
        let store = MemoryStore::new();
        store.insert(Collection::Spoke, spoke("spoke-7")).await.unwrap();

        let error = store
            .insert(Collection::Spoke, spoke("spoke-7"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            StoreError::Duplicate { collection: Collection::Spoke, ref id } if id == "spoke-7"
        ));
        assert_eq!(store.len(Collection::Spoke).await, 1);
    }

    #[tokio::test]
    async fn seed_document() {
        let document: RecordsDocument = serde_json::from_str(
            r#"{
                "ants": [
                    { "id": "ant-1", "name": "a", "countryCode": "us", "status": "Active" }
                ],
                "spokes": [
                    { "id": "spoke-7", "name": "s", "nodeType": "Spoke",
                      "countryCode": "us", "status": "Active" },
                    { "id": "spoke-8", "name": "t", "nodeType": "Spoke",
                      "countryCode": "us", "status": "Inactive" }
                ]
            }"#,
        )
        .unwrap();

        let store = MemoryStore::from_document(document).await.unwrap();

        assert_eq!(store.len(Collection::Ant).await, 1);
        assert_eq!(store.len(Collection::Spoke).await, 2);
    }

    #[tokio::test]
    async fn missing_seed_file() {
        let error = MemoryStore::load(std::path::Path::new("/nonexistent/records.json"))
            .await
            .unwrap_err();

        assert!(matches!(error, StoreError::Read { .. }));
    }
}
