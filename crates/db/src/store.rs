//! Record stores: where a collection's snapshot lives between process runs.
//!
//! A [`RecordStore`] only knows how to read and overwrite one whole
//! collection. The self-healing load and the write queue live in
//! [`crate::collection`]; stores hold no business semantics.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Failure reading or writing a collection snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The collection's writer task is gone, so the save was never attempted.
    #[error("Writer for collection '{0}' has shut down")]
    WriterClosed(&'static str),

    /// Reported to callers waiting on a flush; the underlying error is logged
    /// by the writer.
    #[error("Failed to write collection '{collection}': {reason}")]
    WriteFailed {
        collection: &'static str,
        reason: String,
    },
}

/// Backing storage for one named collection of records.
#[async_trait]
pub trait RecordStore<T>: Send + Sync + 'static {
    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;

    /// Read the stored snapshot. `Ok(None)` means nothing has been stored yet.
    async fn read(&self) -> Result<Option<Vec<T>>, StoreError>;

    /// Replace the stored snapshot with `records`.
    async fn write(&self, records: &[T]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// A collection stored as a pretty-printed JSON array in a single file.
///
/// Writes go to `<file>.tmp` and are renamed over the target, so readers never
/// observe a half-written file.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<Option<Vec<T>>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write(&self, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps the last written snapshot in memory. Used by tests and by anything
/// that wants repositories without touching the filesystem.
pub struct MemoryStore<T> {
    snapshot: Mutex<Option<Vec<T>>>,
    writes: Mutex<usize>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(None),
            writes: Mutex::new(0),
        }
    }

    /// Start with `records` already "on disk".
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            snapshot: Mutex::new(Some(records)),
            writes: Mutex::new(0),
        }
    }

    /// The last snapshot written (or seeded), if any.
    pub fn snapshot(&self) -> Option<Vec<T>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of completed writes.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn read(&self) -> Result<Option<Vec<T>>, StoreError> {
        Ok(self.snapshot())
    }

    async fn write(&self, records: &[T]) -> Result<(), StoreError> {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(records.to_vec());
        *self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: i64,
        text: String,
    }

    fn notes() -> Vec<Note> {
        vec![
            Note { id: 2, text: "second".into() },
            Note { id: 1, text: "first".into() },
        ]
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Note>::new(dir.path().join("notes.json"));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Note>::new(dir.path().join("notes.json"));

        store.write(&notes()).await.unwrap();

        assert_eq!(store.read().await.unwrap(), Some(notes()));
        assert!(!store.temp_path().exists(), "temp file must be renamed away");
    }

    #[tokio::test]
    async fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Note>::new(dir.path().join("nested/data/notes.json"));

        store.write(&notes()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::<Note>::new(path);
        assert_matches!(store.read().await, Err(StoreError::Json(_)));
    }

    #[tokio::test]
    async fn memory_store_counts_writes() {
        let store = MemoryStore::<Note>::new();
        assert!(store.read().await.unwrap().is_none());

        store.write(&notes()).await.unwrap();
        store.write(&notes()[..1]).await.unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }
}
