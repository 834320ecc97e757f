//! In-memory collections backed by a [`RecordStore`].
//!
//! A [`Collection`] is the single source of truth for its records while the
//! process runs. The store is read once, at [`Collection::open`], and every
//! successful mutation enqueues a full snapshot on the collection's writer
//! task. The writer handles one snapshot at a time, so saves for the same
//! collection never interleave on disk, and snapshots that were already
//! superseded by a newer one when the writer got to them are skipped.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};

use crate::store::{RecordStore, StoreError};

type Ack = oneshot::Sender<Result<(), StoreError>>;

struct WriteRequest<T> {
    snapshot: Vec<T>,
    ack: Option<Ack>,
}

/// An ordered, process-wide set of records with write-behind persistence.
pub struct Collection<T> {
    name: &'static str,
    records: RwLock<Vec<T>>,
    writer: mpsc::UnboundedSender<WriteRequest<T>>,
}

impl<T> Collection<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Load the collection from `store`, falling back to `default`.
    ///
    /// A missing, unreadable or malformed snapshot is logged and replaced by
    /// `default`, which is immediately queued for writing. This never fails.
    pub async fn open(name: &'static str, store: Arc<dyn RecordStore<T>>, default: Vec<T>) -> Self {
        let location = store.describe();

        let (records, heal) = match store.read().await {
            Ok(Some(records)) => {
                tracing::info!(
                    collection = name,
                    location = %location,
                    count = records.len(),
                    "Collection loaded"
                );
                (records, false)
            }
            Ok(None) => {
                tracing::info!(
                    collection = name,
                    location = %location,
                    "No stored collection found, starting from defaults"
                );
                (default, true)
            }
            Err(e) => {
                tracing::error!(
                    collection = name,
                    location = %location,
                    error = %e,
                    "Stored collection unusable, replacing with defaults"
                );
                (default, true)
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(name, store, rx));

        let collection = Self {
            name,
            records: RwLock::new(records),
            writer: tx,
        };

        if heal {
            let snapshot = collection.records.read().await.clone();
            collection.enqueue(snapshot, None);
        }

        collection
    }

    /// Run `f` against the current records.
    pub async fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let records = self.records.read().await;
        f(records.as_slice())
    }

    /// Run `f` with exclusive access to the records.
    ///
    /// When `f` returns `Ok`, a snapshot of the result is queued for writing
    /// before the lock is released, so the on-disk order of snapshots follows
    /// the order of mutations. The write itself is not awaited and its failure
    /// is only logged; use [`Collection::flush`] to wait for durability.
    pub async fn mutate<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut records = self.records.write().await;
        let outcome = f(&mut *records)?;
        self.enqueue(records.clone(), None);
        Ok(outcome)
    }

    /// Append `record` and queue a snapshot.
    pub async fn push(&self, record: T) {
        let mut records = self.records.write().await;
        records.push(record);
        self.enqueue(records.clone(), None);
    }

    /// Keep only the records matching `keep`, returning how many were removed.
    /// Nothing is written when no record was removed.
    pub async fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| keep(r));
        let removed = before - records.len();
        if removed > 0 {
            self.enqueue(records.clone(), None);
        }
        removed
    }

    /// Write the current records and wait for the outcome.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (ack, done) = oneshot::channel();
        {
            let records = self.records.read().await;
            if !self.enqueue(records.clone(), Some(ack)) {
                return Err(StoreError::WriterClosed(self.name));
            }
        }
        done.await.unwrap_or(Err(StoreError::WriterClosed(self.name)))
    }

    fn enqueue(&self, snapshot: Vec<T>, ack: Option<Ack>) -> bool {
        if self.writer.send(WriteRequest { snapshot, ack }).is_err() {
            tracing::error!(collection = self.name, "Collection writer is gone, snapshot dropped");
            return false;
        }
        true
    }
}

/// Drain write requests for one collection until every sender is dropped.
async fn run_writer<T>(
    name: &'static str,
    store: Arc<dyn RecordStore<T>>,
    mut requests: mpsc::UnboundedReceiver<WriteRequest<T>>,
) where
    T: Send + Sync + 'static,
{
    while let Some(request) = requests.recv().await {
        let mut snapshot = request.snapshot;
        let mut acks: Vec<Ack> = request.ack.into_iter().collect();
        let mut coalesced = 0usize;

        while let Ok(newer) = requests.try_recv() {
            snapshot = newer.snapshot;
            acks.extend(newer.ack);
            coalesced += 1;
        }

        let result = store.write(&snapshot).await;
        match &result {
            Ok(()) => tracing::debug!(
                collection = name,
                count = snapshot.len(),
                coalesced,
                "Collection saved"
            ),
            Err(e) => tracing::error!(
                collection = name,
                location = %store.describe(),
                error = %e,
                "Could not save collection"
            ),
        }

        for ack in acks {
            let reply = match &result {
                Ok(()) => Ok(()),
                Err(e) => Err(StoreError::WriteFailed {
                    collection: name,
                    reason: e.to_string(),
                }),
            };
            let _ = ack.send(reply);
        }
    }

    tracing::debug!(collection = name, "Collection writer stopped");
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
    }

    fn items(ids: &[i64]) -> Vec<Item> {
        ids.iter().map(|&id| Item { id }).collect()
    }

    async fn open(store: Arc<dyn RecordStore<Item>>, default: Vec<Item>) -> Collection<Item> {
        Collection::open("items", store, default).await
    }

    /// Reads nothing and rejects every write.
    struct BrokenStore;

    #[async_trait]
    impl RecordStore<Item> for BrokenStore {
        fn describe(&self) -> String {
            "broken".into()
        }

        async fn read(&self) -> Result<Option<Vec<Item>>, StoreError> {
            Ok(None)
        }

        async fn write(&self, _records: &[Item]) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[tokio::test]
    async fn stored_records_win_over_defaults() {
        let store = Arc::new(MemoryStore::with_records(items(&[3, 1, 2])));
        let collection = open(store.clone(), items(&[99])).await;

        let ids = collection.read(|r| r.iter().map(|i| i.id).collect::<Vec<_>>()).await;
        assert_eq!(ids, vec![3, 1, 2]);
        collection.flush().await.unwrap();
        assert_eq!(store.write_count(), 1, "only the explicit flush writes");
    }

    #[tokio::test]
    async fn missing_snapshot_is_replaced_by_defaults_and_persisted() {
        let store = Arc::new(MemoryStore::<Item>::new());
        let collection = open(store.clone(), items(&[1])).await;

        collection.flush().await.unwrap();
        assert_eq!(store.snapshot(), Some(items(&[1])));
    }

    #[tokio::test]
    async fn corrupt_file_heals_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, "[{\"id\": ").unwrap();

        let store = Arc::new(JsonFileStore::<Item>::new(&path));
        let collection = open(store.clone(), Vec::new()).await;
        collection.flush().await.unwrap();

        assert_eq!(store.read().await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn successful_mutation_is_persisted() {
        let store = Arc::new(MemoryStore::with_records(Vec::<Item>::new()));
        let collection = open(store.clone(), Vec::new()).await;

        collection
            .mutate(|r| {
                r.push(Item { id: 7 });
                Ok::<_, ()>(())
            })
            .await
            .unwrap();
        collection.flush().await.unwrap();

        assert_eq!(store.snapshot(), Some(items(&[7])));
    }

    #[tokio::test]
    async fn failed_mutation_is_not_persisted() {
        let store = Arc::new(MemoryStore::with_records(items(&[1])));
        let collection = open(store.clone(), Vec::new()).await;

        let result = collection.mutate(|_| Err::<(), _>("nope")).await;
        assert_eq!(result, Err("nope"));

        // Give the writer a chance to run if anything had been queued.
        tokio::task::yield_now().await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn push_and_retain() {
        let store = Arc::new(MemoryStore::with_records(items(&[1, 2])));
        let collection = open(store.clone(), Vec::new()).await;

        collection.push(Item { id: 3 }).await;
        assert_eq!(collection.retain(|i| i.id != 2).await, 1);
        assert_eq!(collection.retain(|i| i.id != 42).await, 0);
        collection.flush().await.unwrap();

        assert_eq!(store.snapshot(), Some(items(&[1, 3])));
    }

    #[tokio::test]
    async fn last_snapshot_wins_after_many_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::<Item>::new(dir.path().join("items.json")));
        let collection = open(store.clone(), Vec::new()).await;

        for id in 0..50 {
            collection
                .mutate(|r| {
                    r.push(Item { id });
                    Ok::<_, ()>(())
                })
                .await
                .unwrap();
        }
        collection.flush().await.unwrap();

        let on_disk = store.read().await.unwrap().unwrap();
        let in_memory = collection.read(|r| r.to_vec()).await;
        assert_eq!(on_disk, in_memory);
        assert_eq!(on_disk.len(), 50);
    }

    #[tokio::test]
    async fn write_failures_stay_in_memory_but_surface_on_flush() {
        let collection = open(Arc::new(BrokenStore), Vec::new()).await;

        collection
            .mutate(|r| {
                r.push(Item { id: 1 });
                Ok::<_, ()>(())
            })
            .await
            .unwrap();

        assert_eq!(collection.read(|r| r.len()).await, 1);
        assert_matches!(
            collection.flush().await,
            Err(StoreError::WriteFailed { collection: "items", .. })
        );
    }
}
