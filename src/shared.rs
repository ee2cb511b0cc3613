//! Concurrency and write-through wrapper around [`FaceStore`].

use crate::error::FaceError;
use crate::matcher::{self, MatchOutcome};
use crate::store::{FaceStore, RegisterOutcome};
use parking_lot::RwLock;
use tracing::debug;

/// Process-wide store handle shared by all request handlers.
///
/// Registrations take the write lock for the whole read-modify-write-persist
/// sequence, so writers are fully serialized and a lost update cannot occur.
/// The mutation is applied to a clone which is persisted before being
/// published by assignment: if the snapshot write fails, the published state
/// is untouched and the registration fails atomically.
///
/// Recognitions take the read lock and scan a consistent view; any number of
/// readers proceed concurrently with each other.
pub struct SharedStore {
    inner: RwLock<FaceStore>,
    path: String,
}

impl SharedStore {
    /// Opens the store backed by the snapshot at `path`.
    ///
    /// A missing snapshot starts the store empty; a corrupt one is an error
    /// the caller should treat as fatal.
    pub fn open(path: &str) -> Result<Self, FaceError> {
        let store = FaceStore::load(path)?;
        debug!(path, records = store.count(), "snapshot loaded");
        Ok(SharedStore { inner: RwLock::new(store), path: path.to_string() })
    }

    /// Registers `name`, persisting the full snapshot before the new state
    /// becomes visible to readers.
    pub fn register(&self, name: String, embedding: Vec<f64>) -> Result<RegisterOutcome, FaceError> {
        let mut current = self.inner.write();

        let mut next = current.clone();
        let outcome = next.register(name, embedding)?;
        next.save(&self.path)?;

        *current = next;
        Ok(outcome)
    }

    /// Runs the matcher against a consistent view of the store.
    pub fn find_nearest(&self, query: &[f64], threshold: f64) -> Result<MatchOutcome, FaceError> {
        matcher::find_nearest(&self.inner.read(), query, threshold)
    }

    /// An owned point-in-time copy of the store, for consumers that must not
    /// hold the lock.
    pub fn snapshot(&self) -> FaceStore {
        self.inner.read().clone()
    }

    pub fn count(&self) -> usize {
        self.inner.read().count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod shared_test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_is_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        let path_str = path.to_str().unwrap();

        let store = SharedStore::open(path_str).unwrap();
        store.register("alice".to_string(), vec![1.0, 2.0]).unwrap();

        // the snapshot on disk already reflects the registration
        let on_disk = FaceStore::load(path_str).unwrap();
        assert_eq!(on_disk.get("alice").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_failed_persistence_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("data");
        std::fs::create_dir(&sub).unwrap();
        let path = sub.join("embeddings.json");

        let store = SharedStore::open(path.to_str().unwrap()).unwrap();
        store.register("alice".to_string(), vec![1.0, 2.0]).unwrap();

        // make the snapshot directory disappear so the next write must fail
        std::fs::remove_dir_all(&sub).unwrap();

        let result = store.register("bob".to_string(), vec![3.0, 4.0]);
        assert!(matches!(result, Err(FaceError::Persistence { .. })));

        // in-memory state still holds exactly the pre-call records
        assert_eq!(store.count(), 1);
        let outcome = store.find_nearest(&[1.0, 2.0], 0.5).unwrap();
        assert_eq!(outcome.identity.as_deref(), Some("alice"));
    }

    #[test]
    fn test_rejected_registration_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");

        let store = SharedStore::open(path.to_str().unwrap()).unwrap();
        store.register("alice".to_string(), vec![1.0, 2.0]).unwrap();

        let result = store.register("bob".to_string(), vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(FaceError::DimensionMismatch { .. })));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_concurrent_registers_and_recognitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");

        let store = Arc::new(SharedStore::open(path.to_str().unwrap()).unwrap());
        let mut handles = vec![];

        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .register(format!("face_{}", i), vec![i as f64, 0.0, 0.0])
                    .unwrap();
            }));
        }

        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                // either an empty result or a consistent scan; never a panic
                let _ = store.find_nearest(&[0.0, 0.0, 0.0], 0.7);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count(), 10);

        // no lost update: every registration survived to disk
        let on_disk = FaceStore::load(path.to_str().unwrap()).unwrap();
        assert_eq!(on_disk.count(), 10);
    }
}
