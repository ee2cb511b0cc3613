//! The identity store module.
//! Maps identity names to face embeddings and owns the snapshot lifecycle.

use crate::error::FaceError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Whether a registration created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    Replaced,
}

/// In-memory identity store: unique names with fixed-dimension embeddings.
///
/// Embeddings are stored contiguously as `[e1_d1, .., e1_dn, e2_d1, ..]` with
/// names in a parallel vector, so iteration follows insertion order. The
/// dimension is established by the first registration; every later embedding
/// must match it. Records are never deleted.
#[derive(Clone)]
pub struct FaceStore {
    names: Vec<String>,
    embeddings: Vec<f64>,
    dimension: Option<usize>,
}

impl FaceStore {
    /// Creates a new empty store with no dimension constraint.
    ///
    /// # Examples
    ///
    /// ```
    /// use facematch::FaceStore;
    ///
    /// let store = FaceStore::new();
    /// assert_eq!(store.count(), 0);
    /// ```
    pub fn new() -> FaceStore {
        FaceStore { names: Vec::new(), embeddings: Vec::new(), dimension: None }
    }

    /// Inserts or overwrites the embedding for `name`.
    ///
    /// The first registration establishes the store's dimension. Registering
    /// an existing name replaces its embedding in place, so names stay
    /// unique.
    ///
    /// # Errors
    ///
    /// [`FaceError::DimensionMismatch`] when the embedding's length disagrees
    /// with the established dimension. The store is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use facematch::{FaceStore, RegisterOutcome};
    ///
    /// let mut store = FaceStore::new();
    ///
    /// let outcome = store.register("alice".to_string(), vec![1.0, 2.0]).unwrap();
    /// assert_eq!(outcome, RegisterOutcome::Inserted);
    ///
    /// // Same name again: overwrite, not duplicate
    /// let outcome = store.register("alice".to_string(), vec![3.0, 4.0]).unwrap();
    /// assert_eq!(outcome, RegisterOutcome::Replaced);
    /// assert_eq!(store.count(), 1);
    ///
    /// // Wrong dimension is rejected
    /// assert!(store.register("bob".to_string(), vec![1.0, 2.0, 3.0]).is_err());
    /// ```
    pub fn register(&mut self, name: String, embedding: Vec<f64>) -> Result<RegisterOutcome, FaceError> {
        let dim = embedding.len();
        match self.dimension {
            None => {
                self.dimension = Some(dim);
            }
            Some(d) => {
                if dim != d {
                    return Err(FaceError::DimensionMismatch { expected: d, actual: dim });
                }
            }
        }

        if let Some(index) = self.names.iter().position(|n| n == &name) {
            let start = index * dim;
            self.embeddings.splice(start..start + dim, embedding);
            return Ok(RegisterOutcome::Replaced);
        }

        self.names.push(name);
        self.embeddings.extend(embedding);

        Ok(RegisterOutcome::Inserted)
    }

    /// Retrieves the embedding registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        let index = self.names.iter().position(|n| n == name)?;
        Some(self.embedding_at(index))
    }

    /// Iterates `(name, embedding)` pairs in insertion order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .enumerate()
            .map(move |(i, name)| (name.as_str(), self.embedding_at(i)))
    }

    /// Returns the number of registered identities.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// True when no identity has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The established embedding dimension, or `None` while the store is
    /// empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Slices the flat embedding array at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the dimension is unset or the index is out of bounds.
    fn embedding_at(&self, index: usize) -> &[f64] {
        let dim = self.dimension.expect("non-empty store has a dimension");
        &self.embeddings[index * dim..(index + 1) * dim]
    }

    /// Writes the full snapshot to `path` as a single JSON document mapping
    /// each name to its embedding.
    ///
    /// The document is written to a sibling temporary file and renamed over
    /// the target, so a failed write never destroys the previous snapshot.
    ///
    /// # Errors
    ///
    /// [`FaceError::Persistence`] when the file cannot be written.
    pub fn save(&self, path: &str) -> Result<(), FaceError> {
        let persistence = |reason: String| FaceError::Persistence { path: path.to_string(), reason };

        let document: BTreeMap<&str, &[f64]> = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), self.embedding_at(i)))
            .collect();

        let tmp_path = format!("{}.tmp", path);
        let file = File::create(&tmp_path).map_err(|e| persistence(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &document).map_err(|e| persistence(e.to_string()))?;
        writer.flush().map_err(|e| persistence(e.to_string()))?;
        std::fs::rename(&tmp_path, path).map_err(|e| persistence(e.to_string()))?;

        Ok(())
    }

    /// Reconstructs a store from the snapshot at `path`.
    ///
    /// A missing file yields an empty store. A snapshot that cannot be
    /// parsed, or whose embeddings disagree in dimension, is
    /// [`FaceError::CorruptSnapshot`] so startup aborts instead of silently
    /// discarding data.
    pub fn load(path: &str) -> Result<Self, FaceError> {
        if !Path::new(path).exists() {
            return Ok(FaceStore::new());
        }

        let corrupt = |reason: String| FaceError::CorruptSnapshot { path: path.to_string(), reason };

        let file = File::open(path).map_err(|e| corrupt(e.to_string()))?;
        let reader = BufReader::new(file);
        let document: BTreeMap<String, Vec<f64>> =
            serde_json::from_reader(reader).map_err(|e| corrupt(e.to_string()))?;

        let mut store = FaceStore::new();
        for (name, embedding) in document {
            store.register(name, embedding).map_err(|e| corrupt(e.to_string()))?;
        }

        Ok(store)
    }
}

impl Default for FaceStore {
    fn default() -> Self {
        Self::new()
    }
}
