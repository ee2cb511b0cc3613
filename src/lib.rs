//! # facematch - A Minimal Identity-Verification Service
//!
//! facematch stores named face embeddings and matches query embeddings
//! against them by Euclidean distance. A match is accepted when the nearest
//! distance is strictly below a caller-supplied threshold; the threshold is
//! also classified into a qualitative tolerance band. The store is persisted
//! write-through as a single JSON snapshot.
//!
//! Feature extraction (image -> embedding) is an external collaborator
//! reached through the [`extract::FeatureExtractor`] boundary; the core only
//! ever handles fixed-dimension `f64` vectors.
//!
//! ## Example
//!
//! ```
//! use facematch::FaceStore;
//! use facematch::matcher::find_nearest;
//!
//! let mut store = FaceStore::new();
//! store.register("alice".to_string(), vec![0.0, 0.0]).unwrap();
//! store.register("bob".to_string(), vec![10.0, 10.0]).unwrap();
//!
//! let outcome = find_nearest(&store, &[0.1, 0.1], 0.7).unwrap();
//! assert_eq!(outcome.identity.as_deref(), Some("alice"));
//! ```

pub mod bands;
pub mod config;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod server;
pub mod shared;
pub mod store;
pub mod vector;

// Re-export the primary public API
pub use error::FaceError;
pub use shared::SharedStore;
pub use store::{FaceStore, RegisterOutcome};
