//! Nearest-neighbor matching over the identity store.

use crate::error::FaceError;
use crate::store::FaceStore;
use crate::vector::euclidean_distance;
use serde::Serialize;

/// Result of a nearest-neighbor scan.
///
/// `distance` is the minimum distance found, reported even when the match is
/// rejected by the threshold. Both fields are `None` only for an empty store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub identity: Option<String>,
    pub distance: Option<f64>,
}

/// Finds the stored identity closest to `query` and applies the threshold
/// decision.
///
/// Scans every record in the store's iteration order, tracking the minimum
/// Euclidean distance with a strict less-than comparison, so equal distances
/// keep the earliest-encountered record. The winning identity is accepted
/// only when its distance is strictly below `threshold`.
///
/// An empty store yields `{ identity: None, distance: None }`; this is an
/// explicit empty result, not an error.
///
/// # Errors
///
/// [`FaceError::DimensionMismatch`] when the query's length differs from the
/// store's established dimension.
///
/// # Examples
///
/// ```
/// use facematch::FaceStore;
/// use facematch::matcher::find_nearest;
///
/// let mut store = FaceStore::new();
/// store.register("alice".to_string(), vec![0.0, 0.0]).unwrap();
/// store.register("bob".to_string(), vec![10.0, 10.0]).unwrap();
///
/// let outcome = find_nearest(&store, &[0.1, 0.1], 0.7).unwrap();
/// assert_eq!(outcome.identity.as_deref(), Some("alice"));
/// ```
pub fn find_nearest(store: &FaceStore, query: &[f64], threshold: f64) -> Result<MatchOutcome, FaceError> {
    let Some(expected) = store.dimension() else {
        return Ok(MatchOutcome { identity: None, distance: None });
    };

    if query.len() != expected {
        return Err(FaceError::DimensionMismatch { expected, actual: query.len() });
    }

    let mut nearest: Option<&str> = None;
    let mut min_dist = f64::INFINITY;

    for (name, embedding) in store.records() {
        let dist = euclidean_distance(query, embedding);
        if dist < min_dist {
            min_dist = dist;
            nearest = Some(name);
        }
    }

    let identity = if min_dist < threshold {
        nearest.map(str::to_string)
    } else {
        None
    };

    Ok(MatchOutcome { identity, distance: Some(min_dist) })
}

#[cfg(test)]
mod matcher_test {
    use super::*;

    fn two_face_store() -> FaceStore {
        let mut store = FaceStore::new();
        store.register("alice".to_string(), vec![0.0, 0.0]).unwrap();
        store.register("bob".to_string(), vec![10.0, 10.0]).unwrap();
        store
    }

    #[test]
    fn test_empty_store_is_an_empty_result() {
        let store = FaceStore::new();

        let outcome = find_nearest(&store, &[1.0, 2.0], 0.7).unwrap();
        assert_eq!(outcome, MatchOutcome { identity: None, distance: None });
    }

    #[test]
    fn test_exact_embedding_matches_at_distance_zero() {
        let mut store = FaceStore::new();
        store.register("alice".to_string(), vec![0.2, -0.4, 0.6]).unwrap();

        let outcome = find_nearest(&store, &[0.2, -0.4, 0.6], 0.7).unwrap();
        assert_eq!(outcome.identity.as_deref(), Some("alice"));
        assert!(outcome.distance.unwrap() < 1e-12);
    }

    #[test]
    fn test_nearest_identity_accepted_below_threshold() {
        let store = two_face_store();

        let outcome = find_nearest(&store, &[0.1, 0.1], 0.7).unwrap();
        assert_eq!(outcome.identity.as_deref(), Some("alice"));
        assert!((outcome.distance.unwrap() - 0.1414).abs() < 1e-3);
    }

    #[test]
    fn test_rejection_still_reports_distance() {
        let store = two_face_store();

        let outcome = find_nearest(&store, &[0.1, 0.1], 0.1).unwrap();
        assert_eq!(outcome.identity, None);
        assert!((outcome.distance.unwrap() - 0.1414).abs() < 1e-3);
    }

    #[test]
    fn test_threshold_comparison_is_strict() {
        let mut store = FaceStore::new();
        store.register("alice".to_string(), vec![0.0, 0.0]).unwrap();

        // distance is exactly 5.0; equal to the threshold must reject
        let outcome = find_nearest(&store, &[3.0, 4.0], 5.0).unwrap();
        assert_eq!(outcome.identity, None);
        assert_eq!(outcome.distance, Some(5.0));

        let outcome = find_nearest(&store, &[3.0, 4.0], 5.0001).unwrap();
        assert_eq!(outcome.identity.as_deref(), Some("alice"));
    }

    #[test]
    fn test_tie_keeps_earliest_record() {
        let mut store = FaceStore::new();
        store.register("first".to_string(), vec![1.0, 0.0]).unwrap();
        store.register("second".to_string(), vec![1.0, 0.0]).unwrap();

        let outcome = find_nearest(&store, &[1.0, 0.0], 0.5).unwrap();
        assert_eq!(outcome.identity.as_deref(), Some("first"));
    }

    #[test]
    fn test_equidistant_records_keep_earliest() {
        let mut store = FaceStore::new();
        store.register("left".to_string(), vec![-1.0, 0.0]).unwrap();
        store.register("right".to_string(), vec![1.0, 0.0]).unwrap();

        // the origin is exactly 1.0 from both
        let outcome = find_nearest(&store, &[0.0, 0.0], 2.0).unwrap();
        assert_eq!(outcome.identity.as_deref(), Some("left"));
        assert_eq!(outcome.distance, Some(1.0));
    }

    #[test]
    fn test_acceptance_is_monotone_in_threshold() {
        let store = two_face_store();
        let query = [0.3, 0.4]; // distance 0.5 from alice

        // accepted at a stricter threshold implies accepted at every looser one
        let strict = find_nearest(&store, &query, 0.6).unwrap();
        let loose = find_nearest(&store, &query, 0.9).unwrap();
        assert!(strict.identity.is_some());
        assert!(loose.identity.is_some());
        assert_eq!(strict.distance, loose.distance);

        // and the distance report does not depend on the threshold at all
        let rejected = find_nearest(&store, &query, 0.4).unwrap();
        assert_eq!(rejected.identity, None);
        assert_eq!(rejected.distance, strict.distance);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let store = two_face_store();

        let result = find_nearest(&store, &[1.0, 2.0, 3.0], 0.7);
        match result {
            Err(FaceError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other.map(|_| ())),
        }
    }
}
