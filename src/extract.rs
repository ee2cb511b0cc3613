//! Boundary to the external feature-extraction component.
//!
//! The extractor turns raw image bytes into one embedding vector. It is an
//! opaque, possibly slow, possibly failing collaborator: callers invoke it on
//! a blocking thread and never while holding the store lock. Its response
//! shape is normalized exactly once, here; the core only ever sees `Vec<f64>`.

use crate::error::FaceError;
use serde_json::Value;
use std::time::Duration;

/// Produces an embedding from raw image bytes.
///
/// Blocking by contract. Implementations must not retry on failure; a failed
/// extraction surfaces to the caller as [`FaceError::Extraction`].
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> Result<Vec<f64>, FaceError>;
}

/// Extractor backed by an HTTP embedding service.
///
/// Posts the image bytes to the configured endpoint and normalizes the JSON
/// response through [`embedding_from_value`].
pub struct HttpExtractor {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpExtractor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpExtractor {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl FeatureExtractor for HttpExtractor {
    fn extract(&self, image: &[u8]) -> Result<Vec<f64>, FaceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .timeout(Duration::from_secs(30))
            .body(image.to_vec())
            .send()
            .map_err(|e| FaceError::Extraction(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FaceError::Extraction(format!(
                "extractor endpoint returned {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .map_err(|e| FaceError::Extraction(e.to_string()))?;

        embedding_from_value(&value)
    }
}

/// Normalizes the extractor's response into a single embedding vector.
///
/// The upstream service is known to answer in three shapes: a list of objects
/// carrying an `"embedding"` field (the first element wins), a single such
/// object, or a bare numeric array. Everything else is an extraction failure.
pub fn embedding_from_value(value: &Value) -> Result<Vec<f64>, FaceError> {
    if let Some(first) = value.as_array().and_then(|items| items.first()) {
        if let Some(embedding) = first.get("embedding") {
            return components(embedding);
        }
    }

    if let Some(embedding) = value.get("embedding") {
        return components(embedding);
    }

    components(value)
}

fn components(value: &Value) -> Result<Vec<f64>, FaceError> {
    let items = value.as_array().ok_or_else(unrecognized_shape)?;
    items
        .iter()
        .map(|item| item.as_f64().ok_or_else(unrecognized_shape))
        .collect()
}

fn unrecognized_shape() -> FaceError {
    FaceError::Extraction("unrecognized embedding shape in extractor response".to_string())
}

#[cfg(test)]
mod extract_test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_of_objects_takes_first_embedding() {
        let value = json!([
            {"embedding": [1.0, 2.0, 3.0], "facial_area": {"x": 1}},
            {"embedding": [9.0, 9.0, 9.0]}
        ]);

        assert_eq!(embedding_from_value(&value).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_single_object_with_embedding() {
        let value = json!({"embedding": [0.5, -0.5]});

        assert_eq!(embedding_from_value(&value).unwrap(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_bare_numeric_array() {
        let value = json!([1.0, 2.5, -3.0]);

        assert_eq!(embedding_from_value(&value).unwrap(), vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn test_integer_components_are_accepted() {
        let value = json!([1, 2, 3]);

        assert_eq!(embedding_from_value(&value).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_all_shapes_normalize_identically() {
        let expected = vec![0.25, 0.75];

        let shapes = [
            json!([{"embedding": [0.25, 0.75]}]),
            json!({"embedding": [0.25, 0.75]}),
            json!([0.25, 0.75]),
        ];

        for shape in &shapes {
            assert_eq!(embedding_from_value(shape).unwrap(), expected);
        }
    }

    #[test]
    fn test_object_without_embedding_is_rejected() {
        let value = json!({"message": "no face detected"});

        assert!(matches!(embedding_from_value(&value), Err(FaceError::Extraction(_))));
    }

    #[test]
    fn test_list_of_objects_without_embedding_is_rejected() {
        let value = json!([{"facial_area": {"x": 1}}]);

        assert!(matches!(embedding_from_value(&value), Err(FaceError::Extraction(_))));
    }

    #[test]
    fn test_non_numeric_component_is_rejected() {
        let value = json!([1.0, "two", 3.0]);

        assert!(matches!(embedding_from_value(&value), Err(FaceError::Extraction(_))));
    }

    #[test]
    fn test_scalar_is_rejected() {
        let value = json!("embedding");

        assert!(matches!(embedding_from_value(&value), Err(FaceError::Extraction(_))));
    }
}
