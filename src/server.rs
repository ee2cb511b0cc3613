//! REST API for facematch.
//!
//! Exposes the two service operations over a shared in-process store:
//!
//! - `POST /register` - extract an embedding from an image and store it under a name
//! - `POST /recognize` - find the closest stored identity for an image
//!
//! Images travel as base64 strings inside JSON bodies. Feature extraction runs
//! on the blocking thread pool before any store lock is taken, so a slow or
//! failing extractor never stalls unrelated requests. Error kinds are mapped
//! to transport statuses in one place, [`error_response`]; the core never sees
//! HTTP concerns.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpServer};
//! use facematch::extract::HttpExtractor;
//! use facematch::server::AppState;
//! use facematch::SharedStore;
//! use std::sync::Arc;
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let state = web::Data::new(AppState {
//!         store: SharedStore::open("embeddings.json").expect("snapshot"),
//!         extractor: Arc::new(HttpExtractor::new("http://127.0.0.1:5000/represent")),
//!     });
//!     HttpServer::new(move || {
//!         App::new()
//!             .app_data(state.clone())
//!             .configure(facematch::server::config)
//!     })
//!     .bind("0.0.0.0:7878")?
//!     .run()
//!     .await
//! }
//! ```

use crate::bands::ThresholdBand;
use crate::error::FaceError;
use crate::extract::FeatureExtractor;
use crate::shared::SharedStore;
use crate::store::RegisterOutcome;
use actix_web::{web, HttpResponse, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared per-process service state, injected into every handler.
pub struct AppState {
    pub store: SharedStore,
    pub extractor: Arc<dyn FeatureExtractor>,
}

// --- Request structs ---

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    /// Base64-encoded image bytes.
    image: String,
}

#[derive(Deserialize)]
struct RecognizeRequest {
    image: String,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_threshold() -> f64 {
    0.7
}

// --- Response structs ---

#[derive(Serialize)]
struct RegisterResponse {
    message: String,
}

#[derive(Serialize)]
struct RecognizeResponse {
    identity: Option<String>,
    distance: Option<f64>,
    threshold: f64,
    band_label: &'static str,
    band_description: &'static str,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct EmptyStoreResponse {
    identity: Option<String>,
    distance: Option<f64>,
    message: &'static str,
}

/// The single place error kinds become transport statuses.
fn error_response(err: &FaceError) -> HttpResponse {
    let body = serde_json::json!({"error": err.kind(), "detail": err.to_string()});
    match err {
        FaceError::Extraction(_) => HttpResponse::BadGateway().json(body),
        FaceError::DimensionMismatch { .. } => HttpResponse::UnprocessableEntity().json(body),
        FaceError::Persistence { .. } | FaceError::CorruptSnapshot { .. } => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn blocking_cancelled() -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(serde_json::json!({"error": "internal", "detail": "blocking task cancelled"}))
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, HttpResponse> {
    BASE64.decode(encoded).map_err(|e| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "bad_request",
            "detail": format!("invalid base64 image: {}", e)
        }))
    })
}

// --- Handlers ---

async fn register_handler(state: web::Data<AppState>, body: web::Json<RegisterRequest>) -> impl Responder {
    let image = match decode_image(&body.image) {
        Ok(bytes) => bytes,
        Err(resp) => return resp,
    };

    let name = body.name.clone();
    let data = state.clone();
    let result = web::block(move || {
        // extraction happens before the store's write lock is taken
        let embedding = data.extractor.extract(&image)?;
        data.store.register(name, embedding)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => {
            info!(name = %body.name, ?outcome, "face registered");
            let message = match outcome {
                RegisterOutcome::Inserted => format!("Face \"{}\" registered.", body.name),
                RegisterOutcome::Replaced => format!("Face \"{}\" updated.", body.name),
            };
            HttpResponse::Ok().json(RegisterResponse { message })
        }
        Ok(Err(err)) => {
            warn!(name = %body.name, error = %err, "registration failed");
            error_response(&err)
        }
        Err(_) => blocking_cancelled(),
    }
}

async fn recognize_handler(state: web::Data<AppState>, body: web::Json<RecognizeRequest>) -> impl Responder {
    if state.store.is_empty() {
        return HttpResponse::Ok().json(EmptyStoreResponse {
            identity: None,
            distance: None,
            message: "no records",
        });
    }

    let image = match decode_image(&body.image) {
        Ok(bytes) => bytes,
        Err(resp) => return resp,
    };

    let threshold = body.threshold;
    let started = Instant::now();

    let data = state.clone();
    let result = web::block(move || {
        let query = data.extractor.extract(&image)?;
        data.store.find_nearest(&query, threshold)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let band = ThresholdBand::classify(threshold);
            info!(
                identity = outcome.identity.as_deref().unwrap_or("<none>"),
                distance = ?outcome.distance,
                threshold,
                elapsed_ms,
                "recognition completed"
            );
            HttpResponse::Ok().json(RecognizeResponse {
                identity: outcome.identity,
                distance: outcome.distance,
                threshold,
                band_label: band.label(),
                band_description: band.description(),
                elapsed_ms,
            })
        }
        Ok(Err(err)) => {
            warn!(error = %err, "recognition failed");
            error_response(&err)
        }
        Err(_) => blocking_cancelled(),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register_handler)))
        .service(web::resource("/recognize").route(web::post().to(recognize_handler)));
}
