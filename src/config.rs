//! Runtime configuration, read once at startup.

use std::env;

/// Service settings with environment overrides.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to. `FACEMATCH_BIND`.
    pub bind: String,
    /// Path of the durable embedding snapshot. `FACEMATCH_SNAPSHOT`.
    pub snapshot_path: String,
    /// Endpoint of the external feature-extraction service.
    /// `FACEMATCH_EXTRACTOR_URL`.
    pub extractor_url: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            bind: env_or("FACEMATCH_BIND", "0.0.0.0:7878"),
            snapshot_path: env_or("FACEMATCH_SNAPSHOT", "embeddings.json"),
            extractor_url: env_or("FACEMATCH_EXTRACTOR_URL", "http://127.0.0.1:5000/represent"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
