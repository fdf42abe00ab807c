// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and cached in memory. For local
//! development a `.env` file is honored via dotenvy.

use std::env;

/// Configuration shared by the sync and report binaries.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (secret `strava-client-id`)
    pub strava_client_id: String,
    /// Strava OAuth client secret (secret `strava-secret`)
    pub strava_secret: String,
    /// Long-lived refresh token (secret `strava-refresh-token`)
    pub strava_refresh_token: String,
    /// Path to the DuckDB warehouse file
    pub warehouse_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: require("STRAVA_CLIENT_ID")?,
            strava_secret: require("STRAVA_SECRET")?,
            strava_refresh_token: require("STRAVA_REFRESH_TOKEN")?,
            warehouse_path: env::var("WAREHOUSE_PATH")
                .unwrap_or_else(|_| "strava.duckdb".to_string()),
        })
    }

    /// Warehouse-only configuration for the reporter, which has no use for
    /// the Strava credentials.
    pub fn warehouse_from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            strava_client_id: String::new(),
            strava_secret: String::new(),
            strava_refresh_token: String::new(),
            warehouse_path: env::var("WAREHOUSE_PATH")
                .unwrap_or_else(|_| "strava.duckdb".to_string()),
        }
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
