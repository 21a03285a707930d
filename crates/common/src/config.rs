//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project service provider (http, mock)
    pub service_provider: String,

    /// Base URL of the project service API
    pub api_base_url: String,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            service_provider: env::var("PROJECT_SERVICE_PROVIDER")
                .unwrap_or_else(|_| "mock".to_string()),

            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "promoreel=debug".to_string()),
        };

        Ok(config)
    }
}
