use std::env;

use dotenvy::dotenv;

/// Default backend address used by local development setups.
pub const DEFAULT_API_BASE: &str = "http://localhost:5001/api";

const API_BASE_ENV: &str = "INTERNLINK_API_BASE_URL";

/// Connection settings for the InternLink backend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the configuration from the environment, falling back to the
    /// local development address when no override is set.
    pub fn from_env() -> Self {
        dotenv().ok();
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
