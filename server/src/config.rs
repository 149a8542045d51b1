use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_APP_ID: &str = "demo-app";
pub const DEFAULT_MAX_MERGE_RETRIES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Namespace for every document path
    pub app_id: String,
    /// Redis connection string; the in-memory store is used when unset
    pub redis_url: Option<String>,
    /// Extra read-merge-write cycles allowed after a version conflict
    pub max_merge_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            redis_url: None,
            max_merge_retries: DEFAULT_MAX_MERGE_RETRIES,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let app_id = env::var("MINDGAMES_APP_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());

        let redis_url = env::var("MINDGAMES_REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let max_merge_retries = match env::var("MINDGAMES_MAX_MERGE_RETRIES") {
            Ok(value) => value
                .trim()
                .parse()
                .context("MINDGAMES_MAX_MERGE_RETRIES must be a non-negative integer")?,
            Err(_) => DEFAULT_MAX_MERGE_RETRIES,
        };

        Ok(Self {
            app_id,
            redis_url,
            max_merge_retries,
        })
    }
}
