pub mod memory;
pub mod models;
pub mod redis_store;
pub mod versioned;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
pub use memory::InMemoryDatabase;
pub use redis_store::RedisDatabase;
pub use versioned::{read_versioned, update_document};

/// A stored JSON document together with its write counter.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    pub version: u64,
    pub data: JsonValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written { version: u64 },
    /// The stored version did not match; `current_version` is `None` when the document is absent.
    Conflict { current_version: Option<u64> },
}

/// Hierarchical key/value document store.
///
/// Every successful write bumps the document's version by one, starting at 1.
#[async_trait]
pub trait Database: Send + Sync {
    async fn get_document(&self, key: &str) -> Result<Option<VersionedDocument>>;

    /// Replace the document only if its version still equals `expected_version`.
    /// `None` means the document must not exist yet.
    async fn put_document(
        &self,
        key: &str,
        data: &JsonValue,
        expected_version: Option<u64>,
    ) -> Result<WriteResult>;

    /// Set individual fields without touching the rest of the document,
    /// creating it when absent. Field names may be dotted paths
    /// (`games.quick-count`). Returns the new version.
    async fn merge_fields(&self, key: &str, fields: &Map<String, JsonValue>) -> Result<u64>;
}

/// Write `value` at a dotted `path`, replacing non-object intermediates.
pub(crate) fn set_path(document: &mut JsonValue, path: &str, value: JsonValue) {
    let mut node = document;
    let mut parts = path.split('.').filter(|part| !part.is_empty()).peekable();

    while let Some(part) = parts.next() {
        if !node.is_object() {
            *node = JsonValue::Object(Map::new());
        }
        let JsonValue::Object(map) = node else {
            return;
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return;
        }
        node = map.entry(part.to_string()).or_insert(JsonValue::Null);
    }
}

/// Open the store named by the config: Redis when a URL is set, otherwise
/// an in-process map.
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn Database>> {
    match &config.redis_url {
        Some(url) => {
            info!("Connecting document store to Redis at {}", url);
            let db = RedisDatabase::connect(url)
                .await
                .context("Failed to open Redis document store")?;
            Ok(Arc::new(db))
        }
        None => {
            info!("No Redis URL configured, using in-memory document store");
            Ok(Arc::new(InMemoryDatabase::new()))
        }
    }
}
