use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::sync::atomic::{AtomicU32, Ordering};

use server::db::{Database, InMemoryDatabase, VersionedDocument, WriteResult};

/// Store whose every call fails, as if the backend were unreachable.
pub struct FailingDatabase;

#[async_trait]
impl Database for FailingDatabase {
    async fn get_document(&self, key: &str) -> Result<Option<VersionedDocument>> {
        Err(anyhow!("connection refused reading {}", key))
    }

    async fn put_document(
        &self,
        key: &str,
        _data: &JsonValue,
        _expected_version: Option<u64>,
    ) -> Result<WriteResult> {
        Err(anyhow!("connection refused writing {}", key))
    }

    async fn merge_fields(&self, key: &str, _fields: &Map<String, JsonValue>) -> Result<u64> {
        Err(anyhow!("connection refused merging {}", key))
    }
}

/// In-memory store that reports a version conflict for the first
/// `conflicts` conditional writes, counting every attempt it sees.
pub struct ConflictingDatabase {
    inner: InMemoryDatabase,
    conflicts_left: AtomicU32,
    put_calls: AtomicU32,
}

impl ConflictingDatabase {
    pub fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryDatabase::new(),
            conflicts_left: AtomicU32::new(conflicts),
            put_calls: AtomicU32::new(0),
        }
    }

    /// Make the next `conflicts` conditional writes report a conflict.
    pub fn inject_conflicts(&self, conflicts: u32) {
        self.conflicts_left.store(conflicts, Ordering::SeqCst);
    }

    pub fn put_calls(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for ConflictingDatabase {
    async fn get_document(&self, key: &str) -> Result<Option<VersionedDocument>> {
        self.inner.get_document(key).await
    }

    async fn put_document(
        &self,
        key: &str,
        data: &JsonValue,
        expected_version: Option<u64>,
    ) -> Result<WriteResult> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if injected {
            return Ok(WriteResult::Conflict {
                current_version: expected_version.map(|v| v + 1),
            });
        }
        self.inner.put_document(key, data, expected_version).await
    }

    async fn merge_fields(&self, key: &str, fields: &Map<String, JsonValue>) -> Result<u64> {
        self.inner.merge_fields(key, fields).await
    }
}
