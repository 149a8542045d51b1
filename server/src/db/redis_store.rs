use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, Script};
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;
use tracing::debug;

use super::{Database, VersionedDocument, WriteResult};

// Each document is a hash with `version` and `data` (JSON text) fields.
const VERSION_FIELD: &str = "version";
const DATA_FIELD: &str = "data";

// ARGV[1] is the expected version, empty when the document must not exist.
// Returns {1, new_version} on write or {0, current_version} on conflict,
// with -1 standing in for a missing document.
const COMPARE_AND_SET_SCRIPT: &str = r#"
    local current = redis.call('HGET', KEYS[1], 'version')
    local expected = ARGV[1]
    if expected == '' then
        if current then
            return {0, tonumber(current)}
        end
    elseif (not current) or current ~= expected then
        return {0, current and tonumber(current) or -1}
    end
    local next_version = (current and tonumber(current) or 0) + 1
    redis.call('HSET', KEYS[1], 'version', next_version, 'data', ARGV[2])
    return {1, next_version}
"#;

// ARGV[1] is a JSON object of dotted path -> value.
const MERGE_FIELDS_SCRIPT: &str = r#"
    local raw = redis.call('HGET', KEYS[1], 'data')
    local doc = {}
    if raw then
        doc = cjson.decode(raw)
    end
    local fields = cjson.decode(ARGV[1])
    for path, value in pairs(fields) do
        local parts = {}
        for part in string.gmatch(path, '[^.]+') do
            table.insert(parts, part)
        end
        local node = doc
        for i = 1, #parts - 1 do
            if type(node[parts[i]]) ~= 'table' then
                node[parts[i]] = {}
            end
            node = node[parts[i]]
        end
        node[parts[#parts]] = value
    end
    local version = redis.call('HINCRBY', KEYS[1], 'version', 1)
    redis.call('HSET', KEYS[1], 'data', cjson.encode(doc))
    return version
"#;

/// Document store on Redis. Conditional writes and field merges run as Lua
/// scripts so each one is atomic on the server.
#[derive(Clone)]
pub struct RedisDatabase {
    conn: ConnectionManager,
}

impl RedisDatabase {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("Invalid Redis URL")?;
        // Backoff is base^n * factor ms, capped, so an unreachable server
        // fails within a few seconds.
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(2))
            .set_response_timeout(Duration::from_secs(5))
            .set_number_of_retries(2)
            .set_exponent_base(2)
            .set_factor(100)
            .set_max_delay(1000);
        let conn = ConnectionManager::new_with_config(client, config)
            .await
            .context("Failed to create Redis connection manager")?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Database for RedisDatabase {
    async fn get_document(&self, key: &str) -> Result<Option<VersionedDocument>> {
        let mut conn = self.conn.clone();
        let (version, data): (Option<u64>, Option<String>) = redis::cmd("HMGET")
            .arg(key)
            .arg(VERSION_FIELD)
            .arg(DATA_FIELD)
            .query_async(&mut conn)
            .await
            .with_context(|| format!("Failed to read document {}", key))?;

        match (version, data) {
            (Some(version), Some(data)) => {
                let data = serde_json::from_str(&data)
                    .with_context(|| format!("Document {} holds invalid JSON", key))?;
                Ok(Some(VersionedDocument { version, data }))
            }
            _ => Ok(None),
        }
    }

    async fn put_document(
        &self,
        key: &str,
        data: &JsonValue,
        expected_version: Option<u64>,
    ) -> Result<WriteResult> {
        let mut conn = self.conn.clone();
        let expected = expected_version.map(|v| v.to_string()).unwrap_or_default();
        let payload = serde_json::to_string(data)?;

        let result: Vec<i64> = Script::new(COMPARE_AND_SET_SCRIPT)
            .key(key)
            .arg(expected)
            .arg(payload)
            .invoke_async(&mut conn)
            .await
            .with_context(|| format!("Failed to write document {}", key))?;

        match result.as_slice() {
            [1, version] => Ok(WriteResult::Written {
                version: *version as u64,
            }),
            [0, current] => {
                debug!("Version conflict on {} (expected {:?}, found {})", key, expected_version, current);
                Ok(WriteResult::Conflict {
                    current_version: u64::try_from(*current).ok(),
                })
            }
            other => bail!("Unexpected compare-and-set reply for {}: {:?}", key, other),
        }
    }

    async fn merge_fields(&self, key: &str, fields: &Map<String, JsonValue>) -> Result<u64> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(fields)?;

        let version: u64 = Script::new(MERGE_FIELDS_SCRIPT)
            .key(key)
            .arg(payload)
            .invoke_async(&mut conn)
            .await
            .with_context(|| format!("Failed to merge fields into {}", key))?;
        Ok(version)
    }
}
