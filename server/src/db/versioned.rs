use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Database, WriteResult};
use crate::error::UpdateError;

const RETRY_BASE_DELAY_MS: u64 = 5;
const RETRY_JITTER_MS: u64 = 10;

/// Read and decode `key`, returning its version alongside.
pub async fn read_versioned<T: DeserializeOwned>(
    db: &dyn Database,
    key: &str,
) -> Result<Option<(u64, T)>, UpdateError> {
    let Some(stored) = db.get_document(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_value(stored.data).map_err(|source| UpdateError::Malformed {
        key: key.to_string(),
        source,
    })?;
    Ok(Some((stored.version, value)))
}

/// Read-modify-write of one document, guarded by its version.
///
/// `update` gets the current value (`None` if absent) and returns the value
/// to store. When another writer got in first the cycle runs again on the
/// fresh value, at most `max_retries` extra times. Errors from `update` or
/// the store end the loop immediately.
pub async fn update_document<T, F>(
    db: &dyn Database,
    key: &str,
    max_retries: u32,
    mut update: F,
) -> Result<T, UpdateError>
where
    T: Serialize + DeserializeOwned,
    F: FnMut(Option<T>) -> Result<T, UpdateError>,
{
    let attempts = max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        let (expected_version, current) = match read_versioned::<T>(db, key).await? {
            Some((version, value)) => (Some(version), Some(value)),
            None => (None, None),
        };

        let next = update(current)?;
        let data = serde_json::to_value(&next).map_err(UpdateError::Encode)?;

        match db.put_document(key, &data, expected_version).await? {
            WriteResult::Written { version } => {
                debug!("Wrote {} at version {} (attempt {})", key, version, attempt);
                return Ok(next);
            }
            WriteResult::Conflict { current_version } => {
                warn!(
                    "Conflict writing {}: expected version {:?}, found {:?} (attempt {}/{})",
                    key, expected_version, current_version, attempt, attempts
                );
                if attempt < attempts {
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
            }
        }
    }

    Err(UpdateError::Contention {
        key: key.to_string(),
        attempts,
    })
}

fn retry_delay(attempt: u32) -> Duration {
    let jitter = rand::thread_rng().gen_range(0..=RETRY_JITTER_MS);
    Duration::from_millis(RETRY_BASE_DELAY_MS * u64::from(attempt.min(8)) + jitter)
}
