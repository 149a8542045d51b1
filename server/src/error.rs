use thiserror::Error;

/// Failure of a progress or leaderboard update
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update failed: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("update failed: document {key} could not be decoded: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("update failed: could not encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("update failed: {key} kept changing underneath us ({attempts} attempts)")]
    Contention { key: String, attempts: u32 },

    #[error("update failed: no progress record for user {0}")]
    UnknownUser(String),
}
