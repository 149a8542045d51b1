pub mod config;
pub mod db;
pub mod document_keys;
pub mod error;
pub mod leaderboard;
pub mod progress;
pub mod telemetry;

use anyhow::Result;
use std::sync::Arc;

use config::ServerConfig;
use db::Database;
use document_keys::DocumentKeys;
use leaderboard::LeaderboardRanker;
use progress::ProgressService;

/// Everything needed to run the games against one document store.
#[derive(Clone)]
pub struct Services {
    pub db: Arc<dyn Database>,
    pub keys: DocumentKeys,
    pub ranker: LeaderboardRanker,
    pub progress: ProgressService,
}

impl Services {
    pub fn new(db: Arc<dyn Database>, config: &ServerConfig) -> Self {
        let keys = DocumentKeys::new(config.app_id.clone());
        let ranker = LeaderboardRanker::new(db.clone(), keys.clone(), config.max_merge_retries);
        let progress = ProgressService::new(
            db.clone(),
            keys.clone(),
            ranker.clone(),
            config.max_merge_retries,
        );
        Self {
            db,
            keys,
            ranker,
            progress,
        }
    }

    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let db = db::connect(config).await?;
        Ok(Self::new(db, config))
    }
}
