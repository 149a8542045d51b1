use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::info;

use ::common::{GameProgress, PlayerStats};
use server::Services;
use server::config::ServerConfig;
use server::db::{Database, InMemoryDatabase, RedisDatabase};

// Global counter for unique app ids
static APP_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Services wired to a fresh store under a unique app id.
pub struct TestEnvironment {
    pub config: ServerConfig,
    pub services: Services,
}

impl TestEnvironment {
    pub fn in_memory(test_name: &str) -> Self {
        Self::with_database(test_name, Arc::new(InMemoryDatabase::new()))
    }

    pub fn with_database(test_name: &str, db: Arc<dyn Database>) -> Self {
        Self::with_retries(test_name, db, ServerConfig::default().max_merge_retries)
    }

    pub fn with_retries(test_name: &str, db: Arc<dyn Database>, max_merge_retries: u32) -> Self {
        let _ = tracing_subscriber::fmt::try_init();
        let config = ServerConfig {
            app_id: unique_app_id(test_name),
            redis_url: None,
            max_merge_retries,
        };
        info!("Test {} using app id {}", test_name, config.app_id);
        let services = Services::new(db, &config);
        Self { config, services }
    }

    /// Connect to the Redis named by `TEST_REDIS_URL` (default localhost).
    /// Returns `None` when no server is reachable so the caller can skip.
    pub async fn redis(test_name: &str) -> Option<Self> {
        let url = std::env::var("TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let db = match RedisDatabase::connect(&url).await {
            Ok(db) => db,
            Err(e) => {
                println!("Redis not available ({:#}), skipping {}", e, test_name);
                return None;
            }
        };
        // ConnectionManager connects lazily on some versions; probe once
        if let Err(e) = db.get_document("probe").await {
            println!("Redis not available ({:#}), skipping {}", e, test_name);
            return None;
        }
        Some(Self::with_database(test_name, Arc::new(db)))
    }

    pub fn db(&self) -> &Arc<dyn Database> {
        &self.services.db
    }

    pub async fn create_user(&self, user_id: &str, name: &str) -> Result<()> {
        self.services.progress.initialize_user(user_id, name).await?;
        Ok(())
    }
}

fn unique_app_id(test_name: &str) -> String {
    let counter = APP_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("test-{}-{}-{}", test_name, Utc::now().timestamp_millis(), counter)
}

/// Bests for one player with no secondary metrics recorded
pub fn player(user_id: &str, best_level: u32, total_score: i64) -> PlayerStats {
    PlayerStats {
        user_id: user_id.to_string(),
        player_name: format!("Player {}", user_id),
        best_level,
        total_score,
        best_time: None,
        best_attempts: None,
        best_accuracy: None,
    }
}

pub fn progress_at(best_level: u32, total_score: i64) -> GameProgress {
    GameProgress {
        current_level: best_level,
        best_level,
        total_score,
        ..GameProgress::default()
    }
}
