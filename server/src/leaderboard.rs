use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use common::{
    GameId, GlobalLeaderboardEntry, GlobalStats, LeaderboardEntry, PlayerStats, UserProgress,
    merge_entry, merge_global_entry,
};

use crate::db::models::LeaderboardDocument;
use crate::db::{Database, read_versioned, update_document};
use crate::document_keys::DocumentKeys;
use crate::error::UpdateError;

/// Keeps the per-game and global top lists in the document store.
///
/// Each update reads the current list, merges the new entry with the pure
/// ranking rules and writes back only if nobody else wrote in between. A
/// conflicting write restarts the cycle on the fresh list, so concurrent
/// submissions never drop each other's entries.
#[derive(Clone)]
pub struct LeaderboardRanker {
    db: Arc<dyn Database>,
    keys: DocumentKeys,
    max_merge_retries: u32,
}

impl LeaderboardRanker {
    pub fn new(db: Arc<dyn Database>, keys: DocumentKeys, max_merge_retries: u32) -> Self {
        Self {
            db,
            keys,
            max_merge_retries,
        }
    }

    /// Submit a player's current bests for one game and return the stored top list.
    pub async fn update_leaderboard(
        &self,
        game: GameId,
        player: PlayerStats,
    ) -> Result<Vec<LeaderboardEntry>, UpdateError> {
        let key = self.keys.game_leaderboard(game);
        let players = self
            .merge_document(&key, |players: Vec<LeaderboardEntry>, now| {
                let entry = LeaderboardEntry {
                    player: player.clone(),
                    updated_at: now,
                };
                merge_entry(game, players, entry)
            })
            .await?;

        let rank = players
            .iter()
            .position(|entry| entry.player.user_id == player.user_id);
        match rank {
            Some(index) => info!(
                "User {} ranked #{} on {} (level {}, score {})",
                player.user_id,
                index + 1,
                game,
                player.best_level,
                player.total_score
            ),
            None => debug!("User {} did not place on {}", player.user_id, game),
        }
        Ok(players)
    }

    /// Recompute the user's cross-game standing and merge it into the global list.
    pub async fn update_global_leaderboard(
        &self,
        progress: &UserProgress,
    ) -> Result<Vec<GlobalLeaderboardEntry>, UpdateError> {
        let key = self.keys.global_leaderboard();
        let stats = GlobalStats::from_games(&progress.games);
        let players = self
            .merge_document(&key, |players: Vec<GlobalLeaderboardEntry>, now| {
                let entry = GlobalLeaderboardEntry::new(
                    &progress.user_id,
                    &progress.player_name,
                    stats,
                    now,
                );
                merge_global_entry(players, entry)
            })
            .await?;

        info!(
            "Global standing for user {}: weighted score {} over {} levels",
            progress.user_id, stats.weighted_score, stats.total_levels
        );
        Ok(players)
    }

    pub async fn get_leaderboard(&self, game: GameId) -> Result<Vec<LeaderboardEntry>, UpdateError> {
        let key = self.keys.game_leaderboard(game);
        self.read_players::<LeaderboardEntry>(&key).await
    }

    pub async fn get_global_leaderboard(&self) -> Result<Vec<GlobalLeaderboardEntry>, UpdateError> {
        let key = self.keys.global_leaderboard();
        self.read_players::<GlobalLeaderboardEntry>(&key).await
    }

    async fn read_players<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, UpdateError> {
        Ok(read_versioned::<LeaderboardDocument<T>>(self.db.as_ref(), key)
            .await?
            .map(|(_, doc)| doc.players)
            .unwrap_or_default())
    }

    async fn merge_document<T, F>(&self, key: &str, merge: F) -> Result<Vec<T>, UpdateError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(Vec<T>, DateTime<Utc>) -> Vec<T>,
    {
        let doc = update_document(
            self.db.as_ref(),
            key,
            self.max_merge_retries,
            |current: Option<LeaderboardDocument<T>>| {
                let players = current.map(|doc| doc.players).unwrap_or_default();
                let now = Utc::now();
                Ok(LeaderboardDocument {
                    players: merge(players, now),
                    updated_at: now,
                })
            },
        )
        .await?;
        Ok(doc.players)
    }
}
