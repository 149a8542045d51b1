use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use common::{GameId, GameProgress, PlayerStats, SessionOutcome, UserProgress};

use crate::db::{Database, WriteResult, read_versioned, update_document};
use crate::document_keys::DocumentKeys;
use crate::error::UpdateError;
use crate::leaderboard::LeaderboardRanker;

/// Owns each user's progress document and pushes fresh bests to the
/// leaderboards after every finished round.
#[derive(Clone)]
pub struct ProgressService {
    db: Arc<dyn Database>,
    keys: DocumentKeys,
    ranker: LeaderboardRanker,
    max_merge_retries: u32,
}

impl ProgressService {
    pub fn new(
        db: Arc<dyn Database>,
        keys: DocumentKeys,
        ranker: LeaderboardRanker,
        max_merge_retries: u32,
    ) -> Self {
        Self {
            db,
            keys,
            ranker,
            max_merge_retries,
        }
    }

    /// Create the user's progress document on first sight; an existing one is
    /// returned untouched.
    pub async fn initialize_user(
        &self,
        user_id: &str,
        player_name: &str,
    ) -> Result<UserProgress, UpdateError> {
        if let Some(existing) = self.get_progress(user_id).await? {
            return Ok(existing);
        }

        let key = self.keys.user_progress(user_id);
        let progress = UserProgress::new(user_id, player_name, Utc::now());
        let data = serde_json::to_value(&progress).map_err(UpdateError::Encode)?;

        match self.db.put_document(&key, &data, None).await? {
            WriteResult::Written { .. } => {
                info!("Created progress record for user {} ({})", user_id, player_name);
                Ok(progress)
            }
            WriteResult::Conflict { .. } => {
                // created concurrently; the stored copy wins
                debug!("Progress record for user {} appeared while creating it", user_id);
                self.require_progress(user_id).await
            }
        }
    }

    pub async fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, UpdateError> {
        let key = self.keys.user_progress(user_id);
        Ok(read_versioned(self.db.as_ref(), &key)
            .await?
            .map(|(_, progress)| progress))
    }

    /// Record a cleared level: advance, ratchet the bests, add the score and
    /// republish the user's leaderboard entries.
    pub async fn complete_level(
        &self,
        user_id: &str,
        game: GameId,
        outcome: &SessionOutcome,
    ) -> Result<UserProgress, UpdateError> {
        let result = self
            .update_and_publish(user_id, game, |progress| progress.record_level_complete(outcome))
            .await;
        match &result {
            Ok(progress) => info!(
                "User {} cleared a level of {} (now on level {}, score +{})",
                user_id,
                game,
                progress.game(game).current_level,
                outcome.score.max(0)
            ),
            Err(e) => error!("Failed to record level for user {} on {}: {}", user_id, game, e),
        }
        result
    }

    /// Send the user back to level 1 of `game`. Bests are kept and still
    /// submitted to the leaderboards.
    pub async fn game_over(&self, user_id: &str, game: GameId) -> Result<UserProgress, UpdateError> {
        let progress = self
            .update_and_publish(user_id, game, GameProgress::record_game_over)
            .await
            .inspect_err(|e| {
                error!("Failed to record game over for user {} on {}: {}", user_id, game, e)
            })?;
        info!("User {} lost at {}, back to level 1", user_id, game);
        Ok(progress)
    }

    async fn require_progress(&self, user_id: &str) -> Result<UserProgress, UpdateError> {
        self.get_progress(user_id)
            .await?
            .ok_or_else(|| UpdateError::UnknownUser(user_id.to_string()))
    }

    /// Apply `apply` to one game's record under a version check, so rounds
    /// finishing at the same time for one user are applied one after the
    /// other, then push the result to both leaderboards.
    async fn update_and_publish<F>(
        &self,
        user_id: &str,
        game: GameId,
        apply: F,
    ) -> Result<UserProgress, UpdateError>
    where
        F: Fn(&mut GameProgress),
    {
        let key = self.keys.user_progress(user_id);
        let progress = update_document(
            self.db.as_ref(),
            &key,
            self.max_merge_retries,
            |current: Option<UserProgress>| {
                let mut progress =
                    current.ok_or_else(|| UpdateError::UnknownUser(user_id.to_string()))?;
                apply(progress.games.get_mut(game));
                progress.last_updated = Some(Utc::now());
                Ok(progress)
            },
        )
        .await?;
        debug!("Saved {} for user {}", game, user_id);

        let stats = PlayerStats::from_progress(&progress.user_id, &progress.player_name, progress.game(game));
        self.ranker.update_leaderboard(game, stats).await?;
        self.ranker.update_global_leaderboard(&progress).await?;
        Ok(progress)
    }
}
