use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GameId, GameSet, MAX_LEVEL, SessionOutcome};

/// A user's standing in one game.
///
/// `best_*` fields only ever improve: times and attempts go down, level and
/// accuracy go up. `current_level` stays within `1..=MAX_LEVEL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub current_level: u32,
    pub best_level: u32,
    pub total_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_accuracy: Option<f64>,
}

impl Default for GameProgress {
    fn default() -> Self {
        GameProgress {
            current_level: 1,
            best_level: 1,
            total_score: 0,
            best_time: None,
            best_attempts: None,
            best_accuracy: None,
        }
    }
}

impl GameProgress {
    pub fn record_level_complete(&mut self, outcome: &SessionOutcome) {
        self.best_level = self.best_level.max(self.current_level);
        self.current_level = self.current_level.saturating_add(1).clamp(1, MAX_LEVEL);
        self.total_score = self.total_score.saturating_add(outcome.score.max(0));

        if let Some(time) = outcome.time_ms {
            self.best_time = Some(self.best_time.map_or(time, |best| best.min(time)));
        }
        if let Some(attempts) = outcome.attempts {
            self.best_attempts = Some(self.best_attempts.map_or(attempts, |best| best.min(attempts)));
        }
        if let Some(accuracy) = outcome.accuracy {
            self.best_accuracy = Some(self.best_accuracy.map_or(accuracy, |best| best.max(accuracy)));
        }
    }

    /// Send the player back to level 1, keeping every best metric.
    pub fn record_game_over(&mut self) {
        self.current_level = 1;
    }

    pub fn is_completed(&self) -> bool {
        self.best_level >= MAX_LEVEL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub player_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub games: GameSet<GameProgress>,
}

impl UserProgress {
    pub fn new(user_id: &str, player_name: &str, now: DateTime<Utc>) -> Self {
        UserProgress {
            user_id: user_id.to_string(),
            player_name: player_name.to_string(),
            created_at: now,
            last_updated: None,
            games: GameSet::default(),
        }
    }

    pub fn game(&self, game: GameId) -> &GameProgress {
        self.games.get(game)
    }

    pub fn games_completed(&self) -> usize {
        self.games.iter().filter(|(_, progress)| progress.is_completed()).count()
    }

    pub fn total_score(&self) -> i64 {
        self.games
            .iter()
            .fold(0i64, |acc, (_, progress)| acc.saturating_add(progress.total_score))
    }
}
