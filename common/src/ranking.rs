use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{
    GLOBAL_COMPLETION_BONUS, GLOBAL_GAME_COUNT, GLOBAL_LEVEL_WEIGHT, GLOBAL_SCORE_WEIGHT, GameId,
    GameProgress, GameSet, LEADERBOARD_CAPACITY, SecondaryMetric,
};

/// A finished player's best results in one game, as submitted for ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub user_id: String,
    pub player_name: String,
    pub best_level: u32,
    pub total_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_accuracy: Option<f64>,
}

impl PlayerStats {
    pub fn from_progress(user_id: &str, player_name: &str, progress: &GameProgress) -> Self {
        PlayerStats {
            user_id: user_id.to_string(),
            player_name: player_name.to_string(),
            best_level: progress.best_level,
            total_score: progress.total_score,
            best_time: progress.best_time,
            best_attempts: progress.best_attempts,
            best_accuracy: progress.best_accuracy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub player: PlayerStats,
    pub updated_at: DateTime<Utc>,
}

/// Cross-game aggregate for one user, always recomputed from all four games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    pub total_score: i64,
    pub total_levels: u32,
    pub average_level: u32,
    pub games_completed: u32,
    pub weighted_score: i64,
}

impl GlobalStats {
    pub fn from_games(games: &GameSet<GameProgress>) -> Self {
        let total_score = games
            .iter()
            .fold(0i64, |acc, (_, game)| acc.saturating_add(game.total_score));
        let total_levels = games
            .iter()
            .fold(0u32, |acc, (_, game)| acc.saturating_add(game.best_level));
        let games_completed = games.iter().filter(|(_, game)| game.is_completed()).count() as u32;
        let average_level = (total_levels as f64 / GLOBAL_GAME_COUNT as f64).round() as u32;

        GlobalStats {
            total_score,
            total_levels,
            average_level,
            games_completed,
            weighted_score: weighted_score(total_levels, total_score, games_completed),
        }
    }
}

pub fn weighted_score(total_levels: u32, total_score: i64, games_completed: u32) -> i64 {
    (total_levels as i64)
        .saturating_mul(GLOBAL_LEVEL_WEIGHT)
        .saturating_add(total_score.saturating_mul(GLOBAL_SCORE_WEIGHT))
        .saturating_add((games_completed as i64).saturating_mul(GLOBAL_COMPLETION_BONUS))
}

/// Global ranking row. `total_score` holds the weighted score; the unweighted
/// sum is kept in `raw_score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLeaderboardEntry {
    pub user_id: String,
    pub player_name: String,
    pub total_score: i64,
    pub average_level: u32,
    pub games_completed: u32,
    #[serde(default)]
    pub raw_score: i64,
    #[serde(default)]
    pub total_levels: u32,
    pub updated_at: DateTime<Utc>,
}

impl GlobalLeaderboardEntry {
    pub fn new(user_id: &str, player_name: &str, stats: GlobalStats, now: DateTime<Utc>) -> Self {
        GlobalLeaderboardEntry {
            user_id: user_id.to_string(),
            player_name: player_name.to_string(),
            total_score: stats.weighted_score,
            average_level: stats.average_level,
            games_completed: stats.games_completed,
            raw_score: stats.total_score,
            total_levels: stats.total_levels,
            updated_at: now,
        }
    }
}

/// Ordering for a per-game leaderboard; `Less` means `a` ranks above `b`.
///
/// Level first, then the game's own metric when both players have recorded
/// it, then total score.
pub fn compare_entries(game: GameId, a: &PlayerStats, b: &PlayerStats) -> Ordering {
    b.best_level
        .cmp(&a.best_level)
        .then_with(|| compare_secondary(game, a, b))
        .then_with(|| b.total_score.cmp(&a.total_score))
}

fn compare_secondary(game: GameId, a: &PlayerStats, b: &PlayerStats) -> Ordering {
    match game.secondary_metric() {
        SecondaryMetric::Attempts => match (a.best_attempts, b.best_attempts) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        },
        SecondaryMetric::Time => match (a.best_time, b.best_time) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        },
        SecondaryMetric::Accuracy => match (a.best_accuracy, b.best_accuracy) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            _ => Ordering::Equal,
        },
    }
}

/// Replace the user's entry, re-rank and keep the top of the list.
pub fn merge_entry(
    game: GameId,
    mut entries: Vec<LeaderboardEntry>,
    entry: LeaderboardEntry,
) -> Vec<LeaderboardEntry> {
    entries.retain(|existing| existing.player.user_id != entry.player.user_id);
    entries.push(entry);
    // stable, so earlier entries win exact ties
    entries.sort_by(|a, b| compare_entries(game, &a.player, &b.player));
    entries.truncate(LEADERBOARD_CAPACITY);
    entries
}

pub fn compare_global_entries(a: &GlobalLeaderboardEntry, b: &GlobalLeaderboardEntry) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| b.games_completed.cmp(&a.games_completed))
        .then_with(|| b.average_level.cmp(&a.average_level))
}

pub fn merge_global_entry(
    mut entries: Vec<GlobalLeaderboardEntry>,
    entry: GlobalLeaderboardEntry,
) -> Vec<GlobalLeaderboardEntry> {
    entries.retain(|existing| existing.user_id != entry.user_id);
    entries.push(entry);
    entries.sort_by(compare_global_entries);
    entries.truncate(LEADERBOARD_CAPACITY);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(user_id: &str, best_level: u32, total_score: i64) -> PlayerStats {
        PlayerStats {
            user_id: user_id.to_string(),
            player_name: format!("player {}", user_id),
            best_level,
            total_score,
            best_time: None,
            best_attempts: None,
            best_accuracy: None,
        }
    }

    fn entry(player: PlayerStats) -> LeaderboardEntry {
        LeaderboardEntry { player, updated_at: Utc::now() }
    }

    fn ids(entries: &[LeaderboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.player.user_id.as_str()).collect()
    }

    #[test]
    fn test_fewer_attempts_rank_higher_in_higher_lower() {
        let a = PlayerStats { best_attempts: Some(3), ..stats("a", 10, 0) };
        let b = PlayerStats { best_attempts: Some(5), ..stats("b", 10, 1_000) };
        assert_eq!(compare_entries(GameId::HigherLower, &a, &b), Ordering::Less);

        let ranked = merge_entry(GameId::HigherLower, vec![entry(b)], entry(a));
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn test_level_dominates_secondary_metrics() {
        let a = PlayerStats { best_attempts: Some(1), best_time: Some(1), ..stats("a", 10, 9_999) };
        let b = PlayerStats { best_attempts: Some(50), best_time: Some(90_000), ..stats("b", 12, 0) };
        for game in GameId::ALL {
            assert_eq!(compare_entries(game, &b, &a), Ordering::Less);
        }
    }

    #[test]
    fn test_secondary_metric_per_game() {
        let fast = PlayerStats { best_time: Some(3_000), best_accuracy: Some(50.0), ..stats("fast", 5, 0) };
        let accurate = PlayerStats { best_time: Some(8_000), best_accuracy: Some(90.0), ..stats("accurate", 5, 0) };

        assert_eq!(compare_entries(GameId::QuickCount, &fast, &accurate), Ordering::Less);
        assert_eq!(compare_entries(GameId::MemoryMatch, &fast, &accurate), Ordering::Less);
        assert_eq!(compare_entries(GameId::SequenceSprint, &accurate, &fast), Ordering::Less);
    }

    #[test]
    fn test_missing_secondary_metric_falls_through_to_score() {
        let timed = PlayerStats { best_time: Some(1_000), ..stats("timed", 5, 100) };
        let untimed = stats("untimed", 5, 200);
        assert_eq!(compare_entries(GameId::QuickCount, &untimed, &timed), Ordering::Less);
    }

    #[test]
    fn test_merge_same_user_twice_keeps_latest() {
        let first = merge_entry(GameId::QuickCount, Vec::new(), entry(stats("u", 3, 100)));
        let second = merge_entry(GameId::QuickCount, first, entry(stats("u", 4, 250)));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].player.best_level, 4);
        assert_eq!(second[0].player.total_score, 250);
    }

    #[test]
    fn test_eleventh_entry_drops_lowest() {
        let mut entries = Vec::new();
        for i in 0..10 {
            entries = merge_entry(GameId::MemoryMatch, entries, entry(stats(&format!("p{}", i), 10 + i, 0)));
        }
        assert_eq!(entries.len(), LEADERBOARD_CAPACITY);

        let entries = merge_entry(GameId::MemoryMatch, entries, entry(stats("new", 15, 0)));
        assert_eq!(entries.len(), LEADERBOARD_CAPACITY);
        assert!(entries.iter().any(|e| e.player.user_id == "new"));
        assert!(!entries.iter().any(|e| e.player.user_id == "p0"));

        // a newcomer below everyone is not kept
        let entries = merge_entry(GameId::MemoryMatch, entries, entry(stats("weak", 1, 0)));
        assert_eq!(entries.len(), LEADERBOARD_CAPACITY);
        assert!(!entries.iter().any(|e| e.player.user_id == "weak"));
    }

    #[test]
    fn test_weighted_score_formula() {
        assert_eq!(weighted_score(50, 500, 1), 2000);
        assert_eq!(weighted_score(4, 0, 0), 40);
    }

    #[test]
    fn test_global_stats_from_games() {
        let mut games: GameSet<GameProgress> = GameSet::default();
        games.higher_lower.best_level = 100;
        games.higher_lower.total_score = 12_000;
        games.quick_count.best_level = 7;
        games.quick_count.total_score = 800;
        games.sequence_sprint.best_level = 2;
        games.memory_match.best_level = 1;

        let stats = GlobalStats::from_games(&games);
        assert_eq!(stats.total_levels, 110);
        assert_eq!(stats.total_score, 12_800);
        // 27.5 rounds up
        assert_eq!(stats.average_level, 28);
        assert_eq!(stats.games_completed, 1);
        assert_eq!(stats.weighted_score, 1_100 + 12_800 + 1_000);
    }

    #[test]
    fn test_global_stats_saturate_on_corrupt_totals() {
        let mut games: GameSet<GameProgress> = GameSet::default();
        games.higher_lower.best_level = u32::MAX;
        games.quick_count.best_level = 5;
        games.higher_lower.total_score = i64::MAX;
        games.quick_count.total_score = 10;

        let stats = GlobalStats::from_games(&games);
        assert_eq!(stats.total_levels, u32::MAX);
        assert_eq!(stats.total_score, i64::MAX);
        assert_eq!(stats.weighted_score, i64::MAX);
    }

    #[test]
    fn test_global_ordering_keys() {
        let now = Utc::now();
        let row = |id: &str, total_score: i64, games_completed: u32, average_level: u32| {
            GlobalLeaderboardEntry {
                user_id: id.to_string(),
                player_name: id.to_string(),
                total_score,
                average_level,
                games_completed,
                raw_score: 0,
                total_levels: 0,
                updated_at: now,
            }
        };

        let mut entries = Vec::new();
        entries = merge_global_entry(entries, row("low", 100, 0, 1));
        entries = merge_global_entry(entries, row("tied-avg", 500, 1, 10));
        entries = merge_global_entry(entries, row("tied-complete", 500, 2, 5));
        entries = merge_global_entry(entries, row("top", 900, 0, 1));
        let order: Vec<&str> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["top", "tied-complete", "tied-avg", "low"]);

        entries = merge_global_entry(entries, row("low", 1_000, 0, 1));
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].user_id, "low");
    }

    #[test]
    fn test_entry_serializes_flat() {
        let e = entry(PlayerStats { best_attempts: Some(3), ..stats("u", 2, 10) });
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["userId"], "u");
        assert_eq!(json["bestAttempts"], 3);
        assert!(json.get("bestTime").is_none());
        assert!(json.get("updatedAt").is_some());
    }
}
