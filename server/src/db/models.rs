use chrono::{DateTime, Utc};
use common::{GlobalLeaderboardEntry, LeaderboardEntry};
use serde::{Deserialize, Serialize};

/// Stored shape of a leaderboard: the ranked top entries plus the time of
/// the last write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDocument<T> {
    #[serde(default = "Vec::new")]
    pub players: Vec<T>,
    pub updated_at: DateTime<Utc>,
}

pub type GameLeaderboardDocument = LeaderboardDocument<LeaderboardEntry>;
pub type GlobalLeaderboardDocument = LeaderboardDocument<GlobalLeaderboardEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::PlayerStats;
    use serde_json::json;

    #[test]
    fn test_leaderboard_document_shape() {
        let now = Utc::now();
        let doc = GameLeaderboardDocument {
            players: vec![LeaderboardEntry {
                player: PlayerStats {
                    user_id: "u1".to_string(),
                    player_name: "Ada".to_string(),
                    best_level: 4,
                    total_score: 620,
                    best_time: Some(3_200),
                    best_attempts: None,
                    best_accuracy: Some(100.0),
                },
                updated_at: now,
            }],
            updated_at: now,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["players"][0]["userId"], "u1");
        assert_eq!(json["players"][0]["bestLevel"], 4);
        assert!(json["updatedAt"].is_string());

        let back: GameLeaderboardDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_missing_players_defaults_empty() {
        let doc: GlobalLeaderboardDocument =
            serde_json::from_value(json!({ "updatedAt": "2026-03-01T12:00:00Z" })).unwrap();
        assert!(doc.players.is_empty());
    }
}
