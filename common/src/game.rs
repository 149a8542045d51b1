use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game id: {0}")]
pub struct UnknownGame(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    HigherLower,
    QuickCount,
    SequenceSprint,
    MemoryMatch,
}

/// Metric used to break ties between leaderboard entries on the same level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryMetric {
    /// Fewer attempts ranks higher
    Attempts,
    /// Lower time ranks higher
    Time,
    /// Higher accuracy ranks higher
    Accuracy,
}

impl GameId {
    pub const ALL: [GameId; 4] = [
        GameId::HigherLower,
        GameId::QuickCount,
        GameId::SequenceSprint,
        GameId::MemoryMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::HigherLower => "higher-lower",
            GameId::QuickCount => "quick-count",
            GameId::SequenceSprint => "sequence-sprint",
            GameId::MemoryMatch => "memory-match",
        }
    }

    pub fn secondary_metric(&self) -> SecondaryMetric {
        match self {
            GameId::HigherLower => SecondaryMetric::Attempts,
            GameId::QuickCount | GameId::MemoryMatch => SecondaryMetric::Time,
            GameId::SequenceSprint => SecondaryMetric::Accuracy,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameId {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameId::ALL
            .into_iter()
            .find(|game| game.as_str() == s)
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

/// One value per game, serialized as a map keyed by the game's wire name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GameSet<T> {
    pub higher_lower: T,
    pub quick_count: T,
    pub sequence_sprint: T,
    pub memory_match: T,
}

impl<T> GameSet<T> {
    pub fn get(&self, game: GameId) -> &T {
        match game {
            GameId::HigherLower => &self.higher_lower,
            GameId::QuickCount => &self.quick_count,
            GameId::SequenceSprint => &self.sequence_sprint,
            GameId::MemoryMatch => &self.memory_match,
        }
    }

    pub fn get_mut(&mut self, game: GameId) -> &mut T {
        match game {
            GameId::HigherLower => &mut self.higher_lower,
            GameId::QuickCount => &mut self.quick_count,
            GameId::SequenceSprint => &mut self.sequence_sprint,
            GameId::MemoryMatch => &mut self.memory_match,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameId, &T)> {
        GameId::ALL.into_iter().map(move |game| (game, self.get(game)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_round_trips_through_wire_name() {
        for game in GameId::ALL {
            assert_eq!(game.as_str().parse::<GameId>(), Ok(game));
            let json = serde_json::to_string(&game).unwrap();
            assert_eq!(json, format!("\"{}\"", game.as_str()));
        }
        assert!("hub".parse::<GameId>().is_err());
    }

    #[test]
    fn test_game_set_serializes_with_game_keys() {
        let set = GameSet {
            higher_lower: 1,
            quick_count: 2,
            sequence_sprint: 3,
            memory_match: 4,
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["higher-lower"], 1);
        assert_eq!(json["memory-match"], 4);
        assert_eq!(*set.get(GameId::SequenceSprint), 3);
    }
}
