/// Highest level a game can be progressed to
pub const MAX_LEVEL: u32 = 100;

/// Maximum number of entries kept in any leaderboard list
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Number of games that feed the global leaderboard
pub const GLOBAL_GAME_COUNT: u32 = 4;

/// Weight applied to the sum of best levels in the global score
pub const GLOBAL_LEVEL_WEIGHT: i64 = 10;

/// Weight applied to the summed raw score in the global score
pub const GLOBAL_SCORE_WEIGHT: i64 = 1;

/// Bonus awarded per game whose best level reached MAX_LEVEL
pub const GLOBAL_COMPLETION_BONUS: i64 = 1000;
