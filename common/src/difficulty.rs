use serde::Serialize;

use crate::GameId;

/// Parameter bundle derived from a level for one game.
///
/// `params` is `None` only when the caller asked for an unknown game id, in
/// which case the config degrades to just the level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyConfig {
    pub level: u32,
    #[serde(flatten)]
    pub params: Option<DifficultyParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DifficultyParams {
    HigherLower(HigherLowerParams),
    QuickCount(QuickCountParams),
    SequenceSprint(SequenceSprintParams),
    MemoryMatch(MemoryMatchParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HigherLowerParams {
    pub min_range: u64,
    pub max_range: u64,
    pub max_attempts: u32,
    pub proximity_threshold: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCountParams {
    pub shape_count: u32,
    /// Milliseconds the shapes stay on screen
    pub display_time: u32,
    pub color_variety: u32,
    pub size_variation: f64,
    pub overlap_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSprintParams {
    pub sequence_length: u32,
    pub complexity: u32,
    pub number_range: u32,
    pub pattern_difficulty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMatchParams {
    pub grid_size: GridSize,
    /// Milliseconds the cards are shown face up before play starts
    pub reveal_time: u32,
    pub pair_count: u32,
    pub card_similarity: f64,
}

/// How close a Higher-or-Lower guess landed, relative to the proximity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Proximity {
    BurningHot,
    VeryWarm,
    GettingWarmer,
    Warm,
    Cool,
    Cold,
    Freezing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessDirection {
    Higher,
    Lower,
    Correct,
}

// Grid breakpoints: the last entry whose level threshold is reached wins
const MEMORY_GRID_BREAKPOINTS: [(u32, GridSize); 12] = [
    (1, GridSize { rows: 3, cols: 4 }),
    (4, GridSize { rows: 4, cols: 4 }),
    (8, GridSize { rows: 4, cols: 5 }),
    (12, GridSize { rows: 5, cols: 4 }),
    (16, GridSize { rows: 5, cols: 5 }),
    (20, GridSize { rows: 5, cols: 6 }),
    (24, GridSize { rows: 6, cols: 5 }),
    (28, GridSize { rows: 6, cols: 6 }),
    (30, GridSize { rows: 6, cols: 7 }),
    (32, GridSize { rows: 7, cols: 6 }),
    (35, GridSize { rows: 7, cols: 7 }),
    (40, GridSize { rows: 8, cols: 8 }),
];

/// Look up the difficulty for a game by its wire name.
/// Unknown names yield a config carrying only the level.
pub fn get_difficulty_config(game_id: &str, level: u32) -> DifficultyConfig {
    match game_id.parse::<GameId>() {
        Ok(game) => difficulty_for(game, level),
        Err(e) => {
            log::warn!("{}, returning level-only difficulty", e);
            DifficultyConfig { level, params: None }
        }
    }
}

pub fn difficulty_for(game: GameId, level: u32) -> DifficultyConfig {
    let params = match game {
        GameId::HigherLower => DifficultyParams::HigherLower(higher_lower_difficulty(level)),
        GameId::QuickCount => DifficultyParams::QuickCount(quick_count_difficulty(level)),
        GameId::SequenceSprint => {
            DifficultyParams::SequenceSprint(sequence_sprint_difficulty(level))
        }
        GameId::MemoryMatch => DifficultyParams::MemoryMatch(memory_match_difficulty(level)),
    };
    DifficultyConfig { level, params: Some(params) }
}

/// Range grows by 8% per level while the attempt budget shrinks every 7 levels.
pub fn higher_lower_difficulty(level: u32) -> HigherLowerParams {
    let growth = 1.08_f64.powf(level.saturating_sub(1) as f64);
    // float to int casts saturate, so very high levels clamp at u64::MAX
    let max_range = (100.0 * growth).floor() as u64;
    let max_attempts = 15u32.saturating_sub(level / 7).max(3);
    let proximity_threshold = ((max_range as f64) * 0.08).floor() as u64;

    HigherLowerParams {
        min_range: 1,
        max_range,
        max_attempts,
        proximity_threshold: proximity_threshold.max(3),
    }
}

pub fn quick_count_difficulty(level: u32) -> QuickCountParams {
    let shape_count = 5u32.saturating_add((level as f64 * 0.7).floor() as u32);
    let time_reduction = level.saturating_sub(1).saturating_mul(60);
    let display_time = 5000u32.saturating_sub(time_reduction).max(400);

    QuickCountParams {
        shape_count,
        display_time,
        color_variety: 4u32.saturating_add(level / 6).min(16),
        size_variation: (level as f64 * 0.01).min(1.0),
        overlap_probability: (level as f64 * 0.008).min(0.8),
    }
}

pub fn sequence_sprint_difficulty(level: u32) -> SequenceSprintParams {
    SequenceSprintParams {
        sequence_length: 4u32.saturating_add(level / 15).min(10),
        complexity: 2u32.saturating_add(level / 5).min(1000),
        number_range: level.saturating_mul(15).saturating_add(20).min(2000),
        pattern_difficulty: 2u32.saturating_add(level / 15).min(20),
    }
}

pub fn memory_match_difficulty(level: u32) -> MemoryMatchParams {
    let grid_size = memory_grid_size(level);
    let time_reduction = level.saturating_sub(1).saturating_mul(80);

    MemoryMatchParams {
        grid_size,
        reveal_time: 7000u32.saturating_sub(time_reduction).max(800),
        pair_count: grid_size.rows * grid_size.cols / 2,
        card_similarity: (level as f64 * 0.009).min(0.9),
    }
}

fn memory_grid_size(level: u32) -> GridSize {
    MEMORY_GRID_BREAKPOINTS
        .iter()
        .rev()
        .find(|(threshold, _)| level >= *threshold)
        .map(|(_, grid)| *grid)
        .unwrap_or(MEMORY_GRID_BREAKPOINTS[0].1)
}

impl HigherLowerParams {
    pub fn direction(&self, guess: u64, target: u64) -> GuessDirection {
        match guess.cmp(&target) {
            std::cmp::Ordering::Less => GuessDirection::Higher,
            std::cmp::Ordering::Greater => GuessDirection::Lower,
            std::cmp::Ordering::Equal => GuessDirection::Correct,
        }
    }

    /// Classify how far a guess is from the target, in multiples of the threshold.
    pub fn proximity(&self, guess: u64, target: u64) -> Proximity {
        let distance = guess.abs_diff(target) as f64;
        let threshold = self.proximity_threshold as f64;

        if distance <= threshold * 0.1 {
            Proximity::BurningHot
        } else if distance <= threshold * 0.3 {
            Proximity::VeryWarm
        } else if distance <= threshold * 0.6 {
            Proximity::GettingWarmer
        } else if distance <= threshold {
            Proximity::Warm
        } else if distance <= threshold * 2.0 {
            Proximity::Cool
        } else if distance <= threshold * 4.0 {
            Proximity::Cold
        } else {
            Proximity::Freezing
        }
    }
}
