use serde::{Deserialize, Serialize};

/// Result of one finished round, carrying only the metrics the game ranks on
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Higher-or-Lower round won on `attempts` guesses out of `max_attempts`.
pub fn higher_lower_win(max_attempts: u32, attempts: u32, time_ms: u64) -> SessionOutcome {
    let max_attempts = max_attempts.max(1);
    let remaining = (max_attempts + 1).saturating_sub(attempts);
    let accuracy = remaining as f64 / max_attempts as f64 * 100.0;
    let time_bonus = 60_000u64.saturating_sub(time_ms) as f64 / 1000.0;

    SessionOutcome {
        score: (100.0 + time_bonus + accuracy).floor() as i64,
        time_ms: Some(time_ms),
        attempts: Some(attempts),
        accuracy: None,
    }
}

/// Whether the player has used up the whole guess budget
pub fn higher_lower_exhausted(max_attempts: u32, attempts: u32) -> bool {
    attempts >= max_attempts
}

pub fn quick_count_round(correct: bool, level: u32, time_ms: u64) -> SessionOutcome {
    let (score, accuracy) = if correct {
        let time_bonus = 10_000u64.saturating_sub(time_ms) as f64 / 100.0;
        let level_bonus = level as f64 * 5.0;
        ((100.0 + time_bonus + level_bonus).floor() as i64, 100.0)
    } else {
        (0, 0.0)
    };

    SessionOutcome {
        score,
        time_ms: Some(time_ms),
        attempts: None,
        accuracy: Some(accuracy),
    }
}

pub fn sequence_sprint_round(correct: bool, level: u32, time_ms: u64) -> SessionOutcome {
    let (score, accuracy) = if correct {
        let time_bonus = 30_000u64.saturating_sub(time_ms) as f64 / 1000.0;
        let level_bonus = level as f64 * 10.0;
        ((100.0 + time_bonus + level_bonus).floor() as i64, 100.0)
    } else {
        (0, 0.0)
    };

    SessionOutcome {
        score,
        time_ms: Some(time_ms),
        attempts: None,
        accuracy: Some(accuracy),
    }
}

/// Memory-Match board cleared after `moves` card-pair flips.
pub fn memory_match_win(pairs: u32, moves: u32, time_ms: u64) -> SessionOutcome {
    let accuracy = pairs as f64 / moves.max(1) as f64 * 100.0;
    let seconds = time_ms as f64 / 1000.0;
    let score = ((accuracy + (60.0 - seconds)).floor() as i64).max(100);

    SessionOutcome {
        score,
        time_ms: Some(time_ms),
        attempts: Some(moves),
        accuracy: Some(accuracy),
    }
}
