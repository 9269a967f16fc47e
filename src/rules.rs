//! Scoring and level curve.

use std::time::Duration;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

/// Score needed per level step.
pub const SCORE_PER_LEVEL: u32 = 600;

/// Reward for 1, 2, 3 and 4+ rows erased in one pass.
const REWARDS: [u32; 4] = [100, 300, 700, 1500];

/// Drop timeout shrinks by this much per level.
const TIMEOUT_STEP_MS: u64 = 50;

pub fn reward(rows_erased: usize) -> u32 {
    match rows_erased {
        0 => 0,
        n => REWARDS[n.min(REWARDS.len()) - 1],
    }
}

/// `score / 600`, clamped to `1..=10`.
pub fn level_for_score(score: u32) -> u8 {
    let level = (score / SCORE_PER_LEVEL).clamp(MIN_LEVEL.into(), MAX_LEVEL.into());
    level as u8
}

/// `(11 - level) * 0.05` seconds: 500 ms at level 1 down to 50 ms at level 10.
pub fn drop_timeout(level: u8) -> Duration {
    let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    Duration::from_millis(u64::from(MAX_LEVEL + 1 - level) * TIMEOUT_STEP_MS)
}

/// Informational speed metric: the drop timeout in milliseconds.
pub fn speed_ms(level: u8) -> u32 {
    drop_timeout(level).as_millis() as u32
}
