//! Draw configuration, prize labels and phase timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Hard cap on winners per draw, whatever the pool size.
pub const MAX_WINNERS: usize = 5;

const RANKED_LABELS: [&str; MAX_WINNERS] = [
    "🥇 1st Place",
    "🥈 2nd Place",
    "🥉 3rd Place",
    "🏅 4th Place",
    "🎖️ 5th Place",
];

// ---------------------------------------------------------------------------
// DrawConfig
// ---------------------------------------------------------------------------

/// How many winners to draw and whether each round opens with a countdown.
/// Frozen once a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    pub winners_count: usize,
    pub use_countdown: bool,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            winners_count: 1,
            use_countdown: true,
        }
    }
}

impl DrawConfig {
    pub fn new(winners_count: usize, use_countdown: bool) -> Self {
        Self {
            winners_count,
            use_countdown,
        }
    }

    /// Accept the config only if `winners_count` is in `[1, max_winners(pool_size)]`.
    pub fn validate(self, pool_size: usize) -> Result<Self, ValidationError> {
        let max = max_winners(pool_size);
        if self.winners_count == 0 || self.winners_count > max {
            return Err(ValidationError::WinnersOutOfRange {
                requested: self.winners_count,
                max,
            });
        }
        Ok(self)
    }

    /// Labels for every position this config will draw, in order.
    pub fn prize_labels(&self) -> Vec<String> {
        (1..=self.winners_count).map(prize_label).collect()
    }
}

/// Largest winner count allowed for a pool of `pool_size` candidates.
pub fn max_winners(pool_size: usize) -> usize {
    MAX_WINNERS.min(pool_size)
}

/// Pull a requested count into `[1, max_winners(pool_size)]`. Returns 0 only
/// when the pool is empty.
pub fn clamp_winners(requested: usize, pool_size: usize) -> usize {
    let max = max_winners(pool_size);
    if max == 0 { 0 } else { requested.clamp(1, max) }
}

/// Human-readable prize for a 1-based position.
pub fn prize_label(position: usize) -> String {
    match position {
        1..=MAX_WINNERS => RANKED_LABELS[position - 1].to_string(),
        n => format!("{}{} Place", n, ordinal_suffix(n)),
    }
}

fn ordinal_suffix(n: usize) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Phase durations for the live draw.
///
/// Everything is derived from one time unit (one second by default):
/// countdown from 3 at one tick per unit, 3 units of rolling with a display
/// refresh every tenth of a unit, 4 units of reveal, then a 2 unit pause
/// before the next round or 3 units before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    pub countdown_from: u32,
    pub countdown_tick: Duration,
    pub roll_tick: Duration,
    pub rolling: Duration,
    pub revealing: Duration,
    pub next_round_pause: Duration,
    pub finish_pause: Duration,
}

impl Timings {
    pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

    pub fn with_unit(unit: Duration) -> Self {
        Self {
            countdown_from: 3,
            countdown_tick: unit,
            roll_tick: unit / 10,
            rolling: unit * 3,
            revealing: unit * 4,
            next_round_pause: unit * 2,
            finish_pause: unit * 3,
        }
    }

    /// Every transition fires as soon as it is polled. Display ticks are skipped.
    pub fn instant() -> Self {
        Self::with_unit(Duration::ZERO)
    }

    /// Wall time for one full session with `config`, excluding time spent
    /// waiting for the caller to start each round.
    pub fn session_length(&self, config: &DrawConfig) -> Duration {
        let n = config.winners_count as u32;
        if n == 0 {
            return Duration::ZERO;
        }
        let countdown = if config.use_countdown {
            self.countdown_tick * self.countdown_from
        } else {
            Duration::ZERO
        };
        (countdown + self.rolling + self.revealing) * n
            + self.next_round_pause * (n - 1)
            + self.finish_pause
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::with_unit(Self::DEFAULT_UNIT)
    }
}
