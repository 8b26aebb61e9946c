//! Time management: turning `go` clock fields into a search budget.

use std::time::Duration;

use crate::board::Color;

use super::SearchLimits;

/// Default moves to go estimate when not specified
pub const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Smallest budget ever handed to a search
const MIN_BUDGET_MS: u64 = 1;

/// Configuration for time management calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeConfig {
    /// Time to reserve for move overhead (communication latency, etc.)
    pub move_overhead_ms: u64,
    /// Moves assumed to remain when `movestogo` is absent
    pub default_moves_to_go: u32,
    /// Share of the increment spent on the current move
    pub increment_percent: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            move_overhead_ms: 50,
            default_moves_to_go: DEFAULT_MOVES_TO_GO,
            increment_percent: 75,
        }
    }
}

impl TimeConfig {
    /// Wall-clock budget for a search with `limits` when `side` is to move.
    ///
    /// Returns `None` when the search is unbounded in time (infinite, ponder,
    /// or no clock information at all).
    #[must_use]
    pub fn budget(&self, limits: &SearchLimits, side: Color) -> Option<Duration> {
        if limits.infinite || limits.ponder {
            return None;
        }
        if let Some(movetime) = limits.movetime {
            return Some(movetime.max(Duration::from_millis(MIN_BUDGET_MS)));
        }

        let (clock, increment) = match side {
            Color::White => (limits.wtime?, limits.winc.unwrap_or_default()),
            Color::Black => (limits.btime?, limits.binc.unwrap_or_default()),
        };
        let clock_ms = clock.as_millis() as u64;
        let inc_ms = increment.as_millis() as u64;
        let moves_to_go = u64::from(
            limits
                .movestogo
                .filter(|&n| n > 0)
                .unwrap_or(self.default_moves_to_go)
                .max(1),
        );

        let target = (clock_ms / moves_to_go)
            .saturating_add(inc_ms.saturating_mul(self.increment_percent) / 100);
        let ceiling = clock_ms.saturating_sub(self.move_overhead_ms);
        Some(Duration::from_millis(target.min(ceiling).max(MIN_BUDGET_MS)))
    }
}
