//! One-sample TWR derivative.
//!
//! The derivative only means something while the ship keeps falling, so the
//! history is dropped on every tick that is not descending.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tick period substituted for degenerate elapsed times (60 Hz).
pub const NOMINAL_TICK: Duration = Duration::from_nanos(16_666_667);

/// Elapsed times at or below this many seconds are treated as degenerate.
const MIN_ELAPSED_S: f64 = 1e-4;

/// Result of sampling TWR for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "per_second", rename_all = "lowercase")]
pub enum TwrTrend {
    /// No previous descending sample to compare against.
    Unknown,
    /// `d(TWR)/dt` in 1/s.  Negative means TWR is collapsing.
    Rate(f64),
}

impl TwrTrend {
    pub fn rate(self) -> Option<f64> {
        match self {
            TwrTrend::Unknown => None,
            TwrTrend::Rate(r) => Some(r),
        }
    }
}

/// TWR carried from the previous descending tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TwrHistory {
    pub previous_twr: Option<f64>,
    /// Interval used for the last derivative, in seconds.
    pub last_interval_s: Option<f64>,
}

impl TwrHistory {
    /// Sample `twr` for this tick.  Must be called exactly once per tick.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use deckwatch_kernel::twr_history::{TwrHistory, TwrTrend};
    ///
    /// let tick = Duration::from_millis(100);
    /// let (h, trend) = TwrHistory::default().advance(2.0, true, tick);
    /// assert_eq!(trend, TwrTrend::Unknown);
    /// let (_, trend) = h.advance(1.9, true, tick);
    /// assert!((trend.rate().unwrap() + 1.0).abs() < 1e-9);
    /// ```
    pub fn advance(self, twr: f64, descending: bool, elapsed: Duration) -> (Self, TwrTrend) {
        if !descending || !twr.is_finite() {
            return (Self::default(), TwrTrend::Unknown);
        }

        let mut dt = elapsed.as_secs_f64();
        if dt <= MIN_ELAPSED_S {
            dt = NOMINAL_TICK.as_secs_f64();
        }

        let next = Self {
            previous_twr: Some(twr),
            last_interval_s: Some(dt),
        };
        match self.previous_twr {
            Some(prev) => (next, TwrTrend::Rate((twr - prev) / dt)),
            None => (next, TwrTrend::Unknown),
        }
    }
}
