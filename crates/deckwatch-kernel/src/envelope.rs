//! [`EnvelopeState`] – where the ship sits relative to its TWR thresholds.
//!
//! The state is a flat set of facts computed once per tick.  Severity, light
//! and alarm decisions are pure functions of it.

use std::time::Duration;

use deckwatch_physics::{DeckThreshold, FlightFeasibility};
use serde::{Deserialize, Serialize};

use crate::twr_history::{TwrHistory, TwrTrend};

/// Share of the time-to-threshold budget after which the operational
/// warning fires.
pub const OPERATIONAL_URGENCY: f64 = 0.90;
/// Share of the time-to-threshold budget after which the hard-deck warning
/// fires.
pub const HARD_DECK_URGENCY: f64 = 0.75;

const MIN_DOWN_SPEED: f64 = 0.1;
const MIN_NET_ACCEL: f64 = 0.01;
const MIN_COLLAPSE_RATE: f64 = -1e-4;

/// Whether the ship must start braking now to stay above `threshold_twr`.
///
/// Fires immediately when the ship is descending with no climb authority
/// left.  Otherwise it needs a collapsing TWR and compares the time to null
/// the descent against the time until TWR reaches the threshold, scaled by
/// `urgency`.
pub fn must_brake_soon(
    twr: f64,
    down_speed: f64,
    net_accel: f64,
    trend: TwrTrend,
    threshold_twr: f64,
    urgency: f64,
) -> bool {
    if down_speed < MIN_DOWN_SPEED {
        return false;
    }
    if net_accel <= MIN_NET_ACCEL {
        return true;
    }
    let rate = match trend {
        TwrTrend::Rate(r) if r < MIN_COLLAPSE_RATE => r,
        _ => return false,
    };
    let time_to_stop = down_speed / net_accel;
    let time_to_threshold = (twr - threshold_twr) / -rate;
    time_to_stop >= time_to_threshold * urgency
}

/// Facts about the flight envelope for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeState {
    pub twr: f64,
    pub net_accel: f64,
    pub down_speed: f64,
    pub trend: TwrTrend,
    pub descending: bool,
    pub below_operational: bool,
    pub at_or_below_hard_deck: bool,
    pub operational_early_warning: bool,
    pub hard_deck_early_warning: bool,
    /// The current descent cannot be arrested at all.
    pub braking_impossible: bool,
}

impl EnvelopeState {
    /// Assess the envelope and sample the TWR history exactly once.
    pub fn assess(
        flight: &FlightFeasibility<'_>,
        operational_twr: f64,
        history: TwrHistory,
        elapsed: Duration,
    ) -> (Self, TwrHistory) {
        let twr = flight.twr();
        let down_speed = flight.down_speed();
        let net_accel = flight.net_upward_acceleration();
        let descending = down_speed > 0.0;

        let (history, trend) = history.advance(twr, descending, elapsed);

        let operational = DeckThreshold::Operational(operational_twr).twr();
        let hard = DeckThreshold::Hard.twr();

        let state = Self {
            twr,
            net_accel,
            down_speed,
            trend,
            descending,
            below_operational: twr < operational,
            at_or_below_hard_deck: twr <= hard,
            operational_early_warning: must_brake_soon(
                twr,
                down_speed,
                net_accel,
                trend,
                operational,
                OPERATIONAL_URGENCY,
            ),
            hard_deck_early_warning: must_brake_soon(
                twr,
                down_speed,
                net_accel,
                trend,
                hard,
                HARD_DECK_URGENCY,
            ),
            braking_impossible: flight.vertical_stop_distance().is_infinite(),
        };
        (state, history)
    }

    /// State used when telemetry could not be read: no threshold is crossed
    /// and nothing is descending.
    pub fn unavailable() -> Self {
        Self {
            twr: 0.0,
            net_accel: 0.0,
            down_speed: 0.0,
            trend: TwrTrend::Unknown,
            descending: false,
            below_operational: false,
            at_or_below_hard_deck: false,
            operational_early_warning: false,
            hard_deck_early_warning: false,
            braking_impossible: false,
        }
    }

    // ── Branch predicates, in priority order ─────────────────────────────────

    /// Still above the operational TWR but closing on it.
    pub fn approaching_operational(&self) -> bool {
        self.operational_early_warning && self.descending && !self.below_operational
    }

    /// Below operational TWR and closing on the hard deck.
    pub fn approaching_hard_deck(&self) -> bool {
        self.below_operational
            && self.hard_deck_early_warning
            && self.descending
            && !self.at_or_below_hard_deck
    }

    pub fn falling_below_hard_deck(&self) -> bool {
        self.at_or_below_hard_deck && self.descending
    }

    pub fn holding_below_hard_deck(&self) -> bool {
        self.at_or_below_hard_deck && !self.descending
    }

    /// Between the two thresholds and still descending.
    pub fn descending_below_operational(&self) -> bool {
        self.below_operational && !self.at_or_below_hard_deck && self.descending
    }

    /// Whether the audible alarm should be active this tick.
    pub fn alarm_active(&self) -> bool {
        (self.hard_deck_early_warning && self.descending && !self.at_or_below_hard_deck)
            || (self.at_or_below_hard_deck && self.descending)
            || (self.at_or_below_hard_deck && self.braking_impossible)
    }
}
