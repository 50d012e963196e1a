//! [`LightStateMachine`] – warning light color and blink policy.
//!
//! Evaluated per light.  A light whose template carries the beacon token is
//! never blinked for state; it glows red at or below the hard deck and is
//! switched off otherwise.

use deckwatch_types::{ActuatorCommand, LightColor};
use serde::{Deserialize, Serialize};

use crate::envelope::EnvelopeState;
use crate::policy::{PolicyTable, Verdict};

/// Envelope plus the per-light beacon flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightContext {
    pub envelope: EnvelopeState,
    pub beacon: bool,
}

/// Desired state of one light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightPolicy {
    pub color: LightColor,
    pub blinking: bool,
    pub enabled: bool,
}

impl LightPolicy {
    pub const fn steady(color: LightColor) -> Self {
        Self {
            color,
            blinking: false,
            enabled: true,
        }
    }

    pub const fn blinking(color: LightColor) -> Self {
        Self {
            color,
            blinking: true,
            enabled: true,
        }
    }

    pub const fn off(color: LightColor) -> Self {
        Self {
            color,
            blinking: false,
            enabled: false,
        }
    }

    /// Build the [`ActuatorCommand`] applying this policy to `light_id`.
    pub fn command(self, light_id: &str, blink_interval_s: f64) -> ActuatorCommand {
        ActuatorCommand::SetLight {
            light_id: light_id.to_string(),
            color: self.color,
            enabled: self.enabled,
            blinking: self.blinking,
            blink_interval_s,
        }
    }
}

/// Priority-ordered light decision table.
#[derive(Debug, Clone)]
pub struct LightStateMachine {
    table: PolicyTable<LightContext, LightPolicy>,
}

impl Default for LightStateMachine {
    fn default() -> Self {
        Self::new(LightColor::Yellow)
    }
}

impl LightStateMachine {
    /// `warning_color` is used for the early operational warning.
    pub fn new(warning_color: LightColor) -> Self {
        let table = PolicyTable::new(LightPolicy::steady(LightColor::White))
            .rule(
                "approaching_operational",
                |c: &LightContext| !c.beacon && c.envelope.approaching_operational(),
                LightPolicy::steady(warning_color),
            )
            .rule(
                "approaching_hard_deck",
                |c| !c.beacon && c.envelope.approaching_hard_deck(),
                LightPolicy::blinking(LightColor::Red),
            )
            .rule(
                "falling_below_hard_deck",
                |c| !c.beacon && c.envelope.falling_below_hard_deck(),
                LightPolicy::blinking(LightColor::Red),
            )
            .rule(
                "holding_below_hard_deck",
                |c| !c.beacon && c.envelope.holding_below_hard_deck(),
                LightPolicy::steady(LightColor::Red),
            )
            .rule(
                "descending_below_operational",
                |c| !c.beacon && c.envelope.descending_below_operational(),
                LightPolicy::steady(LightColor::Orange),
            )
            .rule(
                "beacon_below_hard_deck",
                |c| c.beacon && c.envelope.at_or_below_hard_deck,
                LightPolicy::steady(LightColor::Red),
            )
            .rule(
                "beacon_idle",
                |c| c.beacon,
                LightPolicy::off(LightColor::Red),
            );
        Self { table }
    }

    pub fn decide(&self, envelope: &EnvelopeState, beacon: bool) -> Verdict<LightPolicy> {
        self.table.evaluate(&LightContext {
            envelope: *envelope,
            beacon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> EnvelopeState {
        EnvelopeState::unavailable()
    }

    fn between_thresholds_descending() -> EnvelopeState {
        EnvelopeState {
            descending: true,
            below_operational: true,
            ..quiet()
        }
    }

    #[test]
    fn between_thresholds_descending_is_exactly_orange_steady() {
        let lights = LightStateMachine::default();
        let v = lights.decide(&between_thresholds_descending(), false);
        assert_eq!(v.rule, "descending_below_operational");
        assert_eq!(v.outcome, LightPolicy::steady(LightColor::Orange));
    }

    #[test]
    fn nominal_light_is_white_steady() {
        let v = LightStateMachine::default().decide(&quiet(), false);
        assert_eq!(v.outcome, LightPolicy::steady(LightColor::White));
    }

    #[test]
    fn early_operational_warning_uses_configured_color() {
        let state = EnvelopeState {
            descending: true,
            operational_early_warning: true,
            ..quiet()
        };
        let v = LightStateMachine::new(LightColor::Orange).decide(&state, false);
        assert_eq!(v.outcome, LightPolicy::steady(LightColor::Orange));
        assert_eq!(v.rule, "approaching_operational");
    }

    #[test]
    fn approaching_hard_deck_blinks_red() {
        let state = EnvelopeState {
            hard_deck_early_warning: true,
            operational_early_warning: true,
            ..between_thresholds_descending()
        };
        let v = LightStateMachine::default().decide(&state, false);
        assert_eq!(v.rule, "approaching_hard_deck");
        assert_eq!(v.outcome, LightPolicy::blinking(LightColor::Red));
    }

    #[test]
    fn falling_below_hard_deck_blinks_red() {
        let state = EnvelopeState {
            at_or_below_hard_deck: true,
            below_operational: true,
            ..between_thresholds_descending()
        };
        let v = LightStateMachine::default().decide(&state, false);
        assert_eq!(v.outcome, LightPolicy::blinking(LightColor::Red));
    }

    #[test]
    fn holding_below_hard_deck_is_red_steady() {
        let state = EnvelopeState {
            at_or_below_hard_deck: true,
            below_operational: true,
            ..quiet()
        };
        let v = LightStateMachine::default().decide(&state, false);
        assert_eq!(v.outcome, LightPolicy::steady(LightColor::Red));
    }

    #[test]
    fn beacon_never_blinks() {
        let lights = LightStateMachine::default();
        let state = EnvelopeState {
            at_or_below_hard_deck: true,
            below_operational: true,
            descending: true,
            ..quiet()
        };
        let v = lights.decide(&state, true);
        assert_eq!(v.rule, "beacon_below_hard_deck");
        assert_eq!(v.outcome, LightPolicy::steady(LightColor::Red));

        let v = lights.decide(&between_thresholds_descending(), true);
        assert_eq!(v.rule, "beacon_idle");
        assert!(!v.outcome.enabled);
    }

    #[test]
    fn command_carries_policy_and_interval() {
        let cmd = LightPolicy::blinking(LightColor::Red).command("bay", 2.0);
        assert_eq!(
            cmd,
            ActuatorCommand::SetLight {
                light_id: "bay".to_string(),
                color: LightColor::Red,
                enabled: true,
                blinking: true,
                blink_interval_s: 2.0,
            }
        );
    }
}
