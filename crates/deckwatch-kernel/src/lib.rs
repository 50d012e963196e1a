//! `deckwatch-kernel` – Alarm & Light Decisions
//!
//! Turns one tick's [`FlightFeasibility`][deckwatch_physics::FlightFeasibility]
//! into advisory decisions.  Nothing in this crate touches a device; it only
//! decides what the device layer should be told.
//!
//! # Modules
//!
//! - [`twr_history`] – [`TwrHistory`][twr_history::TwrHistory]: the one-sample
//!   TWR derivative carried between ticks.
//! - [`envelope`] – [`EnvelopeState`][envelope::EnvelopeState]: threshold
//!   crossings, early-warning predicates and the alarm trigger.
//! - [`policy`] – [`PolicyTable`][policy::PolicyTable]: ordered,
//!   first-match-wins rule tables.
//! - [`severity`] – [`classify`][severity::classify]: envelope →
//!   [`AlarmSeverity`][deckwatch_types::AlarmSeverity].
//! - [`light_policy`] – [`LightStateMachine`][light_policy::LightStateMachine]:
//!   envelope + beacon flag → light color/blink/enabled.
//! - [`alarm_pacer`] – [`AlarmPacer`][alarm_pacer::AlarmPacer]: how often an
//!   active alarm re-sounds.

pub mod alarm_pacer;
pub mod envelope;
pub mod light_policy;
pub mod policy;
pub mod severity;
pub mod twr_history;

pub use alarm_pacer::AlarmPacer;
pub use envelope::{EnvelopeState, must_brake_soon};
pub use light_policy::{LightContext, LightPolicy, LightStateMachine};
pub use policy::{PolicyRule, PolicyTable, Verdict};
pub use severity::classify;
pub use twr_history::{TwrHistory, TwrTrend};
