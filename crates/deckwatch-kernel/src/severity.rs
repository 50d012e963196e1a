//! [`classify`] – alarm severity for an [`EnvelopeState`].
//!
//! Severity comes from an ordered [`PolicyTable`]; the first matching rule
//! names the verdict reported alongside the tick.

use std::sync::LazyLock;

use deckwatch_types::AlarmSeverity;

use crate::envelope::EnvelopeState;
use crate::policy::{PolicyTable, Verdict};

static SEVERITY_TABLE: LazyLock<PolicyTable<EnvelopeState, AlarmSeverity>> = LazyLock::new(|| {
    PolicyTable::new(AlarmSeverity::Nominal)
        .rule(
            "approaching_operational",
            EnvelopeState::approaching_operational,
            AlarmSeverity::Caution,
        )
        .rule(
            "approaching_hard_deck",
            EnvelopeState::approaching_hard_deck,
            AlarmSeverity::Critical,
        )
        .rule(
            "falling_below_hard_deck",
            EnvelopeState::falling_below_hard_deck,
            AlarmSeverity::Critical,
        )
        .rule(
            "holding_below_hard_deck",
            EnvelopeState::holding_below_hard_deck,
            AlarmSeverity::Warning,
        )
        .rule(
            "descending_below_operational",
            EnvelopeState::descending_below_operational,
            AlarmSeverity::Warning,
        )
});

/// Severity of the current envelope, with the rule that selected it.
pub fn classify(state: &EnvelopeState) -> Verdict<AlarmSeverity> {
    SEVERITY_TABLE.evaluate(state)
}
