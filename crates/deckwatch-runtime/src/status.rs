//! Running indicator shown while the advisor ticks.

/// Ticks per full spinner cycle.
pub const CYCLE_TICKS: u64 = 720;
/// Ticks each phase stays on screen.
pub const PHASE_TICKS: u64 = 60;

const PHASES: [&str; 12] = [
    "Running.   ---",
    "Running..   \\",
    "Running...  |",
    "Running.    /",
    "Running..  ---",
    "Running...  \\",
    "Running.    |",
    "Running..   /",
    "Running... ---",
    "Running.    \\",
    "Running..   |",
    "Running...  /",
];

/// Status line for the given tick number.
///
/// ```
/// use deckwatch_runtime::status::running_indicator;
///
/// assert_eq!(running_indicator(1), "Running.   ---");
/// assert_eq!(running_indicator(60), "Running..   \\");
/// assert_eq!(running_indicator(720), "Running.   ---");
/// ```
pub fn running_indicator(tick: u64) -> &'static str {
    let phase = (tick % CYCLE_TICKS) / PHASE_TICKS;
    PHASES[phase as usize]
}
