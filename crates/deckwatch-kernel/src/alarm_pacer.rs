//! [`AlarmPacer`] – re-sound cadence for an active alarm.
//!
//! The first tick of an alarm always sounds.  While the alarm stays active it
//! sounds again every `repeat_ticks` ticks.  Clearing the alarm re-arms the
//! pacer so the next alarm sounds immediately.

use serde::{Deserialize, Serialize};

/// Default number of ticks between repeated alarm sounds.
pub const DEFAULT_REPEAT_TICKS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmPacer {
    repeat_ticks: u32,
    /// Ticks since the alarm last sounded; `None` while the alarm is clear.
    since_sound: Option<u32>,
}

impl Default for AlarmPacer {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_TICKS)
    }
}

impl AlarmPacer {
    /// A `repeat_ticks` of zero is treated as one (sound every tick).
    pub fn new(repeat_ticks: u32) -> Self {
        Self {
            repeat_ticks: repeat_ticks.max(1),
            since_sound: None,
        }
    }

    pub fn repeat_ticks(&self) -> u32 {
        self.repeat_ticks
    }

    /// Advance one tick; the returned flag says whether to sound now.
    pub fn advance(self, alarm_active: bool) -> (Self, bool) {
        if !alarm_active {
            return (
                Self {
                    since_sound: None,
                    ..self
                },
                false,
            );
        }
        let (since_sound, sound) = match self.since_sound {
            None => (0, true),
            Some(n) if n + 1 >= self.repeat_ticks => (0, true),
            Some(n) => (n + 1, false),
        };
        (
            Self {
                since_sound: Some(since_sound),
                ..self
            },
            sound,
        )
    }
}
