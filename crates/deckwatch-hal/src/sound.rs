//! Generic `SoundActuator` trait for alarm speakers and sound blocks.

use deckwatch_types::AdvisorError;

/// A device that can play a named alert sound.
pub trait SoundActuator {
    /// Stable identifier, e.g. `"bridge_klaxon"`.
    fn id(&self) -> &str;

    fn is_enabled(&self) -> bool;

    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if the device cannot be switched.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), AdvisorError>;

    /// Currently selected sound, if any.
    fn selected_sound(&self) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if the sound is not available on
    /// this device.
    fn select_sound(&mut self, name: &str) -> Result<(), AdvisorError>;

    /// Play the selected sound once.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if nothing is selected or the
    /// device is disabled.
    fn play(&mut self) -> Result<(), AdvisorError>;
}
