//! Generic `LightActuator` trait for interior lights, spotlights and rotating
//! beacons.

use deckwatch_types::{AdvisorError, LightColor};

/// A color- and blink-capable light.
///
/// The light's template may carry a `[ROTATING]` marker, which switches it to
/// the beacon branch of the light policy.
pub trait LightActuator {
    /// Stable identifier, e.g. `"cargo_bay_light"`.
    fn id(&self) -> &str;

    /// Operator-authored template text (used for marker tokens only).
    fn template(&self) -> &str;

    /// Current blink interval in seconds; `0.0` means steady.
    fn blink_interval(&self) -> f64;

    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if the light rejects the value.
    fn set_blink_interval(&mut self, seconds: f64) -> Result<(), AdvisorError>;

    /// Fraction of each blink interval the light is lit.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if the light rejects the value.
    fn set_blink_length(&mut self, fraction: f64) -> Result<(), AdvisorError>;

    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if the light rejects the color.
    fn set_color(&mut self, color: LightColor) -> Result<(), AdvisorError>;

    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] if the light cannot be switched.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), AdvisorError>;
}

#[cfg(test)]
mod tests {
    use deckwatch_types::{ActuatorCommand, LightColor};

    use crate::registry::BLINK_LENGTH;
    use crate::sim::{SimLight, SimRegistry};

    fn set_light(color: LightColor, enabled: bool, blinking: bool, interval: f64) -> ActuatorCommand {
        ActuatorCommand::SetLight {
            light_id: "bay".to_string(),
            color,
            enabled,
            blinking,
            blink_interval_s: interval,
        }
    }

    #[test]
    fn blinking_sets_interval_and_blink_length() {
        let light = SimLight::new("bay", "");
        let state = light.state();
        let mut registry = SimRegistry::new().with_light(light).build();

        registry.dispatch(set_light(LightColor::Red, true, true, 1.5)).unwrap();
        let s = state.borrow();
        assert_eq!(s.color, LightColor::Red);
        assert!(s.enabled);
        assert!((s.blink_interval - 1.5).abs() < f64::EPSILON);
        assert!((s.blink_length - BLINK_LENGTH).abs() < f64::EPSILON);
    }

    #[test]
    fn steady_after_blinking_clears_interval() {
        let light = SimLight::new("bay", "");
        let state = light.state();
        let mut registry = SimRegistry::new().with_light(light).build();

        registry.dispatch(set_light(LightColor::Red, true, true, 2.0)).unwrap();
        registry.dispatch(set_light(LightColor::Orange, true, false, 2.0)).unwrap();
        let s = state.borrow();
        assert_eq!(s.color, LightColor::Orange);
        assert_eq!(s.blink_interval, 0.0);
        assert!((s.blink_length - BLINK_LENGTH).abs() < f64::EPSILON);
    }

    #[test]
    fn new_interval_replaces_old_one_while_blinking() {
        let light = SimLight::new("bay", "");
        let state = light.state();
        let mut registry = SimRegistry::new().with_light(light).build();

        registry.dispatch(set_light(LightColor::Red, true, true, 2.0)).unwrap();
        registry.dispatch(set_light(LightColor::Red, true, true, 0.5)).unwrap();
        assert!((state.borrow().blink_interval - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn disabled_policy_switches_light_off() {
        let light = SimLight::new("beacon", "[ROTATING]");
        let state = light.state();
        let mut registry = SimRegistry::new().with_light(light).build();

        registry
            .dispatch(ActuatorCommand::SetLight {
                light_id: "beacon".to_string(),
                color: LightColor::Red,
                enabled: false,
                blinking: false,
                blink_interval_s: 2.0,
            })
            .unwrap();
        let s = state.borrow();
        assert!(!s.enabled);
        assert_eq!(s.blink_interval, 0.0);
    }
}
