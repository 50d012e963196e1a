//! In-process simulation drivers for headless tests and the demo CLI.
//!
//! [`SimShip`] implements both telemetry ports with plain settable fields.
//! The display, light and sound stubs keep their state behind a shared
//! handle, so a test can register the driver with a [`DeviceRegistry`] and
//! still inspect what the advisor wrote to it.
//!
//! # Example
//!
//! ```rust
//! use deckwatch_hal::sim::{SimPanel, SimRegistry};
//! use deckwatch_types::ActuatorCommand;
//!
//! let panel = SimPanel::new("bridge_lcd", "TWR: [TWR]");
//! let screens = panel.screens();
//! let mut registry = SimRegistry::new().with_surface(panel).build();
//!
//! registry
//!     .dispatch(ActuatorCommand::WriteText {
//!         surface_id: "bridge_lcd".to_string(),
//!         surface_index: 0,
//!         text: "TWR: 1.00".to_string(),
//!     })
//!     .expect("sim write must succeed");
//! assert_eq!(screens.borrow()[0], "TWR: 1.00");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use deckwatch_types::{AdvisorError, LightColor, ShipFrame, ThrusterReading, Vec3};
use tracing::debug;

use crate::light::LightActuator;
use crate::registry::DeviceRegistry;
use crate::sensor::{PlanetGeometryPort, SensorPort, ThrustSource};
use crate::sound::SoundActuator;
use crate::surface::TextSurface;

/// Shared, inspectable device state.
pub type Shared<T> = Rc<RefCell<T>>;

// ────────────────────────────────────────────────────────────────────────────
// Ship and thrusters
// ────────────────────────────────────────────────────────────────────────────

/// A simulated thruster.  Usable unless one of its flags is cleared.
#[derive(Debug, Clone)]
pub struct SimThruster {
    id: String,
    push_direction: Vec3,
    max_thrust: f64,
    pub functional: bool,
    pub enabled: bool,
    pub working: bool,
}

impl SimThruster {
    /// A working thruster pushing the ship along `push_direction`.
    pub fn new(id: impl Into<String>, push_direction: Vec3, max_thrust: f64) -> Self {
        Self {
            id: id.into(),
            push_direction: push_direction.normalize(),
            max_thrust,
            functional: true,
            enabled: true,
            working: true,
        }
    }

    /// Switched off at the terminal.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl ThrustSource for SimThruster {
    fn id(&self) -> &str {
        &self.id
    }
    fn push_direction(&self) -> Vec3 {
        self.push_direction
    }
    fn max_effective_thrust(&self) -> f64 {
        self.max_thrust
    }
    fn is_functional(&self) -> bool {
        self.functional
    }
    fn is_enabled(&self) -> bool {
        self.enabled
    }
    fn is_working(&self) -> bool {
        self.working
    }
}

/// A simulated ship controller plus planet geometry.
#[derive(Debug, Clone)]
pub struct SimShip {
    pub mass_kg: f64,
    pub gravity: Vec3,
    pub velocity: Vec3,
    pub frame: ShipFrame,
    pub distance_to_center_m: Option<f64>,
    pub altitude_asl_m: Option<f64>,
    pub thrusters: Vec<SimThruster>,
    /// When `false` every sensor read fails, as if no cockpit existed.
    pub controller_present: bool,
}

impl SimShip {
    /// A stationary ship in free space.
    pub fn new(mass_kg: f64) -> Self {
        Self {
            mass_kg,
            gravity: Vec3::zeros(),
            velocity: Vec3::zeros(),
            frame: ShipFrame::default(),
            distance_to_center_m: None,
            altitude_asl_m: None,
            thrusters: Vec::new(),
            controller_present: true,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_planet(mut self, distance_to_center_m: f64, altitude_asl_m: f64) -> Self {
        self.distance_to_center_m = Some(distance_to_center_m);
        self.altitude_asl_m = Some(altitude_asl_m);
        self
    }

    pub fn with_thruster(mut self, thruster: SimThruster) -> Self {
        self.thrusters.push(thruster);
        self
    }

    pub fn without_controller(mut self) -> Self {
        self.controller_present = false;
        self
    }

    fn controller(&self) -> Result<(), AdvisorError> {
        if self.controller_present {
            Ok(())
        } else {
            Err(AdvisorError::SensorUnavailable(
                "no ship controller on the grid".to_string(),
            ))
        }
    }
}

impl SensorPort for SimShip {
    fn mass_kg(&self) -> Result<f64, AdvisorError> {
        self.controller()?;
        Ok(self.mass_kg)
    }

    fn gravity_vector(&self) -> Result<Vec3, AdvisorError> {
        self.controller()?;
        Ok(self.gravity)
    }

    fn velocity_vector(&self) -> Result<Vec3, AdvisorError> {
        self.controller()?;
        Ok(self.velocity)
    }

    fn ship_frame(&self) -> Result<ShipFrame, AdvisorError> {
        self.controller()?;
        Ok(self.frame)
    }

    fn thrusters(&self) -> Result<Vec<ThrusterReading>, AdvisorError> {
        self.controller()?;
        Ok(self
            .thrusters
            .iter()
            .map(|t| {
                let reading = t.reading();
                if !reading.is_usable {
                    debug!(thruster = t.id(), "thruster not usable");
                }
                reading
            })
            .collect())
    }
}

impl PlanetGeometryPort for SimShip {
    fn distance_to_gravity_center(&self) -> Option<f64> {
        self.distance_to_center_m
    }

    fn altitude_asl(&self) -> Option<f64> {
        self.altitude_asl_m
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub display
// ────────────────────────────────────────────────────────────────────────────

/// A simulated display device that records the text of each surface.
pub struct SimPanel {
    id: String,
    template: String,
    screens: Shared<Vec<String>>,
}

impl SimPanel {
    /// A single-surface panel.
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Box<Self> {
        Self::with_surfaces(id, template, 1)
    }

    /// A console with `count` surfaces (cockpit, programmable block, …).
    pub fn with_surfaces(
        id: impl Into<String>,
        template: impl Into<String>,
        count: usize,
    ) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            template: template.into(),
            screens: Rc::new(RefCell::new(vec![String::new(); count])),
        })
    }

    /// Handle to the recorded surface contents.
    pub fn screens(&self) -> Shared<Vec<String>> {
        Rc::clone(&self.screens)
    }
}

impl TextSurface for SimPanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn template(&self) -> &str {
        &self.template
    }

    fn surface_count(&self) -> usize {
        self.screens.borrow().len()
    }

    fn write_text(&mut self, index: usize, text: &str) -> Result<(), AdvisorError> {
        let mut screens = self.screens.borrow_mut();
        match screens.get_mut(index) {
            Some(screen) => {
                *screen = text.to_string();
                Ok(())
            }
            None => Err(AdvisorError::DeviceFault {
                device: self.id.clone(),
                details: format!("surface {index} does not exist"),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub light
// ────────────────────────────────────────────────────────────────────────────

/// Last state written to a [`SimLight`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimLightState {
    pub color: LightColor,
    pub enabled: bool,
    pub blink_interval: f64,
    pub blink_length: f64,
}

/// A simulated light.  Always succeeds.
pub struct SimLight {
    id: String,
    template: String,
    state: Shared<SimLightState>,
}

impl SimLight {
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            template: template.into(),
            state: Rc::new(RefCell::new(SimLightState {
                color: LightColor::White,
                enabled: true,
                blink_interval: 0.0,
                blink_length: 0.0,
            })),
        })
    }

    /// Handle to the recorded light state.
    pub fn state(&self) -> Shared<SimLightState> {
        Rc::clone(&self.state)
    }
}

impl LightActuator for SimLight {
    fn id(&self) -> &str {
        &self.id
    }

    fn template(&self) -> &str {
        &self.template
    }

    fn blink_interval(&self) -> f64 {
        self.state.borrow().blink_interval
    }

    fn set_blink_interval(&mut self, seconds: f64) -> Result<(), AdvisorError> {
        self.state.borrow_mut().blink_interval = seconds;
        Ok(())
    }

    fn set_blink_length(&mut self, fraction: f64) -> Result<(), AdvisorError> {
        self.state.borrow_mut().blink_length = fraction;
        Ok(())
    }

    fn set_color(&mut self, color: LightColor) -> Result<(), AdvisorError> {
        self.state.borrow_mut().color = color;
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), AdvisorError> {
        self.state.borrow_mut().enabled = enabled;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub sound emitter
// ────────────────────────────────────────────────────────────────────────────

/// Last state of a [`SimSound`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimSoundState {
    pub enabled: bool,
    pub selected: Option<String>,
    pub plays: u32,
}

/// A simulated sound emitter that counts plays.
pub struct SimSound {
    id: String,
    state: Shared<SimSoundState>,
}

impl SimSound {
    /// A disabled emitter with no sound selected.
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            state: Rc::new(RefCell::new(SimSoundState::default())),
        })
    }

    /// Handle to the recorded emitter state.
    pub fn state(&self) -> Shared<SimSoundState> {
        Rc::clone(&self.state)
    }
}

impl SoundActuator for SimSound {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), AdvisorError> {
        self.state.borrow_mut().enabled = enabled;
        Ok(())
    }

    fn selected_sound(&self) -> Option<String> {
        self.state.borrow().selected.clone()
    }

    fn select_sound(&mut self, name: &str) -> Result<(), AdvisorError> {
        self.state.borrow_mut().selected = Some(name.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), AdvisorError> {
        let mut state = self.state.borrow_mut();
        if !state.enabled || state.selected.is_none() {
            return Err(AdvisorError::DeviceFault {
                device: self.id.clone(),
                details: "emitter is disabled or has no sound selected".to_string(),
            });
        }
        state.plays += 1;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRegistry builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder that constructs a [`DeviceRegistry`] pre-populated with simulated
/// drivers.
#[derive(Default)]
pub struct SimRegistry {
    surfaces: Vec<Box<dyn TextSurface>>,
    lights: Vec<Box<dyn LightActuator>>,
    sounds: Vec<Box<dyn SoundActuator>>,
}

impl SimRegistry {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-surface panel with the given template.
    pub fn with_panel(self, id: impl Into<String>, template: impl Into<String>) -> Self {
        self.with_surface(SimPanel::new(id, template))
    }

    /// Register any display driver.
    pub fn with_surface(mut self, surface: Box<dyn TextSurface>) -> Self {
        self.surfaces.push(surface);
        self
    }

    /// Register any light driver.
    pub fn with_light(mut self, light: Box<dyn LightActuator>) -> Self {
        self.lights.push(light);
        self
    }

    /// Register any sound driver.
    pub fn with_sound(mut self, sound: Box<dyn SoundActuator>) -> Self {
        self.sounds.push(sound);
        self
    }

    /// Consume the builder and return the configured [`DeviceRegistry`].
    pub fn build(self) -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        for s in self.surfaces {
            registry.register_surface(s);
        }
        for l in self.lights {
            registry.register_light(l);
        }
        for s in self.sounds {
            registry.register_sound(s);
        }
        registry
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::capture_snapshot;
    use deckwatch_types::ActuatorCommand;

    #[test]
    fn sim_ship_snapshot_reflects_fields() {
        let ship = SimShip::new(1000.0)
            .with_gravity(Vec3::new(0.0, -9.8, 0.0))
            .with_planet(61_000.0, 1_000.0)
            .with_thruster(SimThruster::new("lift", Vec3::new(0.0, 1.0, 0.0), 9800.0))
            .with_thruster(SimThruster::new("spare", Vec3::new(0.0, 1.0, 0.0), 5000.0).disabled());

        let snap = capture_snapshot(&ship, &ship).unwrap();
        assert_eq!(snap.thrusters.len(), 1);
        assert!(snap.thrusters[0].is_usable);
        assert!((snap.thrusters[0].max_effective_force_newtons - 9800.0).abs() < f64::EPSILON);
        assert!(snap.planet.is_some());
    }

    #[test]
    fn sim_ship_without_controller_is_unavailable() {
        let ship = SimShip::new(1000.0).without_controller();
        assert!(matches!(
            capture_snapshot(&ship, &ship),
            Err(AdvisorError::SensorUnavailable(_))
        ));
    }

    #[test]
    fn sim_panel_rejects_out_of_range_surface() {
        let mut panel = SimPanel::with_surfaces("cockpit", "", 2);
        assert!(panel.write_text(1, "ok").is_ok());
        assert!(panel.write_text(2, "nope").is_err());
    }

    #[test]
    fn sim_sound_trigger_enables_selects_and_plays() {
        let sound = SimSound::new("klaxon");
        let state = sound.state();
        let mut registry = SimRegistry::new().with_sound(sound).build();

        registry
            .dispatch(ActuatorCommand::TriggerSound {
                sound_id: "klaxon".to_string(),
                sound_name: "Alert 1".to_string(),
            })
            .expect("sim sound must succeed");

        let state = state.borrow();
        assert!(state.enabled);
        assert_eq!(state.selected.as_deref(), Some("Alert 1"));
        assert_eq!(state.plays, 1);
    }

    #[test]
    fn sim_sound_refuses_to_play_when_disabled() {
        let mut sound = SimSound::new("klaxon");
        sound.select_sound("Alert 1").unwrap();
        assert!(sound.play().is_err());
    }

    #[test]
    fn sim_light_records_dispatched_state() {
        let light = SimLight::new("bay", "");
        let state = light.state();
        let mut registry = SimRegistry::new().with_light(light).build();

        registry
            .dispatch(ActuatorCommand::SetLight {
                light_id: "bay".to_string(),
                color: LightColor::Red,
                enabled: true,
                blinking: true,
                blink_interval_s: 2.0,
            })
            .unwrap();

        let state = state.borrow();
        assert_eq!(state.color, LightColor::Red);
        assert!((state.blink_interval - 2.0).abs() < f64::EPSILON);
        assert!((state.blink_length - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn sim_registry_full_stack_no_hardware_required() {
        let mut registry = SimRegistry::new()
            .with_panel("bridge_lcd", "[TWR]")
            .with_surface(SimPanel::with_surfaces("cockpit", "[SURFACE=2]", 3))
            .with_light(SimLight::new("bay", ""))
            .with_sound(SimSound::new("klaxon"))
            .build();

        let targets = registry.surface_targets();
        assert_eq!(targets.len(), 2);
        let cockpit = targets.iter().find(|t| t.id == "cockpit").unwrap();
        assert_eq!(cockpit.surface_count, 3);
        let bridge = targets.iter().find(|t| t.id == "bridge_lcd").unwrap();
        assert_eq!(bridge.template, "[TWR]");
        assert_eq!(registry.sound_ids(), vec!["klaxon".to_string()]);

        registry
            .dispatch(ActuatorCommand::WriteText {
                surface_id: "cockpit".to_string(),
                surface_index: 1,
                text: "hello".to_string(),
            })
            .expect("write must succeed");
    }
}
