//! [`DeviceRegistry`] – central driver registry and command dispatcher.
//!
//! The registry stores every registered [`TextSurface`], [`LightActuator`]
//! and [`SoundActuator`] by id.  The advisor never calls drivers directly; it
//! builds [`ActuatorCommand`]s and hands them to
//! [`DeviceRegistry::dispatch`].
//!
//! # Light application
//!
//! `SetLight` only rewrites the blink interval when blinking is requested and
//! the light's current interval differs from the requested one.  A steady
//! light always has its interval cleared to zero.  Color, blink length and the
//! enabled flag are written on every command.

use std::collections::BTreeMap;

use deckwatch_types::{ActuatorCommand, AdvisorError, LightColor};
use tracing::{debug, info};

use crate::light::LightActuator;
use crate::sound::SoundActuator;
use crate::surface::TextSurface;

/// Lit fraction of each blink interval.
pub const BLINK_LENGTH: f64 = 0.2;

/// Read-only view of a registered display device.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTarget {
    pub id: String,
    pub template: String,
    pub surface_count: usize,
}

/// Read-only view of a registered light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightTarget {
    pub id: String,
    pub template: String,
}

/// Central device registry and [`ActuatorCommand`] dispatcher.
#[derive(Default)]
pub struct DeviceRegistry {
    surfaces: BTreeMap<String, Box<dyn TextSurface>>,
    lights: BTreeMap<String, Box<dyn LightActuator>>,
    sounds: BTreeMap<String, Box<dyn SoundActuator>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display device.  A previous device with the same id is
    /// replaced.
    pub fn register_surface(&mut self, surface: Box<dyn TextSurface>) {
        info!(surface = surface.id(), surfaces = surface.surface_count(), "display registered");
        self.surfaces.insert(surface.id().to_string(), surface);
    }

    /// Register a light.  A previous light with the same id is replaced.
    pub fn register_light(&mut self, light: Box<dyn LightActuator>) {
        info!(light = light.id(), "light registered");
        self.lights.insert(light.id().to_string(), light);
    }

    /// Register a sound emitter.  A previous emitter with the same id is
    /// replaced.
    pub fn register_sound(&mut self, sound: Box<dyn SoundActuator>) {
        info!(sound = sound.id(), "sound emitter registered");
        self.sounds.insert(sound.id().to_string(), sound);
    }

    /// Display devices in id order.
    pub fn surface_targets(&self) -> Vec<SurfaceTarget> {
        self.surfaces
            .values()
            .map(|s| SurfaceTarget {
                id: s.id().to_string(),
                template: s.template().to_string(),
                surface_count: s.surface_count(),
            })
            .collect()
    }

    /// Lights in id order.
    pub fn light_targets(&self) -> Vec<LightTarget> {
        self.lights
            .values()
            .map(|l| LightTarget {
                id: l.id().to_string(),
                template: l.template().to_string(),
            })
            .collect()
    }

    /// Sound emitter ids in order.
    pub fn sound_ids(&self) -> Vec<String> {
        self.sounds.keys().cloned().collect()
    }

    /// Dispatch an [`ActuatorCommand`] to the addressed driver.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::DeviceFault`] when the target device is not
    /// registered or the driver call fails.
    pub fn dispatch(&mut self, command: ActuatorCommand) -> Result<(), AdvisorError> {
        match command {
            ActuatorCommand::WriteText {
                surface_id,
                surface_index,
                text,
            } => match self.surfaces.get_mut(&surface_id) {
                Some(surface) => surface.write_text(surface_index, &text),
                None => Err(not_registered("surface", &surface_id)),
            },

            ActuatorCommand::SetLight {
                light_id,
                color,
                enabled,
                blinking,
                blink_interval_s,
            } => match self.lights.get_mut(&light_id) {
                Some(light) => {
                    apply_light(light.as_mut(), color, enabled, blinking, blink_interval_s)
                }
                None => Err(not_registered("light", &light_id)),
            },

            ActuatorCommand::TriggerSound {
                sound_id,
                sound_name,
            } => match self.sounds.get_mut(&sound_id) {
                Some(sound) => {
                    if !sound.is_enabled() {
                        debug!(sound = %sound_id, "enabling sound emitter");
                        sound.set_enabled(true)?;
                    }
                    if sound.selected_sound().as_deref() != Some(sound_name.as_str()) {
                        debug!(sound = %sound_id, selected = %sound_name, "selecting alert sound");
                        sound.select_sound(&sound_name)?;
                    }
                    sound.play()
                }
                None => Err(not_registered("sound emitter", &sound_id)),
            },
        }
    }
}

fn apply_light(
    light: &mut dyn LightActuator,
    color: LightColor,
    enabled: bool,
    blinking: bool,
    blink_interval_s: f64,
) -> Result<(), AdvisorError> {
    if blinking {
        if (light.blink_interval() - blink_interval_s).abs() > f64::EPSILON {
            light.set_blink_interval(blink_interval_s)?;
        }
    } else {
        light.set_blink_interval(0.0)?;
    }
    light.set_color(color)?;
    light.set_blink_length(BLINK_LENGTH)?;
    light.set_enabled(enabled)
}

fn not_registered(kind: &str, id: &str) -> AdvisorError {
    AdvisorError::DeviceFault {
        device: id.to_string(),
        details: format!("{kind} '{id}' is not registered"),
    }
}
