use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// World-space vector used for gravity, velocity and thrust directions.
pub type Vec3 = Vector3<f64>;

/// One thruster's contribution capability for the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrusterReading {
    /// Unit vector of the force the thruster applies to the ship.
    pub push_direction: Vec3,
    /// Rated force at current conditions, in Newtons.
    pub max_effective_force_newtons: f64,
    /// Functional, enabled and currently working.
    pub is_usable: bool,
}

impl ThrusterReading {
    /// Force this thruster can apply along `axis`.
    ///
    /// Misaligned and unusable thrusters contribute zero; the result is never
    /// negative.
    pub fn force_along(&self, axis: &Vec3) -> f64 {
        if !self.is_usable {
            return 0.0;
        }
        let align = self.push_direction.dot(axis);
        if align > 0.0 {
            self.max_effective_force_newtons * align
        } else {
            0.0
        }
    }
}

/// World-space orientation of the ship's local axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipFrame {
    pub up: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
}

impl ShipFrame {
    /// The six ship-local cardinal directions: up, down, left, right,
    /// forward, backward.
    pub fn cardinal_directions(&self) -> [Vec3; 6] {
        [
            self.up,
            -self.up,
            -self.right,
            self.right,
            self.forward,
            -self.forward,
        ]
    }
}

impl Default for ShipFrame {
    fn default() -> Self {
        Self {
            up: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Position of the ship relative to the planet it is falling toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetGeometry {
    /// Distance from the ship to the gravity centre, in metres.
    pub distance_to_center_m: f64,
    /// Altitude above sea level, in metres.
    pub altitude_asl_m: f64,
}

/// Everything the advisor knows about the ship for one tick.
///
/// Captured once per tick; every derived quantity in that tick reads from the
/// same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipTelemetrySnapshot {
    pub mass_kg: f64,
    /// Points toward the gravity source. Zero means no natural gravity.
    pub gravity_vector: Vec3,
    pub velocity: Vec3,
    pub frame: ShipFrame,
    /// `None` when the ship is not inside a planet's gravity well.
    pub planet: Option<PlanetGeometry>,
    pub thrusters: Vec<ThrusterReading>,
}

/// Alarm severity derived from the flight envelope each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSeverity {
    Nominal,
    Caution,
    Warning,
    Critical,
}

impl std::fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlarmSeverity::Nominal => write!(f, "nominal"),
            AlarmSeverity::Caution => write!(f, "caution"),
            AlarmSeverity::Warning => write!(f, "warning"),
            AlarmSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Colors used by warning lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    White,
    Yellow,
    Orange,
    Red,
}

impl LightColor {
    /// 8-bit RGB triple for drivers that take raw color values.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            LightColor::White => (255, 255, 255),
            LightColor::Yellow => (255, 255, 0),
            LightColor::Orange => (255, 165, 0),
            LightColor::Red => (255, 0, 0),
        }
    }
}

/// Outward-facing effects the advisor asks the device layer to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum ActuatorCommand {
    /// Write rendered text verbatim to one surface of a display device.
    WriteText {
        surface_id: String,
        /// Zero-based surface index on the device.
        surface_index: usize,
        text: String,
    },
    /// Drive a light to the requested color/blink/enabled state.
    SetLight {
        light_id: String,
        color: LightColor,
        enabled: bool,
        blinking: bool,
        /// Interval used when `blinking` is set, in seconds.
        blink_interval_s: f64,
    },
    /// Play the named alert sound on a sound emitter now.
    TriggerSound { sound_id: String, sound_name: String },
}

/// Error type shared by the device layer, the physics core and the CLI.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdvisorError {
    #[error("Sensor Unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Infeasible: {0}")]
    Infeasible(String),

    #[error("Device Fault on {device}: {details}")]
    DeviceFault { device: String, details: String },

    #[error("Configuration Error: {0}")]
    Config(String),
}
