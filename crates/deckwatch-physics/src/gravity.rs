//! Planet gravity approximation.
//!
//! Inside the hill sphere (`r <= R_max = R * (1 + H)`) gravity is constant.
//! Beyond it, gravity falls off as `g = g_ref * (R_max / r)^N`.  The advisor
//! only ever knows the gravity at the ship's current position, so the
//! inversion uses that sample as `g_ref`.

use deckwatch_types::{AdvisorError, PlanetGeometry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fraction of the planet radius occupied by the constant-gravity shell.
pub const DEFAULT_HILL_FRACTION: f64 = 0.12;
/// Power-law exponent of the gravity falloff beyond the hill sphere.
pub const DEFAULT_FALLOFF_EXPONENT: f64 = 7.0;

/// Gravity samples weaker than this are too noisy to invert.
const MIN_SAMPLE_GRAVITY: f64 = 0.1;
/// Target gravities below this have no finite altitude.
const MIN_TARGET_GRAVITY: f64 = 1e-6;
/// Planets smaller than one metre are treated as bad radius data.
const MIN_PLANET_RADIUS: f64 = 1.0;

/// Why a gravity/altitude solve has no answer.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Infeasible {
    #[error("gravity sample {0} m/s² is too weak to model")]
    NegligibleGravity(f64),

    #[error("target gravity {0} m/s² has no finite altitude")]
    UnreachableTarget(f64),

    #[error("effective planet radius {0} m is degenerate")]
    DegenerateRadius(f64),

    #[error("ship is not inside a gravity well")]
    NoPlanet,
}

impl From<Infeasible> for AdvisorError {
    fn from(err: Infeasible) -> Self {
        AdvisorError::Infeasible(err.to_string())
    }
}

/// The gravity reading at the ship's current position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySample {
    /// Distance from the ship to the gravity centre (m).
    pub current_radius: f64,
    /// Ship altitude above sea level (m).
    pub current_altitude_asl: f64,
    /// Gravity magnitude at the ship (m/s²).
    pub current_gravity: f64,
}

impl GravitySample {
    /// Combine planet geometry with a measured gravity magnitude.
    pub fn from_geometry(planet: &PlanetGeometry, current_gravity: f64) -> Self {
        Self {
            current_radius: planet.distance_to_center_m,
            current_altitude_asl: planet.altitude_asl_m,
            current_gravity,
        }
    }

    /// Sea-level radius implied by the sample.
    pub fn planet_radius(&self) -> f64 {
        self.current_radius - self.current_altitude_asl
    }
}

/// A planet described by its sea-level radius and surface gravity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetBody {
    pub radius_m: f64,
    pub surface_gravity: f64,
}

/// Hill-sphere + power-law falloff gravity model.
///
/// # Example
///
/// ```
/// use deckwatch_physics::gravity::{GravityModel, GravitySample};
///
/// let model = GravityModel::default();
/// let sample = GravitySample {
///     current_radius: 70_000.0,
///     current_altitude_asl: 10_000.0,
///     current_gravity: 6.0,
/// };
/// let alt = model.altitude_for_gravity(&sample, 3.0).unwrap();
/// let r = sample.planet_radius() + alt;
/// assert!((model.gravity_at_radius(&sample, r) - 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityModel {
    pub hill_fraction: f64,
    pub falloff_exponent: f64,
}

impl Default for GravityModel {
    fn default() -> Self {
        Self {
            hill_fraction: DEFAULT_HILL_FRACTION,
            falloff_exponent: DEFAULT_FALLOFF_EXPONENT,
        }
    }
}

impl GravityModel {
    /// Outer radius of the constant-gravity shell for a planet of `radius`.
    pub fn hill_radius(&self, radius: f64) -> f64 {
        radius * (1.0 + self.hill_fraction)
    }

    /// Altitude above sea level at which gravity equals `target_gravity`.
    ///
    /// Targets at or above the sampled gravity resolve to the hill-sphere
    /// border, the highest altitude where that gravity still applies.
    ///
    /// # Errors
    ///
    /// Returns [`Infeasible`] when the sample is too weak to model, the
    /// radius data is degenerate, or the target is not a positive finite
    /// gravity.
    pub fn altitude_for_gravity(
        &self,
        sample: &GravitySample,
        target_gravity: f64,
    ) -> Result<f64, Infeasible> {
        let radius = sample.planet_radius();
        if radius < MIN_PLANET_RADIUS {
            return Err(Infeasible::DegenerateRadius(radius));
        }
        if sample.current_gravity < MIN_SAMPLE_GRAVITY {
            return Err(Infeasible::NegligibleGravity(sample.current_gravity));
        }
        if !target_gravity.is_finite() || target_gravity < MIN_TARGET_GRAVITY {
            return Err(Infeasible::UnreachableTarget(target_gravity));
        }

        let hill = self.hill_radius(radius);
        if target_gravity >= sample.current_gravity {
            return Ok(hill - radius);
        }

        let ratio = sample.current_gravity / target_gravity;
        let target_radius = hill * ratio.powf(1.0 / self.falloff_exponent);
        Ok(target_radius - radius)
    }

    /// Gravity at distance `radius` from the centre, using the sample as the
    /// reference gravity.  Inverse of [`altitude_for_gravity`] below the
    /// sampled gravity.
    ///
    /// [`altitude_for_gravity`]: Self::altitude_for_gravity
    pub fn gravity_at_radius(&self, sample: &GravitySample, radius: f64) -> f64 {
        let hill = self.hill_radius(sample.planet_radius());
        self.falloff(sample.current_gravity, hill, radius)
    }

    /// Gravity of `planet` at distance `radius` from its centre.
    pub fn field_strength(&self, planet: &PlanetBody, radius: f64) -> f64 {
        let hill = self.hill_radius(planet.radius_m);
        self.falloff(planet.surface_gravity, hill, radius)
    }

    fn falloff(&self, reference: f64, hill: f64, radius: f64) -> f64 {
        if radius <= hill {
            reference
        } else {
            reference * (hill / radius).powf(self.falloff_exponent)
        }
    }
}
