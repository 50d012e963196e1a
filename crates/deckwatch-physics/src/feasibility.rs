//! [`FlightFeasibility`] – what the ship's thrusters can do against gravity.
//!
//! Every quantity is derived from a single borrowed
//! [`ShipTelemetrySnapshot`], so all values computed within one tick agree
//! on mass, gravity and thruster set.
//!
//! Degenerate inputs never fail: they map to the sentinels documented on each
//! method (`0.0` for "nothing to do", `f64::INFINITY` for "cannot be done").
//! Only the altitude solves return [`Infeasible`].

use deckwatch_types::{ShipTelemetrySnapshot, Vec3};
use serde::{Deserialize, Serialize};

use crate::gravity::{GravityModel, GravitySample, Infeasible};

/// TWR below which there is no net upward authority at all.
pub const HARD_DECK_TWR: f64 = 1.1;
/// Default operator-configured TWR margin.
pub const DEFAULT_OPERATIONAL_TWR: f64 = 2.0;
/// Reference gravity of an Earth-like world (m/s²).
pub const EARTHLIKE_GRAVITY: f64 = 9.8;
/// Reference gravity of the heaviest stock world (m/s²).
pub const PERTRAM_GRAVITY: f64 = 11.77;

const GRAVITY_EPS: f64 = 1e-6;
const STATIONARY_SPEED: f64 = 1e-3;
const MIN_MASS_KG: f64 = 1e-6;
const MIN_BRAKING_MASS_KG: f64 = 1e-3;
const MIN_DECELERATION: f64 = 1e-6;

/// A named TWR threshold whose crossing altitude the advisor tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "twr", rename_all = "lowercase")]
pub enum DeckThreshold {
    /// Operator-configured safety margin.
    Operational(f64),
    /// Fixed [`HARD_DECK_TWR`].
    Hard,
}

impl DeckThreshold {
    pub fn twr(self) -> f64 {
        match self {
            DeckThreshold::Operational(twr) => twr,
            DeckThreshold::Hard => HARD_DECK_TWR,
        }
    }
}

/// Feasibility calculator over one telemetry snapshot.
///
/// # Example
///
/// ```
/// use deckwatch_physics::{FlightFeasibility, GravityModel};
/// use deckwatch_types::{ShipFrame, ShipTelemetrySnapshot, ThrusterReading, Vec3};
///
/// let snapshot = ShipTelemetrySnapshot {
///     mass_kg: 1000.0,
///     gravity_vector: Vec3::new(0.0, -9.8, 0.0),
///     velocity: Vec3::zeros(),
///     frame: ShipFrame::default(),
///     planet: None,
///     thrusters: vec![ThrusterReading {
///         push_direction: Vec3::new(0.0, 1.0, 0.0),
///         max_effective_force_newtons: 9800.0,
///         is_usable: true,
///     }],
/// };
/// let flight = FlightFeasibility::new(&snapshot, GravityModel::default());
/// assert!((flight.twr() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FlightFeasibility<'a> {
    snapshot: &'a ShipTelemetrySnapshot,
    gravity: GravityModel,
}

impl<'a> FlightFeasibility<'a> {
    pub fn new(snapshot: &'a ShipTelemetrySnapshot, gravity: GravityModel) -> Self {
        Self { snapshot, gravity }
    }

    pub fn snapshot(&self) -> &ShipTelemetrySnapshot {
        self.snapshot
    }

    // ── Raw thrust ───────────────────────────────────────────────────────────

    /// Magnitude of natural gravity (m/s²).
    pub fn gravity_magnitude(&self) -> f64 {
        self.snapshot.gravity_vector.norm()
    }

    /// Unit vector opposing gravity, or `None` outside a gravity well.
    fn up_axis(&self) -> Option<Vec3> {
        let g = self.snapshot.gravity_vector;
        if g.norm_squared() < GRAVITY_EPS {
            None
        } else {
            Some(-g.normalize())
        }
    }

    /// Total usable thrust (N) along `axis`.  Zero for a degenerate axis.
    pub fn thrust_along(&self, axis: &Vec3) -> f64 {
        if axis.norm_squared() < GRAVITY_EPS {
            return 0.0;
        }
        let axis = axis.normalize();
        self.snapshot
            .thrusters
            .iter()
            .map(|t| t.force_along(&axis))
            .sum()
    }

    /// Thrust (N) opposing gravity right now.  Zero without gravity.
    pub fn upward_thrust_force(&self) -> f64 {
        self.up_axis()
            .map(|up| self.thrust_along(&up))
            .unwrap_or(0.0)
    }

    /// Strongest thrust (N) over the six ship-frame cardinal directions.
    pub fn max_axis_thrust_force(&self) -> f64 {
        self.snapshot
            .frame
            .cardinal_directions()
            .iter()
            .map(|axis| self.thrust_along(axis))
            .fold(0.0, f64::max)
    }

    // ── Accelerations ────────────────────────────────────────────────────────

    /// Thrust-to-weight ratio against current gravity; `+inf` without
    /// gravity.
    pub fn twr(&self) -> f64 {
        let g = self.gravity_magnitude();
        if g < GRAVITY_EPS {
            return f64::INFINITY;
        }
        self.upward_thrust_force() / (self.snapshot.mass_kg * g)
    }

    /// Upward acceleration from thrust alone, `F_up / m` (m/s²).
    pub fn up_accel_thrust_only(&self) -> f64 {
        if self.snapshot.mass_kg <= MIN_MASS_KG {
            return 0.0;
        }
        self.upward_thrust_force() / self.snapshot.mass_kg
    }

    /// Net upward acceleration at full burn, `F_up / m - g`.  Positive means
    /// the ship can climb.
    pub fn net_upward_acceleration(&self) -> f64 {
        self.up_accel_thrust_only() - self.gravity_magnitude()
    }

    /// Best-axis acceleration from thrust alone (m/s²).
    pub fn max_up_accel_thrust_only(&self) -> f64 {
        if self.snapshot.mass_kg <= MIN_MASS_KG {
            return 0.0;
        }
        self.max_axis_thrust_force() / self.snapshot.mass_kg
    }

    /// Whether the ship could hover in gravity `g` after reorienting its
    /// strongest axis upward.
    pub fn can_hover_at_gravity(&self, g: f64) -> bool {
        self.max_up_accel_thrust_only() >= g
    }

    // ── Braking ──────────────────────────────────────────────────────────────

    /// Thrust-only deceleration opposite the velocity vector (m/s²).
    pub fn braking_deceleration_along_velocity(&self) -> f64 {
        let v = self.snapshot.velocity;
        let speed = v.norm();
        if speed < STATIONARY_SPEED || self.snapshot.mass_kg <= MIN_BRAKING_MASS_KG {
            return 0.0;
        }
        self.thrust_along(&(-v / speed)) / self.snapshot.mass_kg
    }

    /// Distance to null the full velocity vector with thrust alone, gravity
    /// ignored.
    pub fn stopping_distance_thrust_only(&self) -> f64 {
        let speed = self.snapshot.velocity.norm();
        if speed < STATIONARY_SPEED {
            return 0.0;
        }
        let a = self.braking_deceleration_along_velocity();
        if a < MIN_DECELERATION {
            return f64::INFINITY;
        }
        speed * speed / (2.0 * a)
    }

    /// Speed along the gravity vector (m/s).  Never negative.
    pub fn down_speed(&self) -> f64 {
        match self.up_axis() {
            Some(up) => (-self.snapshot.velocity.dot(&up)).max(0.0),
            None => 0.0,
        }
    }

    /// Altitude lost while arresting the current descent at full upward
    /// thrust.  `0` when not descending, `+inf` when the descent cannot be
    /// arrested.
    pub fn vertical_stop_distance(&self) -> f64 {
        let down = self.down_speed();
        if down < STATIONARY_SPEED {
            return 0.0;
        }
        let net = self.net_upward_acceleration();
        if net <= 0.0 {
            return f64::INFINITY;
        }
        down * down / (2.0 * net)
    }

    // ── Decks ────────────────────────────────────────────────────────────────

    /// Gravity magnitude at which this ship's TWR would equal `twr`.
    pub fn gravity_at_twr(&self, twr: f64) -> f64 {
        if twr <= GRAVITY_EPS {
            return f64::INFINITY;
        }
        let f_over_m = self.up_accel_thrust_only();
        if f_over_m <= GRAVITY_EPS {
            return f64::INFINITY;
        }
        f_over_m / twr
    }

    /// Current altitude above sea level, if inside a gravity well.
    pub fn altitude_asl(&self) -> Option<f64> {
        self.snapshot.planet.map(|p| p.altitude_asl_m)
    }

    /// Altitude ASL at which TWR crosses `threshold`.
    ///
    /// # Errors
    ///
    /// [`Infeasible::NoPlanet`] outside a gravity well, otherwise whatever
    /// the gravity inversion reports.
    pub fn deck_altitude(&self, threshold: DeckThreshold) -> Result<f64, Infeasible> {
        let planet = self.snapshot.planet.ok_or(Infeasible::NoPlanet)?;
        let sample = GravitySample::from_geometry(&planet, self.gravity_magnitude());
        let target = self.gravity_at_twr(threshold.twr());
        self.gravity.altitude_for_gravity(&sample, target)
    }

    /// Altitude ASL at which braking must start to stop exactly at the deck.
    /// `Ok(+inf)` when the descent cannot be arrested at all.
    ///
    /// # Errors
    ///
    /// Same as [`deck_altitude`](Self::deck_altitude).
    pub fn brake_altitude_to_deck(&self, threshold: DeckThreshold) -> Result<f64, Infeasible> {
        let deck = self.deck_altitude(threshold)?;
        let stop = self.vertical_stop_distance();
        if stop.is_infinite() {
            return Ok(f64::INFINITY);
        }
        Ok(deck + stop)
    }
}
