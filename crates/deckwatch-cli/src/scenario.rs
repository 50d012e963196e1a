//! Simulated powered descent used by `deckwatch run` and `deckwatch once`.
//!
//! The ship starts above the planet's hill sphere, where gravity is weak,
//! and descends into full surface gravity.  A simple pilot throttles the
//! lift thrusters to hold a descent rate that shrinks with altitude.  The
//! advisor only sees the thrusters' rated capability, so cargo mass drags
//! the TWR down through the operational and hard decks on the way in.

use std::time::Duration;

use deckwatch_hal::DeviceRegistry;
use deckwatch_hal::sim::{SimLight, SimPanel, SimRegistry, SimShip, SimSound, SimThruster};
use deckwatch_physics::{GravityModel, PlanetBody};
use deckwatch_types::Vec3;
use serde::{Deserialize, Serialize};

/// Pilot gain from descent-rate error to commanded acceleration, in 1/s.
const PILOT_GAIN: f64 = 0.5;

/// Slowest descent rate the pilot aims for, in m/s.
const MIN_TARGET_DESCENT: f64 = 5.0;

/// Scenario parameters, stored under `[scenario]` in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub planet: PlanetBody,
    pub start_altitude_m: f64,
    /// Initial downward speed, in m/s.
    pub descent_speed: f64,
    pub dry_mass_kg: f64,
    pub cargo_kg: f64,
    /// Upward thrust as a multiple of the dry ship's surface weight.
    pub lift_factor: f64,
    /// Fraction of altitude the pilot will descend per second.
    pub descent_per_altitude: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            planet: PlanetBody {
                radius_m: 60_000.0,
                surface_gravity: 9.81,
            },
            start_altitude_m: 12_000.0,
            descent_speed: 120.0,
            dry_mass_kg: 250_000.0,
            cargo_kg: 0.0,
            lift_factor: 1.5,
            descent_per_altitude: 0.01,
        }
    }
}

impl ScenarioConfig {
    /// Total rated upward thrust, in Newtons.  Never negative.
    pub fn lift_thrust(&self) -> f64 {
        (self.lift_factor * self.dry_mass_kg * self.planet.surface_gravity).max(0.0)
    }
}

/// A ship descending toward the planet.
#[derive(Debug, Clone)]
pub struct DescentScenario {
    config: ScenarioConfig,
    gravity: GravityModel,
    ship: SimShip,
    altitude: f64,
    /// Upward speed; negative while descending.
    vertical_speed: f64,
    elapsed: Duration,
}

impl DescentScenario {
    pub fn new(config: ScenarioConfig, gravity: GravityModel) -> Self {
        let lift = config.lift_thrust() / 4.0;
        let up = Vec3::new(0.0, 1.0, 0.0);
        let ship = SimShip::new(config.dry_mass_kg + config.cargo_kg)
            .with_thruster(SimThruster::new("lift_fore_port", up, lift))
            .with_thruster(SimThruster::new("lift_fore_stbd", up, lift))
            .with_thruster(SimThruster::new("lift_aft_port", up, lift))
            .with_thruster(SimThruster::new("lift_aft_stbd", up, lift))
            .with_thruster(SimThruster::new(
                "main_drive",
                Vec3::new(0.0, 0.0, -1.0),
                config.lift_thrust(),
            ));
        let mut scenario = Self {
            altitude: config.start_altitude_m,
            vertical_speed: -config.descent_speed,
            config,
            gravity,
            ship,
            elapsed: Duration::ZERO,
        };
        scenario.sync_ship();
        scenario
    }

    /// The simulated ship, usable as both telemetry ports.
    pub fn ship(&self) -> &SimShip {
        &self.ship
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn vertical_speed(&self) -> f64 {
        self.vertical_speed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn landed(&self) -> bool {
        self.altitude <= 0.0
    }

    /// Local gravity magnitude at the current altitude.
    pub fn gravity(&self) -> f64 {
        self.gravity
            .field_strength(&self.config.planet, self.config.planet.radius_m + self.altitude)
    }

    /// Advance the ship by `dt` with semi-implicit Euler integration.
    pub fn step(&mut self, dt: Duration) {
        if self.landed() {
            return;
        }
        let dt_s = dt.as_secs_f64();
        let g = self.gravity();
        let thrust_accel = self.pilot_thrust() / self.ship.mass_kg;

        self.vertical_speed += (thrust_accel - g) * dt_s;
        self.altitude += self.vertical_speed * dt_s;
        if self.altitude <= 0.0 {
            self.altitude = 0.0;
            self.vertical_speed = 0.0;
        }
        self.elapsed += dt;
        self.sync_ship();
    }

    /// Upward thrust the pilot commands this step, clamped to what the lift
    /// thrusters can deliver.
    fn pilot_thrust(&self) -> f64 {
        let target = -(self.altitude * self.config.descent_per_altitude).max(MIN_TARGET_DESCENT);
        let wanted_accel = self.gravity() + PILOT_GAIN * (target - self.vertical_speed);
        (wanted_accel * self.ship.mass_kg).clamp(0.0, self.config.lift_thrust())
    }

    fn sync_ship(&mut self) {
        let g = self.gravity();
        self.ship.gravity = Vec3::new(0.0, -g, 0.0);
        self.ship.velocity = Vec3::new(0.0, self.vertical_speed, 0.0);
        self.ship.distance_to_center_m = Some(self.config.planet.radius_m + self.altitude);
        self.ship.altitude_asl_m = Some(self.altitude);
    }
}

/// Bridge layout: one bridge LCD, a three-screen cockpit, a status light,
/// a rotating beacon and a siren.
pub fn bridge_devices(identifier: &str) -> DeviceRegistry {
    let bridge = format!(
        "{identifier} bridge readout\n\
         TWR      [TWR]\n\
         Accel    [ACCEL]\n\
         Hover    [CANHOVER]  Earthlike [EARTHLIKE]  Pertram [PERTRAM]\n\
         Stop     [STOPDIST]\n\
         Deck     [ALTDIST]\n\
         [BRAKEDIST]"
    );
    SimRegistry::new()
        .with_panel("bridge_lcd", bridge)
        .with_surface(SimPanel::with_surfaces(
            "cockpit",
            "[SURFACE=2]TWR [TWR] | [BRAKEDIST]",
            3,
        ))
        .with_light(SimLight::new("status_light", ""))
        .with_light(SimLight::new("beacon", "[ROTATING]"))
        .with_sound(SimSound::new("siren"))
        .build()
}
