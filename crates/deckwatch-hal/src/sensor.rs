//! Telemetry inputs: ship sensors, thrusters and planet geometry.
//!
//! [`capture_snapshot`] is the only place the advisor reads from these ports.
//! It is called once per tick so that every computation in that tick observes
//! the same mass, gravity and thruster set.

use deckwatch_types::{
    AdvisorError, PlanetGeometry, ShipFrame, ShipTelemetrySnapshot, ThrusterReading, Vec3,
};

/// A single thruster as seen by the sensor layer.
pub trait ThrustSource {
    /// Stable identifier, e.g. `"lift_thruster_3"`.
    fn id(&self) -> &str;

    /// World-space unit vector of the force this thruster applies to the ship.
    fn push_direction(&self) -> Vec3;

    /// Rated force at current conditions (Newtons).
    fn max_effective_thrust(&self) -> f64;

    fn is_functional(&self) -> bool;
    fn is_enabled(&self) -> bool;
    fn is_working(&self) -> bool;

    /// Fold this thruster into a [`ThrusterReading`].
    fn reading(&self) -> ThrusterReading {
        ThrusterReading {
            push_direction: self.push_direction(),
            max_effective_force_newtons: self.max_effective_thrust(),
            is_usable: self.is_functional() && self.is_enabled() && self.is_working(),
        }
    }
}

/// Ship-level telemetry source (typically the main cockpit or any ship
/// controller).
///
/// Every method returns [`AdvisorError::SensorUnavailable`] when no
/// controlling device exists.
pub trait SensorPort {
    /// Physical mass in kilograms.
    fn mass_kg(&self) -> Result<f64, AdvisorError>;

    /// Natural gravity vector (toward the gravity source, m/s²).
    fn gravity_vector(&self) -> Result<Vec3, AdvisorError>;

    /// Linear velocity in world space (m/s).
    fn velocity_vector(&self) -> Result<Vec3, AdvisorError>;

    /// World-space orientation of the ship's local axes.
    fn ship_frame(&self) -> Result<ShipFrame, AdvisorError>;

    /// All thrusters on the ship, usable or not.
    fn thrusters(&self) -> Result<Vec<ThrusterReading>, AdvisorError>;
}

/// Position relative to the nearest planet.  Both values are `None` outside
/// a gravity well.
pub trait PlanetGeometryPort {
    /// Distance from the ship to the gravity centre (metres).
    fn distance_to_gravity_center(&self) -> Option<f64>;

    /// Altitude above sea level (metres).
    fn altitude_asl(&self) -> Option<f64>;
}

/// Read every port once and build this tick's [`ShipTelemetrySnapshot`].
///
/// Only usable thrusters are kept.
///
/// # Errors
///
/// Returns [`AdvisorError::SensorUnavailable`] if any sensor read fails or
/// the reported mass is not a positive finite number.
pub fn capture_snapshot(
    sensors: &dyn SensorPort,
    geometry: &dyn PlanetGeometryPort,
) -> Result<ShipTelemetrySnapshot, AdvisorError> {
    let mass_kg = sensors.mass_kg()?;
    if !mass_kg.is_finite() || mass_kg <= 0.0 {
        return Err(AdvisorError::SensorUnavailable(format!(
            "ship mass reading {mass_kg} is not usable"
        )));
    }

    let planet = match (geometry.distance_to_gravity_center(), geometry.altitude_asl()) {
        (Some(distance_to_center_m), Some(altitude_asl_m)) => Some(PlanetGeometry {
            distance_to_center_m,
            altitude_asl_m,
        }),
        _ => None,
    };

    Ok(ShipTelemetrySnapshot {
        mass_kg,
        gravity_vector: sensors.gravity_vector()?,
        velocity: sensors.velocity_vector()?,
        frame: sensors.ship_frame()?,
        planet,
        thrusters: sensors
            .thrusters()?
            .into_iter()
            .filter(|t| t.is_usable)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockThruster {
        functional: bool,
        enabled: bool,
        working: bool,
    }

    impl ThrustSource for MockThruster {
        fn id(&self) -> &str {
            "mock_thruster"
        }
        fn push_direction(&self) -> Vec3 {
            Vec3::new(0.0, 1.0, 0.0)
        }
        fn max_effective_thrust(&self) -> f64 {
            500.0
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

    struct MockSensors {
        mass: Result<f64, AdvisorError>,
        thrusters: Vec<ThrusterReading>,
    }

    impl MockSensors {
        fn with_mass(mass: Result<f64, AdvisorError>) -> Self {
            Self { mass, thrusters: Vec::new() }
        }
    }

    impl SensorPort for MockSensors {
        fn mass_kg(&self) -> Result<f64, AdvisorError> {
            self.mass.clone()
        }
        fn gravity_vector(&self) -> Result<Vec3, AdvisorError> {
            Ok(Vec3::new(0.0, -9.8, 0.0))
        }
        fn velocity_vector(&self) -> Result<Vec3, AdvisorError> {
            Ok(Vec3::zeros())
        }
        fn ship_frame(&self) -> Result<ShipFrame, AdvisorError> {
            Ok(ShipFrame::default())
        }
        fn thrusters(&self) -> Result<Vec<ThrusterReading>, AdvisorError> {
            Ok(self.thrusters.clone())
        }
    }

    struct MockGeometry(Option<f64>, Option<f64>);

    impl PlanetGeometryPort for MockGeometry {
        fn distance_to_gravity_center(&self) -> Option<f64> {
            self.0
        }
        fn altitude_asl(&self) -> Option<f64> {
            self.1
        }
    }

    #[test]
    fn thruster_usable_only_when_all_flags_set() {
        let ok = MockThruster { functional: true, enabled: true, working: true };
        assert!(ok.reading().is_usable);

        for (functional, enabled, working) in
            [(false, true, true), (true, false, true), (true, true, false)]
        {
            let t = MockThruster { functional, enabled, working };
            assert!(!t.reading().is_usable);
        }
    }

    #[test]
    fn capture_keeps_only_usable_thrusters() {
        let healthy = MockThruster { functional: true, enabled: true, working: true };
        let damaged = MockThruster { functional: false, enabled: true, working: true };
        let sensors = MockSensors {
            mass: Ok(1000.0),
            thrusters: vec![healthy.reading(), damaged.reading(), healthy.reading()],
        };
        let snap = capture_snapshot(&sensors, &MockGeometry(None, None)).unwrap();
        assert_eq!(snap.thrusters.len(), 2);
        assert!(snap.thrusters.iter().all(|t| t.is_usable));
    }

    #[test]
    fn capture_includes_planet_when_both_values_known() {
        let sensors = MockSensors::with_mass(Ok(1000.0));
        let snap = capture_snapshot(&sensors, &MockGeometry(Some(61_000.0), Some(1_000.0))).unwrap();
        let planet = snap.planet.unwrap();
        assert!((planet.altitude_asl_m - 1_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn capture_drops_partial_planet_geometry() {
        let sensors = MockSensors::with_mass(Ok(1000.0));
        let snap = capture_snapshot(&sensors, &MockGeometry(Some(61_000.0), None)).unwrap();
        assert!(snap.planet.is_none());
    }

    #[test]
    fn capture_rejects_zero_mass() {
        let sensors = MockSensors::with_mass(Ok(0.0));
        let result = capture_snapshot(&sensors, &MockGeometry(None, None));
        assert!(matches!(result, Err(AdvisorError::SensorUnavailable(_))));
    }

    #[test]
    fn capture_propagates_missing_controller() {
        let sensors =
            MockSensors::with_mass(Err(AdvisorError::SensorUnavailable("no controller".into())));
        let result = capture_snapshot(&sensors, &MockGeometry(None, None));
        assert!(matches!(result, Err(AdvisorError::SensorUnavailable(_))));
    }
}
