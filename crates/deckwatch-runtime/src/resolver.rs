//! Token resolvers backed by live flight data.

use deckwatch_physics::{DeckThreshold, EARTHLIKE_GRAVITY, FlightFeasibility, PERTRAM_GRAVITY};

use crate::template::{Token, TokenResolver};

/// Shown for every value token when telemetry is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Resolves tokens from one tick's [`FlightFeasibility`].
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryResolver<'a> {
    flight: FlightFeasibility<'a>,
    operational_twr: f64,
}

impl<'a> AdvisoryResolver<'a> {
    pub fn new(flight: FlightFeasibility<'a>, operational_twr: f64) -> Self {
        Self {
            flight,
            operational_twr,
        }
    }

    fn deck(&self) -> DeckThreshold {
        DeckThreshold::Operational(self.operational_twr)
    }

    fn brake_status(&self) -> String {
        let Some(altitude) = self.flight.altitude_asl() else {
            return "ALT: N/A".to_string();
        };
        let brake_altitude = match self.flight.brake_altitude_to_deck(self.deck()) {
            Ok(alt) => alt,
            Err(_) => return "BRAKE ALT: N/A".to_string(),
        };
        if brake_altitude.is_infinite() {
            return "BRAKE ALT: IMPOSSIBLE".to_string();
        }
        let meters_to_brake = altitude - brake_altitude;
        if meters_to_brake <= 0.0 {
            "BRAKE NOW".to_string()
        } else {
            format!("Brake in: {meters_to_brake:.1} m")
        }
    }

    fn deck_altitude(&self) -> String {
        match self.flight.deck_altitude(self.deck()) {
            Ok(alt) => format!("{alt:.1} m"),
            Err(_) => NOT_AVAILABLE.to_string(),
        }
    }
}

impl TokenResolver for AdvisoryResolver<'_> {
    fn resolve(&self, token: Token) -> String {
        match token {
            Token::Twr => fixed(self.flight.twr(), 2),
            Token::Accel => format!("{}m/s²", fixed(self.flight.net_upward_acceleration(), 2)),
            Token::CanHover => yes_no(self.flight.net_upward_acceleration() >= 0.0),
            Token::StopDist => format!("{}m", fixed(self.flight.stopping_distance_thrust_only(), 3)),
            Token::BrakeDist => self.brake_status(),
            Token::AltDist => self.deck_altitude(),
            Token::Earthlike => yes_no(self.flight.can_hover_at_gravity(EARTHLIKE_GRAVITY)),
            Token::Pertram => yes_no(self.flight.can_hover_at_gravity(PERTRAM_GRAVITY)),
            Token::Rotating | Token::Surface(_) => String::new(),
        }
    }
}

/// Resolver used when the sensor snapshot could not be taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableResolver;

impl TokenResolver for UnavailableResolver {
    fn resolve(&self, token: Token) -> String {
        match token {
            Token::Rotating | Token::Surface(_) => String::new(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Fixed-point format; infinities render as `∞`.
fn fixed(value: f64, decimals: usize) -> String {
    if value.is_infinite() {
        let symbol = if value > 0.0 { "∞" } else { "-∞" };
        symbol.to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

fn yes_no(flag: bool) -> String {
    let answer = if flag { "Yes" } else { "No" };
    answer.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateSyntax, render};
    use deckwatch_physics::GravityModel;
    use deckwatch_types::{PlanetGeometry, ShipFrame, ShipTelemetrySnapshot, ThrusterReading, Vec3};

    fn snapshot(lift: f64, g: f64) -> ShipTelemetrySnapshot {
        ShipTelemetrySnapshot {
            mass_kg: 1000.0,
            gravity_vector: Vec3::new(0.0, -g, 0.0),
            velocity: Vec3::zeros(),
            frame: ShipFrame::default(),
            planet: None,
            thrusters: vec![ThrusterReading {
                push_direction: Vec3::new(0.0, 1.0, 0.0),
                max_effective_force_newtons: lift,
                is_usable: true,
            }],
        }
    }

    fn rendered(snap: &ShipTelemetrySnapshot, template: &str) -> String {
        let flight = FlightFeasibility::new(snap, GravityModel::default());
        render(template, &TemplateSyntax::default(), &AdvisoryResolver::new(flight, 2.0))
    }

    #[test]
    fn balanced_ship_renders_unit_twr() {
        assert_eq!(rendered(&snapshot(9800.0, 9.8), "[TWR]"), "1.00");
    }

    #[test]
    fn accel_and_stopdist_join_with_one_space() {
        let mut snap = snapshot(19_600.0, 9.8);
        snap.velocity = Vec3::new(0.0, -10.0, 0.0);
        assert_eq!(rendered(&snap, "[ACCEL,STOPDIST]"), "9.80m/s² 2.551m");
    }

    #[test]
    fn zero_gravity_twr_is_infinite() {
        assert_eq!(rendered(&snapshot(9800.0, 0.0), "[TWR]"), "∞");
    }

    #[test]
    fn hover_flags() {
        let snap = snapshot(10_000.0, 9.8);
        assert_eq!(rendered(&snap, "[CANHOVER,EARTHLIKE,PERTRAM]"), "Yes Yes No");
        let snap = snapshot(5_000.0, 9.8);
        assert_eq!(rendered(&snap, "[canhover]"), "No");
    }

    #[test]
    fn brake_status_without_planet() {
        assert_eq!(rendered(&snapshot(30_000.0, 9.8), "[BRAKEDIST]"), "ALT: N/A");
        assert_eq!(rendered(&snapshot(30_000.0, 9.8), "[ALTDIST]"), "N/A");
    }

    fn on_planet(lift: f64, vy: f64, altitude: f64) -> ShipTelemetrySnapshot {
        let mut snap = snapshot(lift, 6.0);
        snap.velocity = Vec3::new(0.0, vy, 0.0);
        snap.planet = Some(PlanetGeometry {
            distance_to_center_m: 60_000.0 + altitude,
            altitude_asl_m: altitude,
        });
        snap
    }

    #[test]
    fn brake_status_impossible_when_descent_unstoppable() {
        let snap = on_planet(3_000.0, -40.0, 20_000.0);
        assert_eq!(rendered(&snap, "[BRAKEDIST]"), "BRAKE ALT: IMPOSSIBLE");
    }

    #[test]
    fn brake_status_counts_down_to_brake_point() {
        // Operational deck at the hill border (7200 m); 12 m/s² ops gravity.
        let snap = on_planet(24_000.0, -30.0, 20_000.0);
        let stop = 900.0 / (2.0 * 18.0);
        let expected = format!("Brake in: {:.1} m", 20_000.0 - (7_200.0 + stop));
        assert_eq!(rendered(&snap, "[BRAKEDIST]"), expected);
        assert_eq!(rendered(&snap, "[ALTDIST]"), "7200.0 m");
    }

    #[test]
    fn brake_now_below_brake_point() {
        let snap = on_planet(24_000.0, -30.0, 7_000.0);
        assert_eq!(rendered(&snap, "[BRAKEDIST]"), "BRAKE NOW");
    }

    #[test]
    fn brake_status_na_when_deck_unsolvable() {
        let snap = on_planet(0.0, -30.0, 20_000.0);
        assert_eq!(rendered(&snap, "[BRAKEDIST]"), "BRAKE ALT: N/A");
    }

    #[test]
    fn unavailable_resolver_renders_na() {
        let out = render(
            "[TWR, SURFACE=1, ACCEL]",
            &TemplateSyntax::default(),
            &UnavailableResolver,
        );
        assert_eq!(out, "N/A  N/A");
    }
}
