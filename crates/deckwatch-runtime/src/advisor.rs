//! [`Advisor`] – the per-tick pipeline.
//!
//! One call to [`Advisor::tick`]:
//!
//! 1. snapshots telemetry once through the sensor ports,
//! 2. assesses the flight envelope (sampling the TWR history exactly once),
//! 3. renders every controlled display,
//! 4. drives every controlled light,
//! 5. paces and triggers the alarm sound.
//!
//! Carried state lives in [`AdvisorState`], which the caller moves into the
//! tick and receives back.  Nothing in a tick is fatal: sensor loss renders
//! `N/A` and device faults are logged and skipped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use deckwatch_hal::{DeviceRegistry, PlanetGeometryPort, SensorPort, SurfaceTarget, capture_snapshot};
use deckwatch_kernel::{
    AlarmPacer, EnvelopeState, LightPolicy, LightStateMachine, TwrHistory, classify,
};
use deckwatch_physics::{DEFAULT_OPERATIONAL_TWR, FlightFeasibility, GravityModel};
use deckwatch_types::{ActuatorCommand, AlarmSeverity, LightColor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::resolver::{AdvisoryResolver, UnavailableResolver};
use crate::template::{
    TemplateSyntax, Token, TokenResolver, extract_tokens, render, strip_identifier_lines,
};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for [`Advisor`].  Every field has a default, so a partial TOML
/// table is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Template lines containing this text are controller configuration and
    /// are never rendered.
    pub identifier: String,
    /// TWR margin the operator wants to keep.
    pub operational_twr: f64,
    /// Blink interval for blinking warning lights, in seconds.
    pub blink_interval_s: f64,
    /// Light color for the early operational warning.
    pub warning_color: LightColor,
    /// Sound played by alarm emitters.
    pub alert_sound: String,
    pub play_alert_sound: bool,
    /// Ticks between repeated alarm sounds while the alarm stays active.
    pub alarm_repeat_ticks: u32,
    pub syntax: TemplateSyntax,
    pub gravity: GravityModel,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            identifier: "<Deckwatch>".to_string(),
            operational_twr: DEFAULT_OPERATIONAL_TWR,
            blink_interval_s: 2.0,
            warning_color: LightColor::Yellow,
            alert_sound: "Alert 1".to_string(),
            play_alert_sound: true,
            alarm_repeat_ticks: deckwatch_kernel::alarm_pacer::DEFAULT_REPEAT_TICKS,
            syntax: TemplateSyntax::default(),
            gravity: GravityModel::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Carried state and reports
// ─────────────────────────────────────────────────────────────────────────────

/// Everything carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorState {
    pub twr_history: TwrHistory,
    pub pacer: AlarmPacer,
    /// Number of ticks evaluated so far.
    pub tick: u64,
    pub severity: AlarmSeverity,
}

impl AdvisorState {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self {
            twr_history: TwrHistory::default(),
            pacer: AlarmPacer::new(config.alarm_repeat_ticks),
            tick: 0,
            severity: AlarmSeverity::Nominal,
        }
    }
}

/// Text written to one display surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDisplay {
    pub surface_id: String,
    /// Zero-based surface index.
    pub surface_index: usize,
    pub text: String,
}

/// Policy applied to one light, and the rule that selected it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightReport {
    pub light_id: String,
    pub rule: &'static str,
    pub policy: LightPolicy,
}

/// Summary of one evaluated tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
    pub sensors_available: bool,
    /// `null` in JSON when gravity is negligible.
    pub twr: f64,
    pub net_accel: f64,
    pub down_speed: f64,
    pub twr_rate: Option<f64>,
    pub severity: AlarmSeverity,
    pub severity_rule: &'static str,
    pub alarm_active: bool,
    pub alarm_sounded: bool,
    pub displays: Vec<RenderedDisplay>,
    pub lights: Vec<LightReport>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Advisor
// ─────────────────────────────────────────────────────────────────────────────

/// Flight-envelope advisor.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use deckwatch_hal::sim::{SimPanel, SimRegistry, SimShip, SimThruster};
/// use deckwatch_runtime::advisor::{Advisor, AdvisorConfig, AdvisorState};
/// use deckwatch_types::Vec3;
///
/// let ship = SimShip::new(1000.0)
///     .with_gravity(Vec3::new(0.0, -9.8, 0.0))
///     .with_thruster(SimThruster::new("lift", Vec3::new(0.0, 1.0, 0.0), 9800.0));
/// let panel = SimPanel::new("lcd", "TWR [TWR]");
/// let screens = panel.screens();
/// let mut devices = SimRegistry::new().with_surface(panel).build();
///
/// let advisor = Advisor::new(AdvisorConfig::default());
/// let state = AdvisorState::new(advisor.config());
/// let (_, report) = advisor.tick(state, &ship, &ship, &mut devices, Duration::from_millis(16));
///
/// assert_eq!(report.tick, 1);
/// assert_eq!(screens.borrow()[0], "TWR 1.00");
/// ```
#[derive(Debug, Clone)]
pub struct Advisor {
    config: AdvisorConfig,
    lights: LightStateMachine,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Self {
        let lights = LightStateMachine::new(config.warning_color);
        Self { config, lights }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Evaluate one tick against the current telemetry and devices.
    #[instrument(skip_all, fields(tick = state.tick + 1))]
    pub fn tick(
        &self,
        state: AdvisorState,
        sensors: &dyn SensorPort,
        geometry: &dyn PlanetGeometryPort,
        devices: &mut DeviceRegistry,
        elapsed: Duration,
    ) -> (AdvisorState, TickReport) {
        let tick = state.tick + 1;

        let snapshot = match capture_snapshot(sensors, geometry) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "telemetry unavailable; rendering N/A");
                None
            }
        };
        let flight = snapshot
            .as_ref()
            .map(|s| FlightFeasibility::new(s, self.config.gravity));

        let (envelope, twr_history) = match &flight {
            Some(f) => EnvelopeState::assess(
                f,
                self.config.operational_twr,
                state.twr_history,
                elapsed,
            ),
            None => (EnvelopeState::unavailable(), TwrHistory::default()),
        };

        let severity = classify(&envelope);
        if severity.outcome != state.severity {
            info!(
                from = %state.severity,
                to = %severity.outcome,
                rule = severity.rule,
                "alarm severity changed"
            );
        }

        let advisory;
        let resolver: &dyn TokenResolver = match flight {
            Some(f) => {
                advisory = AdvisoryResolver::new(f, self.config.operational_twr);
                &advisory
            }
            None => &UnavailableResolver,
        };

        let displays = self.update_displays(devices, resolver);
        let lights = self.update_lights(devices, &envelope);

        let alarm_active = envelope.alarm_active();
        let (pacer, sound_now) = state
            .pacer
            .advance(alarm_active && self.config.play_alert_sound);
        let alarm_sounded = sound_now && self.sound_alarm(devices);

        debug!(
            twr = envelope.twr,
            net_accel = envelope.net_accel,
            down_speed = envelope.down_speed,
            severity = %severity.outcome,
            alarm_active,
            "tick evaluated"
        );

        let report = TickReport {
            tick,
            timestamp: Utc::now(),
            sensors_available: flight.is_some(),
            twr: envelope.twr,
            net_accel: envelope.net_accel,
            down_speed: envelope.down_speed,
            twr_rate: envelope.trend.rate(),
            severity: severity.outcome,
            severity_rule: severity.rule,
            alarm_active,
            alarm_sounded,
            displays,
            lights,
        };
        let next = AdvisorState {
            twr_history,
            pacer,
            tick,
            severity: severity.outcome,
        };
        (next, report)
    }

    /// Surface index to write for `target`, if any.
    ///
    /// Single-surface devices always get surface 0.  Multi-surface devices
    /// are written only when their template selects a surface in range.
    fn surface_index(&self, target: &SurfaceTarget, tokens: &[Token]) -> Option<usize> {
        match target.surface_count {
            0 => None,
            1 => Some(0),
            count => tokens.iter().find_map(|t| match t {
                Token::Surface(Some(n)) if (1..=count).contains(&usize::from(*n)) => {
                    Some(usize::from(*n) - 1)
                }
                _ => None,
            }),
        }
    }

    fn update_displays(
        &self,
        devices: &mut DeviceRegistry,
        resolver: &dyn TokenResolver,
    ) -> Vec<RenderedDisplay> {
        let mut rendered = Vec::new();
        for target in devices.surface_targets() {
            // The selector may sit on the identifier line, so read it before
            // stripping.
            let tokens = extract_tokens(&target.template, &self.config.syntax);
            let Some(surface_index) = self.surface_index(&target, &tokens) else {
                debug!(surface = %target.id, "no surface selected; skipping");
                continue;
            };

            let template = strip_identifier_lines(&target.template, &self.config.identifier);
            let text = render(&template, &self.config.syntax, resolver);
            let command = ActuatorCommand::WriteText {
                surface_id: target.id.clone(),
                surface_index,
                text: text.clone(),
            };
            match devices.dispatch(command) {
                Ok(()) => rendered.push(RenderedDisplay {
                    surface_id: target.id,
                    surface_index,
                    text,
                }),
                Err(e) => warn!(surface = %target.id, error = %e, "display write failed"),
            }
        }
        rendered
    }

    fn update_lights(
        &self,
        devices: &mut DeviceRegistry,
        envelope: &EnvelopeState,
    ) -> Vec<LightReport> {
        let mut applied = Vec::new();
        for target in devices.light_targets() {
            let beacon = extract_tokens(&target.template, &self.config.syntax)
                .contains(&Token::Rotating);
            let verdict = self.lights.decide(envelope, beacon);
            let command = verdict
                .outcome
                .command(&target.id, self.config.blink_interval_s);
            match devices.dispatch(command) {
                Ok(()) => applied.push(LightReport {
                    light_id: target.id,
                    rule: verdict.rule,
                    policy: verdict.outcome,
                }),
                Err(e) => warn!(light = %target.id, error = %e, "light update failed"),
            }
        }
        applied
    }

    /// Play the alert on every emitter.  Returns whether any emitter played.
    fn sound_alarm(&self, devices: &mut DeviceRegistry) -> bool {
        let mut played = false;
        for sound_id in devices.sound_ids() {
            let command = ActuatorCommand::TriggerSound {
                sound_id: sound_id.clone(),
                sound_name: self.config.alert_sound.clone(),
            };
            match devices.dispatch(command) {
                Ok(()) => played = true,
                Err(e) => warn!(sound = %sound_id, error = %e, "alarm sound failed"),
            }
        }
        played
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use deckwatch_hal::sim::{SimLight, SimPanel, SimRegistry, SimShip, SimSound, SimThruster};
    use deckwatch_kernel::twr_history::NOMINAL_TICK;
    use deckwatch_types::Vec3;

    const TICK: Duration = Duration::from_millis(100);

    fn ship(lift: f64, vy: f64) -> SimShip {
        SimShip::new(1000.0)
            .with_gravity(Vec3::new(0.0, -10.0, 0.0))
            .with_velocity(Vec3::new(0.0, vy, 0.0))
            .with_planet(70_000.0, 10_000.0)
            .with_thruster(SimThruster::new("lift", Vec3::new(0.0, 1.0, 0.0), lift))
    }

    fn advisor() -> Advisor {
        Advisor::new(AdvisorConfig::default())
    }

    #[test]
    fn renders_single_surface_panel() {
        let panel = SimPanel::new("lcd", "<Deckwatch>\nTWR: [TWR]\nHover: [CANHOVER]");
        let screens = panel.screens();
        let mut devices = SimRegistry::new().with_surface(panel).build();
        let a = advisor();

        let (state, report) = a.tick(
            AdvisorState::new(a.config()),
            &ship(30_000.0, 0.0),
            &ship(30_000.0, 0.0),
            &mut devices,
            TICK,
        );
        assert_eq!(screens.borrow()[0], "TWR: 3.00\nHover: Yes");
        assert_eq!(report.displays.len(), 1);
        assert_eq!(state.tick, 1);
        assert_eq!(report.severity, AlarmSeverity::Nominal);
    }

    #[test]
    fn multi_surface_device_needs_selector() {
        let unselected = SimPanel::with_surfaces("cockpit", "[TWR]", 3);
        let selected = SimPanel::with_surfaces("console", "[SURFACE=2][TWR]", 3);
        let out_of_range = SimPanel::with_surfaces("seat", "[SURFACE=4][TWR]", 3);
        let unselected_screens = unselected.screens();
        let selected_screens = selected.screens();
        let mut devices = SimRegistry::new()
            .with_surface(unselected)
            .with_surface(selected)
            .with_surface(out_of_range)
            .build();
        let a = advisor();
        let s = ship(30_000.0, 0.0);

        let (_, report) = a.tick(AdvisorState::new(a.config()), &s, &s, &mut devices, TICK);
        assert!(unselected_screens.borrow().iter().all(String::is_empty));
        assert_eq!(selected_screens.borrow()[1], "3.00");
        assert_eq!(report.displays.len(), 1);
        assert_eq!(report.displays[0].surface_index, 1);
    }

    #[test]
    fn selector_on_identifier_line_still_selects_surface() {
        let panel = SimPanel::with_surfaces("cockpit", "<Deckwatch> [SURFACE=2]\nTWR: [TWR]", 3);
        let screens = panel.screens();
        let mut devices = SimRegistry::new().with_surface(panel).build();
        let a = advisor();
        let s = ship(30_000.0, 0.0);

        let (_, report) = a.tick(AdvisorState::new(a.config()), &s, &s, &mut devices, TICK);
        assert_eq!(report.displays.len(), 1);
        assert_eq!(report.displays[0].surface_index, 1);
        let screens = screens.borrow();
        assert_eq!(screens[1], "TWR: 3.00");
        assert!(screens[0].is_empty() && screens[2].is_empty());
    }

    #[test]
    fn sensor_loss_renders_na_and_stays_quiet() {
        let panel = SimPanel::new("lcd", "[TWR] [SURFACE=1]");
        let screens = panel.screens();
        let light = SimLight::new("bay", "");
        let light_state = light.state();
        let sound = SimSound::new("siren");
        let sound_state = sound.state();
        let mut devices = SimRegistry::new()
            .with_surface(panel)
            .with_light(light)
            .with_sound(sound)
            .build();
        let a = advisor();
        let lost = ship(5_000.0, -50.0).without_controller();

        let (state, report) = a.tick(AdvisorState::new(a.config()), &lost, &lost, &mut devices, TICK);
        assert!(!report.sensors_available);
        assert_eq!(screens.borrow()[0], "N/A ");
        assert_eq!(light_state.borrow().color, LightColor::White);
        assert!(!report.alarm_active);
        assert_eq!(sound_state.borrow().plays, 0);
        assert_eq!(state.twr_history, TwrHistory::default());
    }

    #[test]
    fn falling_below_hard_deck_blinks_and_sounds() {
        let light = SimLight::new("bay", "");
        let light_state = light.state();
        let beacon = SimLight::new("beacon", "[ROTATING]");
        let beacon_state = beacon.state();
        let sound = SimSound::new("siren");
        let sound_state = sound.state();
        let mut devices = SimRegistry::new()
            .with_light(light)
            .with_light(beacon)
            .with_sound(sound)
            .build();
        let a = advisor();
        let falling = ship(9_000.0, -40.0);

        let (state, report) = a.tick(AdvisorState::new(a.config()), &falling, &falling, &mut devices, TICK);
        assert_eq!(report.severity, AlarmSeverity::Critical);
        assert!(report.alarm_sounded);
        {
            let light = light_state.borrow();
            assert_eq!(light.color, LightColor::Red);
            assert!((light.blink_interval - 2.0).abs() < f64::EPSILON);
        }
        {
            let beacon = beacon_state.borrow();
            assert_eq!(beacon.color, LightColor::Red);
            assert_eq!(beacon.blink_interval, 0.0);
            assert!(beacon.enabled);
        }
        {
            let sound = sound_state.borrow();
            assert_eq!(sound.plays, 1);
            assert!(sound.enabled);
            assert_eq!(sound.selected.as_deref(), Some("Alert 1"));
        }

        // Still falling: the pacer holds the next sound back.
        let (_, report) = a.tick(state, &falling, &falling, &mut devices, TICK);
        assert!(report.alarm_active);
        assert!(!report.alarm_sounded);
        assert_eq!(sound_state.borrow().plays, 1);
    }

    #[test]
    fn alarm_muted_when_sound_disabled() {
        let sound = SimSound::new("siren");
        let sound_state = sound.state();
        let mut devices = SimRegistry::new().with_sound(sound).build();
        let a = Advisor::new(AdvisorConfig {
            play_alert_sound: false,
            ..AdvisorConfig::default()
        });
        let falling = ship(9_000.0, -40.0);
        let (_, report) = a.tick(AdvisorState::new(a.config()), &falling, &falling, &mut devices, TICK);
        assert!(report.alarm_active);
        assert!(!report.alarm_sounded);
        assert_eq!(sound_state.borrow().plays, 0);
    }

    #[test]
    fn twr_rate_reported_from_second_descending_tick() {
        let mut devices = DeviceRegistry::new();
        let a = advisor();
        let first = ship(40_000.0, -20.0);
        let second = ship(35_000.0, -20.0);

        let (state, report) = a.tick(AdvisorState::new(a.config()), &first, &first, &mut devices, TICK);
        assert_eq!(report.twr_rate, None);
        let (_, report) = a.tick(state, &second, &second, &mut devices, TICK);
        let rate = report.twr_rate.unwrap();
        assert!((rate + 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_falls_back_to_nominal_tick() {
        let mut devices = DeviceRegistry::new();
        let a = advisor();
        let first = ship(40_000.0, -20.0);
        let second = ship(35_000.0, -20.0);

        let (state, _) = a.tick(AdvisorState::new(a.config()), &first, &first, &mut devices, Duration::ZERO);
        let (state, report) = a.tick(state, &second, &second, &mut devices, Duration::from_micros(50));
        let nominal = NOMINAL_TICK.as_secs_f64();
        assert_eq!(state.twr_history.last_interval_s, Some(nominal));
        let rate = report.twr_rate.unwrap();
        assert!((rate + 0.5 / nominal).abs() < 1e-6);
        assert!(rate.is_finite());
    }

    #[test]
    fn between_thresholds_descending_lights_orange() {
        let light = SimLight::new("bay", "");
        let light_state = light.state();
        let mut devices = SimRegistry::new().with_light(light).build();
        let a = advisor();
        let s = ship(15_000.0, -5.0);

        let (_, report) = a.tick(AdvisorState::new(a.config()), &s, &s, &mut devices, TICK);
        assert_eq!(report.severity, AlarmSeverity::Warning);
        assert_eq!(report.lights[0].rule, "descending_below_operational");
        assert_eq!(light_state.borrow().color, LightColor::Orange);
    }

    #[test]
    fn config_defaults_fill_partial_input() {
        let cfg: AdvisorConfig = serde_json::from_str(r#"{"operational_twr": 1.5}"#).unwrap();
        assert_eq!(cfg.operational_twr, 1.5);
        assert_eq!(cfg.identifier, "<Deckwatch>");
        assert_eq!(cfg.syntax.start, '[');
        assert_eq!(cfg.alarm_repeat_ticks, 15);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut devices = DeviceRegistry::new();
        let a = advisor();
        let s = ship(30_000.0, 0.0);
        let (_, report) = a.tick(AdvisorState::new(a.config()), &s, &s, &mut devices, TICK);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["severity"], "nominal");
        assert_eq!(json["tick"], 1);
    }
}
