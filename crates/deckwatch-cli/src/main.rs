//! `deckwatch` – flight-envelope advisor demo.
//!
//! Drives the advisor against a simulated powered descent:
//!
//! 1. Loads `~/.deckwatch/config.toml` (or `--config <path>`), falling back
//!    to defaults when the file is absent.
//! 2. Builds the descent scenario and the bridge devices from the
//!    simulation drivers.
//! 3. Ticks the advisor, printing rendered displays colored by severity or
//!    one JSON tick report per line.
//! 4. Stops on touchdown, after `--ticks`, or on **Ctrl-C**.

mod config;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use deckwatch_runtime::status::running_indicator;
use deckwatch_runtime::advisor::LightReport;
use deckwatch_runtime::{Advisor, AdvisorState, TickReport, init_tracing};
use deckwatch_types::{AdvisorError, AlarmSeverity};
use tracing::{info, warn};

use crate::config::Config;
use crate::scenario::{DescentScenario, bridge_devices};

#[derive(Parser, Debug)]
#[command(
    name = "deckwatch",
    about = "Flight-envelope advisor running against a simulated descent",
    version
)]
struct Cli {
    /// Config file to use instead of ~/.deckwatch/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fly the descent scenario, ticking the advisor until touchdown.
    Run {
        /// Stop after this many ticks.
        #[arg(long, default_value_t = 12_000)]
        ticks: u64,

        /// Cargo mass added to the ship, in kg.
        #[arg(long)]
        cargo_kg: Option<f64>,

        /// Emit one JSON tick report per line instead of displays.
        #[arg(long)]
        json: bool,

        /// Sleep one tick interval between ticks.
        #[arg(long)]
        realtime: bool,
    },
    /// Evaluate a single tick at the start of the scenario.
    Once {
        #[arg(long)]
        cargo_kg: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config::config_path);

    if let Command::InitConfig { force } = cli.command {
        return init_config(&path, force);
    }

    let cfg = effective_config(config::load_from(&path));

    // ── Structured logging ────────────────────────────────────────────────
    // Logs go to stdout alongside the readouts; keep RUST_LOG at warn for a
    // clean display.
    let telemetry = init_tracing("deckwatch", cfg.log_format);
    info!(
        config = %path.display(),
        otlp = telemetry.exports_spans(),
        "deckwatch starting"
    );

    match cli.command {
        Command::Run {
            ticks,
            cargo_kg,
            json,
            realtime,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                flag.store(true, Ordering::SeqCst);
            }) {
                warn!(error = %e, "failed to install Ctrl-C handler; stop with --ticks instead");
            }
            run(&cfg, ticks, cargo_kg, json, realtime, &shutdown);
        }
        Command::Once { cargo_kg, json } => once(&cfg, cargo_kg, json),
        Command::InitConfig { .. } => {}
    }
    ExitCode::SUCCESS
}

/// The loaded file, or defaults with `DECKWATCH_*` overrides when the file is
/// missing or unreadable.
fn effective_config(loaded: Result<Option<Config>, AdvisorError>) -> Config {
    match loaded {
        Ok(Some(cfg)) => cfg,
        Ok(None) => config::default_with_env_overrides(),
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            eprintln!("  Using default configuration.");
            config::default_with_env_overrides()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn init_config(path: &std::path::Path, force: bool) -> ExitCode {
    if path.exists() && !force {
        eprintln!(
            "{} {} already exists; pass --force to overwrite.",
            "✗".red().bold(),
            path.display().to_string().bold()
        );
        return ExitCode::FAILURE;
    }
    match config::save_to(&Config::default(), path) {
        Ok(()) => {
            println!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn build_scenario(cfg: &Config, cargo_kg: Option<f64>) -> DescentScenario {
    let mut scenario_cfg = cfg.scenario.clone();
    if let Some(cargo) = cargo_kg {
        scenario_cfg.cargo_kg = cargo.max(0.0);
    }
    DescentScenario::new(scenario_cfg, cfg.advisor.gravity)
}

fn run(
    cfg: &Config,
    ticks: u64,
    cargo_kg: Option<f64>,
    json: bool,
    realtime: bool,
    shutdown: &AtomicBool,
) {
    let advisor = Advisor::new(cfg.advisor.clone());
    let mut devices = bridge_devices(&cfg.advisor.identifier);
    let mut scenario = build_scenario(cfg, cargo_kg);
    let dt = Duration::from_millis(cfg.tick_interval_ms.max(1));
    let print_every = cfg.print_every.max(1);

    if !json {
        print_banner();
    }

    let mut state = AdvisorState::new(advisor.config());
    for _ in 0..ticks {
        if shutdown.load(Ordering::SeqCst) {
            if !json {
                println!("{}", "\n  ⚠  Ctrl-C received – stopping.".yellow().bold());
            }
            break;
        }

        let previous = state.severity;
        let (next, report) = advisor.tick(state, scenario.ship(), scenario.ship(), &mut devices, dt);
        state = next;

        let landed = scenario.landed();
        if json {
            print_json(&report);
        } else if landed || report.severity != previous || report.tick % print_every == 1 {
            print_report(&report, &scenario);
        }
        if landed {
            if !json {
                println!(
                    "  {} Touchdown after {:.1} s.",
                    "✓".green().bold(),
                    scenario.elapsed().as_secs_f64()
                );
            }
            break;
        }

        scenario.step(dt);
        if realtime {
            std::thread::sleep(dt);
        }
    }
    info!(ticks = state.tick, "deckwatch stopped");
}

fn once(cfg: &Config, cargo_kg: Option<f64>, json: bool) {
    let advisor = Advisor::new(cfg.advisor.clone());
    let mut devices = bridge_devices(&cfg.advisor.identifier);
    let scenario = build_scenario(cfg, cargo_kg);
    let dt = Duration::from_millis(cfg.tick_interval_ms.max(1));

    let state = AdvisorState::new(advisor.config());
    let (_, report) = advisor.tick(state, scenario.ship(), scenario.ship(), &mut devices, dt);
    if json {
        print_json(&report);
    } else {
        print_report(&report, &scenario);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_json(report: &TickReport) {
    match serde_json::to_string(report) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(tick = report.tick, error = %e, "failed to serialize tick report"),
    }
}

fn print_report(report: &TickReport, scenario: &DescentScenario) {
    println!(
        "{}  t+{:>6.1}s  alt {:>8.1} m  v {:>7.1} m/s  {}{}",
        running_indicator(report.tick).dimmed(),
        scenario.elapsed().as_secs_f64(),
        scenario.altitude(),
        scenario.vertical_speed(),
        severity_label(report.severity),
        if report.alarm_sounded { "  ♪".red().bold().to_string() } else { String::new() },
    );
    for display in &report.displays {
        println!(
            "  {} {}",
            format!("{}#{}", display.surface_id, display.surface_index + 1).bold(),
            "─".repeat(24).dimmed()
        );
        for line in display.text.lines() {
            println!("    {}", colorize(line, report.severity));
        }
    }
    if !report.lights.is_empty() {
        let lamps: Vec<String> = report
            .lights
            .iter()
            .map(|light| format!("{} {}", light_lamp(light), light.light_id.dimmed()))
            .collect();
        println!("  {}", lamps.join("  "));
    }
    println!();
}

/// Lamp glyph in the light's own color; hollow when switched off.
fn light_lamp(light: &LightReport) -> ColoredString {
    if !light.policy.enabled {
        return "○".dimmed();
    }
    let (r, g, b) = light.policy.color.rgb();
    let glyph = if light.policy.blinking { "◉" } else { "●" };
    glyph.truecolor(r, g, b)
}

fn severity_label(severity: AlarmSeverity) -> ColoredString {
    colorize(&severity.to_string().to_uppercase(), severity).bold()
}

fn colorize(text: &str, severity: AlarmSeverity) -> ColoredString {
    match severity {
        AlarmSeverity::Nominal => text.green(),
        AlarmSeverity::Caution => text.yellow(),
        AlarmSeverity::Warning => text.truecolor(255, 140, 0),
        AlarmSeverity::Critical => text.red(),
    }
}

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "Deckwatch".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Flight-envelope advisor – simulated descent");
    println!();
}
