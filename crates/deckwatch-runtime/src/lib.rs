//! `deckwatch-runtime` – Tick Pipeline
//!
//! Wires the telemetry ports, the physics and the decision kernel into one
//! per-tick evaluation, and renders the results onto the registered devices.
//!
//! # Modules
//!
//! - [`template`] – bracket-token parsing and rendering
//!   ([`render`][template::render], [`extract_tokens`][template::extract_tokens]).
//! - [`resolver`] – [`AdvisoryResolver`][resolver::AdvisoryResolver]: turns
//!   tokens into display strings from live flight data.
//! - [`advisor`] – [`Advisor`][advisor::Advisor]: the tick pipeline and its
//!   [`AdvisorConfig`][advisor::AdvisorConfig].
//! - [`status`] – the spinning "Running…" indicator.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP span export.

pub mod advisor;
pub mod resolver;
pub mod status;
pub mod telemetry;
pub mod template;

pub use advisor::{Advisor, AdvisorConfig, AdvisorState, TickReport};
pub use resolver::{AdvisoryResolver, UnavailableResolver};
pub use telemetry::{LogFormat, TelemetryGuard, init_tracing};
pub use template::{TemplateSyntax, Token, TokenResolver, extract_tokens, render};
