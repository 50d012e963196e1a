//! `deckwatch-hal` – Device Capability Layer
//!
//! Everything outside the advisory core is reached through the capability
//! traits in this crate.  The core never branches on device type; it only
//! talks to:
//!
//! - [`sensor`] – [`SensorPort`], [`ThrustSource`] and [`PlanetGeometryPort`]:
//!   the per-tick telemetry inputs, folded into a
//!   [`ShipTelemetrySnapshot`][deckwatch_types::ShipTelemetrySnapshot] by
//!   [`capture_snapshot`].
//! - [`surface`] – [`TextSurface`]: any device with one or more text surfaces
//!   and a template.
//! - [`light`] – [`LightActuator`]: any color/blink-capable light.
//! - [`sound`] – [`SoundActuator`]: any alert sound emitter.
//! - [`registry`] – [`DeviceRegistry`]: stores the drivers by id and
//!   dispatches [`ActuatorCommand`][deckwatch_types::ActuatorCommand]s.
//! - [`sim`] – in-process simulated drivers for tests and the demo CLI.

pub mod light;
pub mod registry;
pub mod sensor;
pub mod sim;
pub mod sound;
pub mod surface;

pub use light::LightActuator;
pub use registry::{DeviceRegistry, LightTarget, SurfaceTarget};
pub use sensor::{PlanetGeometryPort, SensorPort, ThrustSource, capture_snapshot};
pub use sound::SoundActuator;
pub use surface::TextSurface;
