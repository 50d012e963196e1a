//! `deckwatch-physics` – Flight Envelope Math
//!
//! Pure, stateless computations over one
//! [`ShipTelemetrySnapshot`][deckwatch_types::ShipTelemetrySnapshot].
//!
//! # Modules
//!
//! - [`gravity`] – [`GravityModel`][gravity::GravityModel]: hill-sphere +
//!   power-law falloff approximation and its inversion from a gravity
//!   magnitude to an altitude above sea level.
//! - [`feasibility`] – [`FlightFeasibility`][feasibility::FlightFeasibility]:
//!   thrust-to-weight ratio, net vertical acceleration, stopping distances
//!   and deck altitudes for a [`DeckThreshold`][feasibility::DeckThreshold].

pub mod feasibility;
pub mod gravity;

pub use feasibility::{
    DEFAULT_OPERATIONAL_TWR, DeckThreshold, EARTHLIKE_GRAVITY, FlightFeasibility, HARD_DECK_TWR,
    PERTRAM_GRAVITY,
};
pub use gravity::{GravityModel, GravitySample, Infeasible, PlanetBody};
