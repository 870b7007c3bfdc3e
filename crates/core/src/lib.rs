#![deny(unsafe_code)]
//! Core types for dyeflow: steady 2-D flow field composition and explicit
//! Euler advection of dye tracer particles.
//!
//! Provides `FlowField` (superposed Cartesian, polar, vector, stream-function
//! and complex-potential contributions), `ParticleSet` (trajectory history
//! with shape groups), `SimSetup`/`iterate_particles` (fixed-step Euler with
//! substeps), the `Simulation` driver, `DyeShape` seeding, `Scenario`, and
//! parameter helpers.

pub mod coords;
pub mod dye;
pub mod error;
pub mod flow;
pub mod integrator;
pub mod params;
pub mod particles;
pub mod potential;
pub mod scenario;
pub mod simulation;

pub use coords::Polar;
pub use dye::{Dye, DyeShape};
pub use error::FlowError;
pub use flow::{FlowContribution, FlowField, PolarOffset, VectorSample};
pub use integrator::{iterate_particles, SimSetup, StepReport};
pub use particles::ParticleSet;
pub use scenario::Scenario;
pub use simulation::{RunReport, Simulation};
