//! Serializable description of a complete run.
//!
//! A [`Scenario`] names a flow preset and its parameters, the step setup,
//! the dye shapes to seed, and how many outer steps to run. Closures cannot
//! be serialized, so the flow itself is rebuilt from the preset name by a
//! registry such as `dyeflow-presets`.

use serde::{Deserialize, Serialize};

use crate::dye::{Dye, DyeShape};
use crate::error::FlowError;
use crate::integrator::SimSetup;
use crate::particles::ParticleSet;

/// Outer steps run when a scenario does not say.
pub const DEFAULT_ITERATIONS: usize = 20;

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Everything needed to reproduce a run, apart from the flow registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub preset: String,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    #[serde(default)]
    pub setup: SimSetup,
    #[serde(default)]
    pub dye: Vec<DyeShape>,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Scenario {
    /// Creates a scenario with default params (`{}`), setup, no dye, and
    /// [`DEFAULT_ITERATIONS`] steps.
    pub fn new(preset: &str) -> Self {
        Self {
            preset: preset.to_string(),
            params: empty_params(),
            setup: SimSetup::default(),
            dye: Vec::new(),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Validates the setup and that every dye shape can be seeded.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.preset.trim().is_empty() {
            return Err(FlowError::Configuration("scenario names no preset".into()));
        }
        self.setup.validate()?;
        self.dye.iter().try_for_each(|shape| shape.seed().map(drop))
    }

    /// Seeds all dye shapes, in order, into one particle set.
    pub fn particles(&self) -> Result<ParticleSet, FlowError> {
        Dye::from_shapes(&self.dye).map(Dye::into_particles)
    }
}
