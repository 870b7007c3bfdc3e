//! Fixed-step explicit Euler advection of tracer particles.
//!
//! One call to [`iterate_particles`] advances the particles by
//! `setup.time_step`, split into `setup.substeps` equal Euler substeps.
//! Substep positions are scratch state; only the final positions are
//! published, as one new history snapshot.
//!
//! A particle whose sampled velocity is not finite (a singular point of some
//! contribution, e.g. the centre of a point vortex) is held in place for that
//! substep and its velocity is recorded as zero. The number of held samples
//! is reported back so callers can surface it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::flow::FlowField;
use crate::params::{param_f64, param_usize};
use crate::particles::ParticleSet;

/// Default duration of one outer step.
pub const DEFAULT_TIME_STEP: f64 = 0.05;
/// Default number of Euler substeps per outer step.
pub const DEFAULT_SUBSTEPS: usize = 4;

/// Step size and subdivision for a run. Immutable once a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimSetup {
    /// Time advanced per outer step.
    pub time_step: f64,
    /// Equal Euler substeps per outer step.
    #[serde(default = "default_substeps")]
    pub substeps: usize,
}

fn default_substeps() -> usize {
    DEFAULT_SUBSTEPS
}

impl Default for SimSetup {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            substeps: DEFAULT_SUBSTEPS,
        }
    }
}

impl SimSetup {
    /// Creates a validated setup.
    pub fn new(time_step: f64, substeps: usize) -> Result<Self, FlowError> {
        let setup = Self {
            time_step,
            substeps,
        };
        setup.validate()?;
        Ok(setup)
    }

    /// Extracts `time_step` and `substeps` from a JSON object, falling back to
    /// defaults for missing keys.
    pub fn from_json(params: &serde_json::Value) -> Self {
        Self {
            time_step: param_f64(params, "time_step", DEFAULT_TIME_STEP),
            substeps: param_usize(params, "substeps", DEFAULT_SUBSTEPS),
        }
    }

    /// Requires a positive finite `time_step` and at least one substep.
    pub fn validate(&self) -> Result<(), FlowError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(FlowError::Configuration(format!(
                "time_step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if self.substeps == 0 {
            return Err(FlowError::Configuration(
                "substeps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Duration of one Euler substep.
    pub fn substep_dt(&self) -> f64 {
        self.time_step / self.substeps as f64
    }
}

/// Outcome of one outer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Substeps executed.
    pub substeps: usize,
    /// Particle samples held in place because their velocity was not finite,
    /// summed over all substeps. Non-zero means a singularity was hit.
    pub held: usize,
}

impl StepReport {
    pub fn hit_singularity(&self) -> bool {
        self.held > 0
    }
}

/// Advances `particles` by one outer step through `flow`.
///
/// Returns `FlowError::NoFlowDefined` if `flow` is empty, or
/// `FlowError::Configuration` if `setup` is invalid; in both cases the
/// particle set is left untouched. Otherwise the step always completes,
/// holding any particle whose velocity cannot be sampled.
pub fn iterate_particles(
    particles: &mut ParticleSet,
    flow: &FlowField,
    setup: &SimSetup,
) -> Result<StepReport, FlowError> {
    if flow.is_empty() {
        return Err(FlowError::NoFlowDefined);
    }
    setup.validate()?;
    let dt = setup.substep_dt();
    let mut positions = particles.current().to_vec();
    let mut velocities = vec![DVec2::ZERO; positions.len()];
    let mut report = StepReport::default();

    for _ in 0..setup.substeps {
        velocities = flow.evaluate(&positions)?;
        for (p, v) in positions.iter_mut().zip(velocities.iter_mut()) {
            if v.is_finite() {
                *p += *v * dt;
            } else {
                *v = DVec2::ZERO;
                report.held += 1;
            }
        }
        report.substeps += 1;
    }

    if report.hit_singularity() {
        log::warn!(
            "held {} particle sample(s) at singular points of the flow",
            report.held
        );
    }
    particles.set_velocities(velocities);
    particles.push_snapshot(positions);
    Ok(report)
}
