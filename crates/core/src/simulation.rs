//! The simulation driver: owns a flow, a particle set and a setup, and
//! advances the particles a whole number of outer steps at a time.

use crate::error::FlowError;
use crate::flow::FlowField;
use crate::integrator::{iterate_particles, SimSetup, StepReport};
use crate::particles::ParticleSet;

/// Totals over every outer step run so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Outer steps completed.
    pub steps: usize,
    /// Particle samples held at singular points, see [`StepReport::held`].
    pub held: usize,
}

impl RunReport {
    fn record(&mut self, step: StepReport) {
        self.steps += 1;
        self.held += step.held;
    }
}

/// Drives explicit Euler advection of a [`ParticleSet`] through a
/// [`FlowField`].
///
/// The flow and setup are fixed at construction. The particle set is
/// exclusively owned here; read it through [`particles`](Self::particles)
/// between calls to [`iterate`](Self::iterate).
#[derive(Debug)]
pub struct Simulation {
    setup: SimSetup,
    flow: FlowField,
    particles: ParticleSet,
    report: RunReport,
}

impl Simulation {
    /// Validates `setup` and marks the particles' current positions as the
    /// initial reference.
    pub fn new(
        setup: SimSetup,
        flow: FlowField,
        mut particles: ParticleSet,
    ) -> Result<Self, FlowError> {
        setup.validate()?;
        particles.mark_initial();
        log::debug!(
            "simulation ready: {} particle(s), {:?}, dt = {} in {} substep(s)",
            particles.len(),
            flow.counts(),
            setup.time_step,
            setup.substeps
        );
        Ok(Self {
            setup,
            flow,
            particles,
            report: RunReport::default(),
        })
    }

    /// Runs `num_iter` outer steps, each appending one history snapshot.
    ///
    /// Stops at the first failing step and returns its error; steps
    /// completed before it stay recorded.
    pub fn iterate(&mut self, num_iter: usize) -> Result<RunReport, FlowError> {
        let mut run = RunReport::default();
        for _ in 0..num_iter {
            let step = iterate_particles(&mut self.particles, &self.flow, &self.setup)?;
            run.record(step);
            self.report.record(step);
            log::debug!(
                "step {} done at t = {:.6} ({} held)",
                self.report.steps,
                self.elapsed(),
                step.held
            );
        }
        Ok(run)
    }

    pub fn setup(&self) -> &SimSetup {
        &self.setup
    }

    pub fn flow(&self) -> &FlowField {
        &self.flow
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Simulated time covered so far: completed steps times `time_step`.
    pub fn elapsed(&self) -> f64 {
        self.report.steps as f64 * self.setup.time_step
    }

    /// Totals since construction.
    pub fn report(&self) -> RunReport {
        self.report
    }

    pub fn into_particles(self) -> ParticleSet {
        self.particles
    }
}
