//! Tracer particle state and position history.
//!
//! A [`ParticleSet`] owns N massless tracers: one position snapshot per
//! recorded step, the velocities sampled on the latest step, per-particle
//! masses, and the start index of every seeded dye shape. Snapshots are
//! appended whole, so the history never holds a partially written step.

use std::ops::Range;

use glam::DVec2;

use crate::error::FlowError;

/// Positions, velocities and history of a batch of tracer particles.
///
/// Index `i` of every per-particle buffer refers to the same particle.
/// The snapshot taken at creation is always kept as `history[0]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleSet {
    history: Vec<Vec<DVec2>>,
    velocities: Vec<DVec2>,
    masses: Vec<f64>,
    shape_starts: Vec<usize>,
    initial: Option<Vec<DVec2>>,
}

impl ParticleSet {
    /// Creates a set with no particles and no history.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-shape set from positions and per-particle masses.
    ///
    /// Velocities start at zero. Returns `FlowError::TypeMismatch` if the
    /// two buffers differ in length.
    pub fn new(positions: Vec<DVec2>, masses: Vec<f64>) -> Result<Self, FlowError> {
        if positions.len() != masses.len() {
            return Err(FlowError::TypeMismatch {
                expected: format!("{} masses", positions.len()),
                got: format!("{} masses", masses.len()),
            });
        }
        if positions.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self {
            velocities: vec![DVec2::ZERO; positions.len()],
            history: vec![positions],
            masses,
            shape_starts: vec![0],
            initial: None,
        })
    }

    /// Creates a single-shape set where every particle has the same mass.
    pub fn from_positions(positions: Vec<DVec2>, mass: f64) -> Self {
        let masses = vec![mass; positions.len()];
        if positions.is_empty() {
            return Self::empty();
        }
        Self {
            velocities: vec![DVec2::ZERO; positions.len()],
            history: vec![positions],
            masses,
            shape_starts: vec![0],
            initial: None,
        }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Latest position snapshot.
    pub fn current(&self) -> &[DVec2] {
        self.history.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// All recorded snapshots, oldest first.
    pub fn history(&self) -> &[Vec<DVec2>] {
        &self.history
    }

    pub fn snapshot(&self, index: usize) -> Option<&[DVec2]> {
        self.history.get(index).map(Vec::as_slice)
    }

    pub fn snapshot_count(&self) -> usize {
        self.history.len()
    }

    /// Velocities sampled on the most recent integration substep.
    pub fn velocities(&self) -> &[DVec2] {
        &self.velocities
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// First particle index of every seeded shape, ascending.
    pub fn shape_starts(&self) -> &[usize] {
        &self.shape_starts
    }

    /// Particle index range of every seeded shape, for grouped rendering.
    pub fn shape_ranges(&self) -> Vec<Range<usize>> {
        self.shape_starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = self.shape_starts.get(i + 1).copied().unwrap_or(self.len());
                start..end
            })
            .collect()
    }

    /// Records the current snapshot as the reference for before/after
    /// comparisons. Calling it again replaces the reference.
    pub fn mark_initial(&mut self) {
        self.initial = Some(self.current().to_vec());
    }

    /// The reference set by [`mark_initial`](Self::mark_initial), or the
    /// creation snapshot if it was never called.
    pub fn initial_positions(&self) -> &[DVec2] {
        match &self.initial {
            Some(initial) => initial,
            None => self.history.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Positions at a fractional snapshot index, linearly interpolated.
    ///
    /// With `frac = t - floor(t)` the result is
    /// `history[floor] * (1 - frac) + history[ceil] * frac`, so the weight of
    /// the later snapshot grows with `frac`.
    ///
    /// Returns `FlowError::OutOfRange` if `t` is negative, NaN, or beyond the
    /// last recorded snapshot.
    pub fn position_at_time(&self, t: f64) -> Result<Vec<DVec2>, FlowError> {
        let last = self.history.len().checked_sub(1);
        let in_range = matches!(last, Some(last) if t >= 0.0 && t <= last as f64);
        if !in_range {
            return Err(FlowError::OutOfRange {
                requested: t,
                available: self.history.len(),
            });
        }
        let lo = t.floor() as usize;
        let hi = t.ceil() as usize;
        let frac = t - t.floor();
        Ok(self.history[lo]
            .iter()
            .zip(&self.history[hi])
            .map(|(&a, &b)| a * (1.0 - frac) + b * frac)
            .collect())
    }

    /// Concatenates `other` after `self` along the particle axis.
    ///
    /// An empty operand is the identity: the other operand is returned
    /// unchanged. Otherwise both sets must hold the same number of
    /// snapshots; each snapshot index is concatenated, and `other`'s shape
    /// starts are shifted by `self.len()`.
    ///
    /// The shift is the particle count of `self`, not its number of shapes,
    /// so every entry of [`shape_starts`](Self::shape_starts) stays a
    /// particle index.
    ///
    /// Returns `FlowError::TypeMismatch` if the snapshot counts differ.
    pub fn merge(mut self, other: ParticleSet) -> Result<ParticleSet, FlowError> {
        self.merge_in(other)?;
        Ok(self)
    }

    /// In-place form of [`merge`](Self::merge). On error `self` is unchanged.
    pub fn merge_in(&mut self, other: ParticleSet) -> Result<(), FlowError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.history.len() != other.history.len() {
            return Err(FlowError::TypeMismatch {
                expected: format!("{} snapshot(s)", self.history.len()),
                got: format!("{} snapshot(s)", other.history.len()),
            });
        }

        // Keep the reference aligned with the particle axis.
        let initial = (self.initial.is_some() || other.initial.is_some()).then(|| {
            let mut initial = self.initial_positions().to_vec();
            initial.extend_from_slice(other.initial_positions());
            initial
        });

        let shift = self.len();
        for (mine, theirs) in self.history.iter_mut().zip(other.history) {
            mine.extend(theirs);
        }
        self.velocities.extend(other.velocities);
        self.masses.extend(other.masses);
        self.shape_starts
            .extend(other.shape_starts.into_iter().map(|s| s + shift));
        if initial.is_some() {
            self.initial = initial;
        }
        Ok(())
    }

    /// Overwrites the current velocities. Length must equal `len()`.
    pub(crate) fn set_velocities(&mut self, velocities: Vec<DVec2>) {
        debug_assert_eq!(velocities.len(), self.len());
        self.velocities = velocities;
    }

    /// Publishes a complete snapshot. Length must equal `len()`.
    pub(crate) fn push_snapshot(&mut self, positions: Vec<DVec2>) {
        debug_assert_eq!(positions.len(), self.len());
        self.history.push(positions);
    }
}
