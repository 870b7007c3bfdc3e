//! Composable steady 2D velocity fields.
//!
//! A [`FlowField`] is a superposition of [`FlowContribution`]s, each
//! expressed in whichever coordinates are most natural for it: a Cartesian
//! component pair, a polar component pair, or a coordinate-free vector
//! function that sees both bases at once. Contributions are kept in one
//! ordered list per kind and summed at evaluation time. Summation is
//! commutative, so insertion order never changes the result beyond
//! floating-point rounding.
//!
//! Stream functions and complex potentials are reduced to Cartesian pairs by
//! the builders in [`crate::potential`].

use std::fmt;

use glam::DVec2;

use crate::coords::{polar_velocity_in_basis, to_polar, Polar};
use crate::error::FlowError;

/// Distances below this are treated as the pole when building unit vectors.
pub const SINGULARITY_EPS: f64 = 1e-10;

/// A scalar function of two coordinates: `(x, y)` or `(r, theta)`.
pub type ScalarFn = Box<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// A coordinate-free velocity function.
pub type VectorFn = Box<dyn Fn(&VectorSample) -> DVec2 + Send + Sync>;

/// Everything a coordinate-free contribution may need about a sample point:
/// both coordinate tuples and both sets of unit basis vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorSample {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub theta: f64,
    pub x_hat: DVec2,
    pub y_hat: DVec2,
    /// Radial unit vector; zero at the pole.
    pub r_hat: DVec2,
    /// Counter-clockwise tangential unit vector; zero at the pole.
    pub theta_hat: DVec2,
}

impl VectorSample {
    /// Builds the sample for point `p`.
    pub fn at(p: DVec2) -> Self {
        Self::with_polar(p, to_polar(p))
    }

    fn with_polar(p: DVec2, polar: Polar) -> Self {
        let (r_hat, theta_hat) = if polar.r < SINGULARITY_EPS {
            (DVec2::ZERO, DVec2::ZERO)
        } else {
            (p / polar.r, DVec2::new(-p.y, p.x) / polar.r)
        };
        Self {
            x: p.x,
            y: p.y,
            r: polar.r,
            theta: polar.theta,
            x_hat: DVec2::X,
            y_hat: DVec2::Y,
            r_hat,
            theta_hat,
        }
    }
}

/// How a polar contribution is translated away from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PolarOffset {
    #[default]
    None,
    /// Translate the centre in the plane. The contribution sees the polar
    /// coordinates of the query point relative to this centre and its
    /// velocity is resolved in that translated frame.
    Cartesian(DVec2),
    /// Subtract directly from `(r, theta)` before calling the functions.
    Polar(Polar),
}

/// `(vx(x, y), vy(x, y))` evaluated at the query point minus `offset`.
pub struct CartesianFlow {
    pub vx: ScalarFn,
    pub vy: ScalarFn,
    pub offset: DVec2,
}

/// `(vr(r, theta), vtheta(r, theta))`, converted to Cartesian components.
pub struct PolarFlow {
    pub vr: ScalarFn,
    pub vtheta: ScalarFn,
    pub offset: PolarOffset,
}

/// Coordinate-free velocity evaluated at the query point minus `offset`.
pub struct VectorFlow {
    pub v: VectorFn,
    pub offset: DVec2,
}

/// One term of a [`FlowField`] superposition, tagged by coordinate kind.
pub enum FlowContribution {
    Cartesian(CartesianFlow),
    Polar(PolarFlow),
    Vector(VectorFlow),
}

impl CartesianFlow {
    fn velocity_at(&self, p: DVec2) -> DVec2 {
        let q = p - self.offset;
        DVec2::new((self.vx)(q.x, q.y), (self.vy)(q.x, q.y))
    }
}

impl PolarFlow {
    fn velocity_at(&self, p: DVec2, polar: Polar) -> DVec2 {
        match self.offset {
            PolarOffset::None => {
                let vr = (self.vr)(polar.r, polar.theta);
                let vtheta = (self.vtheta)(polar.r, polar.theta);
                polar_velocity_in_basis(polar, vr, vtheta)
            }
            PolarOffset::Cartesian(centre) => {
                let local = to_polar(p - centre);
                let vr = (self.vr)(local.r, local.theta);
                let vtheta = (self.vtheta)(local.r, local.theta);
                polar_velocity_in_basis(local, vr, vtheta)
            }
            PolarOffset::Polar(off) => {
                let r = polar.r - off.r;
                let theta = polar.theta - off.theta;
                let vr = (self.vr)(r, theta);
                let vtheta = (self.vtheta)(r, theta);
                polar_velocity_in_basis(polar, vr, vtheta)
            }
        }
    }
}

impl VectorFlow {
    fn velocity_at(&self, p: DVec2) -> DVec2 {
        (self.v)(&VectorSample::at(p - self.offset))
    }
}

/// Number of contributions of each kind in a [`FlowField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContributionCounts {
    pub cartesian: usize,
    pub polar: usize,
    pub vector: usize,
}

/// A superposition of velocity contributions.
///
/// Build it once with the `add_*` methods, then hand it to a
/// [`Simulation`](crate::simulation::Simulation), which only ever reads it.
#[derive(Default)]
pub struct FlowField {
    cartesian: Vec<CartesianFlow>,
    polar: Vec<PolarFlow>,
    vector: Vec<VectorFlow>,
}

impl FlowField {
    /// Creates a field with no contributions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pre-built contribution, dispatching on its tag.
    pub fn push(&mut self, contribution: FlowContribution) -> &mut Self {
        match contribution {
            FlowContribution::Cartesian(c) => self.cartesian.push(c),
            FlowContribution::Polar(c) => self.polar.push(c),
            FlowContribution::Vector(c) => self.vector.push(c),
        }
        self
    }

    /// Adds a Cartesian component pair, optionally translated by `offset`.
    pub fn add_cartesian<Fx, Fy>(&mut self, vx: Fx, vy: Fy, offset: Option<DVec2>) -> &mut Self
    where
        Fx: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        Fy: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.push(FlowContribution::Cartesian(CartesianFlow {
            vx: Box::new(vx),
            vy: Box::new(vy),
            offset: offset.unwrap_or(DVec2::ZERO),
        }))
    }

    /// Adds a polar component pair. `vtheta` is an angular rate.
    ///
    /// At most one of `offset_cartesian` / `offset_polar` may be given;
    /// passing both returns `FlowError::Configuration` and leaves the field
    /// unchanged.
    pub fn add_polar<Fr, Ft>(
        &mut self,
        vr: Fr,
        vtheta: Ft,
        offset_cartesian: Option<DVec2>,
        offset_polar: Option<Polar>,
    ) -> Result<&mut Self, FlowError>
    where
        Fr: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        Ft: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        let offset = match (offset_cartesian, offset_polar) {
            (Some(_), Some(_)) => {
                return Err(FlowError::Configuration(
                    "polar contribution accepts a Cartesian offset or a polar offset, not both"
                        .into(),
                ))
            }
            (Some(c), None) => PolarOffset::Cartesian(c),
            (None, Some(p)) => PolarOffset::Polar(p),
            (None, None) => PolarOffset::None,
        };
        Ok(self.push(FlowContribution::Polar(PolarFlow {
            vr: Box::new(vr),
            vtheta: Box::new(vtheta),
            offset,
        })))
    }

    /// Adds a coordinate-free contribution, optionally translated by `offset`.
    pub fn add_vector_field<F>(&mut self, v: F, offset: Option<DVec2>) -> &mut Self
    where
        F: Fn(&VectorSample) -> DVec2 + Send + Sync + 'static,
    {
        self.push(FlowContribution::Vector(VectorFlow {
            v: Box::new(v),
            offset: offset.unwrap_or(DVec2::ZERO),
        }))
    }

    /// Total number of contributions.
    pub fn len(&self) -> usize {
        self.cartesian.len() + self.polar.len() + self.vector.len()
    }

    /// True when no contribution has been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> ContributionCounts {
        ContributionCounts {
            cartesian: self.cartesian.len(),
            polar: self.polar.len(),
            vector: self.vector.len(),
        }
    }

    /// Samples the velocity at every position.
    ///
    /// The output is index-aligned with `positions`. Contributions may
    /// produce non-finite values where their functions are singular; the
    /// integrator decides what to do with those.
    ///
    /// Returns `FlowError::NoFlowDefined` if the field is empty.
    pub fn evaluate(&self, positions: &[DVec2]) -> Result<Vec<DVec2>, FlowError> {
        if self.is_empty() {
            return Err(FlowError::NoFlowDefined);
        }
        Ok(positions.iter().map(|&p| self.velocity_at(p)).collect())
    }

    /// Single-point form of [`evaluate`](Self::evaluate), for background
    /// sampling on an external grid.
    pub fn evaluate_at(&self, p: DVec2) -> Result<DVec2, FlowError> {
        if self.is_empty() {
            return Err(FlowError::NoFlowDefined);
        }
        Ok(self.velocity_at(p))
    }

    fn velocity_at(&self, p: DVec2) -> DVec2 {
        let polar = to_polar(p);
        let cartesian: DVec2 = self.cartesian.iter().map(|c| c.velocity_at(p)).sum();
        let polar_sum: DVec2 = self.polar.iter().map(|c| c.velocity_at(p, polar)).sum();
        let vector: DVec2 = self.vector.iter().map(|c| c.velocity_at(p)).sum();
        cartesian + polar_sum + vector
    }
}

impl fmt::Debug for FlowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowField")
            .field("cartesian", &self.cartesian.len())
            .field("polar", &self.polar.len())
            .field("vector", &self.vector.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const TOL: f64 = 1e-12;

    fn assert_close(a: DVec2, b: DVec2, tol: f64) {
        assert!(
            (a - b).length() < tol,
            "expected {b:?}, got {a:?} (tolerance {tol})"
        );
    }

    fn sample_points() -> Vec<DVec2> {
        vec![
            DVec2::new(1.0, 0.0),
            DVec2::new(-0.5, 2.0),
            DVec2::new(-3.0, -1.5),
            DVec2::new(0.25, -0.75),
        ]
    }

    // -- Empty field --

    #[test]
    fn empty_field_fails_with_no_flow_defined() {
        let flow = FlowField::new();
        let result = flow.evaluate(&sample_points());
        assert!(matches!(result, Err(FlowError::NoFlowDefined)));
        assert!(matches!(
            flow.evaluate_at(DVec2::ZERO),
            Err(FlowError::NoFlowDefined)
        ));
    }

    #[test]
    fn empty_positions_evaluate_to_empty_velocities() {
        let mut flow = FlowField::new();
        flow.add_cartesian(|_, _| 1.0, |_, _| 0.0, None);
        assert!(flow.evaluate(&[]).unwrap().is_empty());
    }

    // -- Cartesian --

    #[test]
    fn cartesian_contribution_samples_components() {
        let mut flow = FlowField::new();
        flow.add_cartesian(|x, _| -x, |_, y| y, None);
        let v = flow.evaluate_at(DVec2::new(2.0, 3.0)).unwrap();
        assert_close(v, DVec2::new(-2.0, 3.0), TOL);
    }

    #[test]
    fn cartesian_offset_translates_the_arguments() {
        let mut flow = FlowField::new();
        flow.add_cartesian(|x, _| x, |_, y| y, Some(DVec2::new(0.5, 0.5)));
        let v = flow.evaluate_at(DVec2::new(0.5, 0.5)).unwrap();
        assert_close(v, DVec2::ZERO, TOL);
        let v = flow.evaluate_at(DVec2::new(1.5, -0.5)).unwrap();
        assert_close(v, DVec2::new(1.0, -1.0), TOL);
    }

    // -- Polar --

    #[test]
    fn polar_rigid_rotation_is_tangential() {
        let mut flow = FlowField::new();
        flow.add_polar(|_, _| 0.0, |_, _| 1.0, None, None).unwrap();
        let v = flow.evaluate_at(DVec2::new(0.0, 2.0)).unwrap();
        assert_close(v, DVec2::new(-2.0, 0.0), TOL);
    }

    #[test]
    fn polar_functions_receive_atan2_angle() {
        let mut flow = FlowField::new();
        // vr reports theta back so the angle handed over can be inspected.
        flow.add_polar(|_, theta| theta, |_, _| 0.0, None, None)
            .unwrap();
        let p = DVec2::new(-1.0, -1.0);
        let v = flow.evaluate_at(p).unwrap();
        let theta = -3.0 * std::f64::consts::FRAC_PI_4;
        let expected = DVec2::new(theta.cos(), theta.sin()) * theta;
        assert_close(v, expected, 1e-12);
    }

    #[test]
    fn polar_with_both_offsets_is_configuration_error() {
        let mut flow = FlowField::new();
        let result = flow.add_polar(
            |_, _| 0.0,
            |_, _| 1.0,
            Some(DVec2::new(1.0, 0.0)),
            Some(Polar::new(1.0, 0.0)),
        );
        assert!(matches!(result, Err(FlowError::Configuration(_))));
        assert!(flow.is_empty(), "rejected contribution must not be stored");
    }

    #[test]
    fn polar_cartesian_offset_rotates_about_its_centre() {
        let mut flow = FlowField::new();
        let centre = DVec2::new(2.0, 1.0);
        flow.add_polar(|_, _| 0.0, |_, _| 1.0, Some(centre), None)
            .unwrap();
        assert_close(flow.evaluate_at(centre).unwrap(), DVec2::ZERO, TOL);
        // One unit to the right of the centre moves straight up.
        let v = flow.evaluate_at(centre + DVec2::X).unwrap();
        assert_close(v, DVec2::new(0.0, 1.0), TOL);
    }

    #[test]
    fn polar_offset_subtracts_from_r_and_theta() {
        let mut flow = FlowField::new();
        // vr = r - 1 after offset, so vr vanishes on the circle r = 2.
        flow.add_polar(
            |r, _| r - 1.0,
            |_, theta| theta,
            None,
            Some(Polar::new(1.0, FRAC_PI_2)),
        )
        .unwrap();
        // At (2, 0): shifted r = 1, shifted theta = -pi/2.
        let v = flow.evaluate_at(DVec2::new(2.0, 0.0)).unwrap();
        assert_close(v, DVec2::new(0.0, 2.0 * -FRAC_PI_2), 1e-12);
    }

    // -- Vector --

    #[test]
    fn vector_field_receives_both_bases() {
        let mut flow = FlowField::new();
        flow.add_vector_field(|s| s.theta_hat * s.r, None);
        let v = flow.evaluate_at(DVec2::new(3.0, 0.0)).unwrap();
        assert_close(v, DVec2::new(0.0, 3.0), TOL);
    }

    #[test]
    fn vector_sample_unit_vectors_are_normalised() {
        let s = VectorSample::at(DVec2::new(3.0, 4.0));
        assert!((s.r - 5.0).abs() < TOL);
        assert!((s.r_hat.length() - 1.0).abs() < TOL);
        assert!((s.theta_hat.length() - 1.0).abs() < TOL);
        assert!(s.r_hat.dot(s.theta_hat).abs() < TOL);
        assert_eq!(s.x_hat, DVec2::X);
        assert_eq!(s.y_hat, DVec2::Y);
    }

    #[test]
    fn vector_sample_basis_is_zero_at_pole() {
        let s = VectorSample::at(DVec2::ZERO);
        assert_eq!(s.r_hat, DVec2::ZERO);
        assert_eq!(s.theta_hat, DVec2::ZERO);
    }

    #[test]
    fn vector_offset_translates_sample() {
        let mut flow = FlowField::new();
        flow.add_vector_field(|s| s.r_hat, Some(DVec2::new(-1.0, 0.0)));
        let v = flow.evaluate_at(DVec2::new(-1.0, 2.0)).unwrap();
        assert_close(v, DVec2::Y, TOL);
    }

    // -- Superposition --

    #[test]
    fn groups_are_summed() {
        let mut flow = FlowField::new();
        flow.add_cartesian(|_, _| 1.0, |_, _| 0.0, None);
        flow.add_polar(|_, _| 0.0, |_, _| 1.0, None, None).unwrap();
        flow.add_vector_field(|_| DVec2::new(0.0, 0.5), None);
        let v = flow.evaluate_at(DVec2::new(1.0, 0.0)).unwrap();
        assert_close(v, DVec2::new(1.0, 1.5), TOL);
        assert_eq!(
            flow.counts(),
            ContributionCounts {
                cartesian: 1,
                polar: 1,
                vector: 1
            }
        );
        assert_eq!(flow.len(), 3);
    }

    #[test]
    fn evaluate_matches_evaluate_at() {
        let mut flow = FlowField::new();
        flow.add_cartesian(|x, y| x * y, |x, _| x, None);
        flow.add_polar(|r, _| r, |_, _| 0.3, Some(DVec2::new(1.0, 1.0)), None)
            .unwrap();
        let pts = sample_points();
        let batch = flow.evaluate(&pts).unwrap();
        assert_eq!(batch.len(), pts.len());
        for (p, v) in pts.iter().zip(&batch) {
            assert_eq!(*v, flow.evaluate_at(*p).unwrap());
        }
    }

    #[test]
    fn push_dispatches_on_tag() {
        let mut flow = FlowField::new();
        flow.push(FlowContribution::Vector(VectorFlow {
            v: Box::new(|_| DVec2::ONE),
            offset: DVec2::ZERO,
        }));
        assert_eq!(flow.counts().vector, 1);
        assert_eq!(flow.counts().cartesian, 0);
    }

    #[test]
    fn debug_reports_counts() {
        let mut flow = FlowField::new();
        flow.add_cartesian(|_, _| 0.0, |_, _| 0.0, None);
        let s = format!("{flow:?}");
        assert!(s.contains("cartesian: 1"), "unexpected debug output: {s}");
    }

    #[test]
    fn flow_field_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlowField>();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn build(order_ab: bool, a: f64, b: f64, c: DVec2) -> FlowField {
            let mut flow = FlowField::new();
            let add_a = |f: &mut FlowField| {
                f.add_cartesian(move |_, y| a * y, move |x, _| -a * x, None);
            };
            let add_b = |f: &mut FlowField| {
                f.add_polar(move |r, _| b / (1.0 + r), move |_, _| b, Some(c), None)
                    .unwrap();
            };
            if order_ab {
                add_a(&mut flow);
                add_b(&mut flow);
            } else {
                add_b(&mut flow);
                add_a(&mut flow);
            }
            flow
        }

        fn point() -> impl Strategy<Value = DVec2> {
            (-10.0_f64..10.0, -10.0_f64..10.0).prop_map(|(x, y)| DVec2::new(x, y))
        }

        proptest! {
            #[test]
            fn superposition_is_commutative(
                a in -5.0_f64..5.0,
                b in -5.0_f64..5.0,
                c in point(),
                pts in prop::collection::vec(point(), 1..32),
            ) {
                let ab = build(true, a, b, c).evaluate(&pts).unwrap();
                let ba = build(false, a, b, c).evaluate(&pts).unwrap();
                for (u, v) in ab.iter().zip(&ba) {
                    prop_assert!((*u - *v).length() < 1e-9, "{u:?} vs {v:?}");
                }
            }
        }
    }
}
