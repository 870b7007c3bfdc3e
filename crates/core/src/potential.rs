//! Flow contributions derived from scalar potentials.
//!
//! A stream function `psi(x, y)` yields the divergence-free velocity
//! `(dpsi/dy, -dpsi/dx)`. A complex potential `w(z)` yields the conjugate
//! velocity `dw/dz = vx - i vy`. Both derivatives are taken with central
//! differences of step [`DIFF_STEP`], and both builders reduce to a
//! Cartesian contribution on the [`FlowField`].

use std::sync::Arc;

use glam::DVec2;
use num_complex::Complex64;

use crate::flow::FlowField;

/// Step size for the central finite differences.
pub const DIFF_STEP: f64 = 1e-5;

/// Velocity of the stream function `psi` at `p`.
///
/// Returns `DVec2::NAN` when `psi` is not finite at `p` or at any of the
/// difference samples, so callers treat the point as singular.
pub fn stream_velocity<F>(psi: &F, p: DVec2) -> DVec2
where
    F: Fn(f64, f64) -> f64 + ?Sized,
{
    let h = DIFF_STEP;
    let samples = [
        psi(p.x, p.y),
        psi(p.x, p.y + h),
        psi(p.x, p.y - h),
        psi(p.x + h, p.y),
        psi(p.x - h, p.y),
    ];
    if !samples.iter().all(|s| s.is_finite()) {
        return DVec2::NAN;
    }
    let [_, up, down, right, left] = samples;
    DVec2::new((up - down) / (2.0 * h), -(right - left) / (2.0 * h))
}

/// Velocity of the complex potential `w` at `p`.
///
/// `w` is analytic away from its singularities, so differentiating along the
/// real axis gives the complex derivative. At a singularity (`w` not finite
/// at `p` or at either difference sample) the result is `DVec2::NAN`.
pub fn potential_velocity<F>(w: &F, p: DVec2) -> DVec2
where
    F: Fn(Complex64) -> Complex64 + ?Sized,
{
    let z = Complex64::new(p.x, p.y);
    let h = Complex64::new(DIFF_STEP, 0.0);
    let (at, ahead, behind) = (w(z), w(z + h), w(z - h));
    if !(at.is_finite() && ahead.is_finite() && behind.is_finite()) {
        return DVec2::NAN;
    }
    let dw_dz = (ahead - behind) / (2.0 * DIFF_STEP);
    DVec2::new(dw_dz.re, -dw_dz.im)
}

impl FlowField {
    /// Adds the velocity of stream function `psi`, optionally translated by
    /// `offset`.
    pub fn add_stream_function<F>(&mut self, psi: F, offset: Option<DVec2>) -> &mut Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        let psi = Arc::new(psi);
        let psi_y = Arc::clone(&psi);
        self.add_cartesian(
            move |x, y| stream_velocity(psi.as_ref(), DVec2::new(x, y)).x,
            move |x, y| stream_velocity(psi_y.as_ref(), DVec2::new(x, y)).y,
            offset,
        )
    }

    /// Adds the velocity of complex potential `w`, optionally translated by
    /// `offset` (the potential sees `z - offset`).
    pub fn add_complex_potential<F>(&mut self, w: F, offset: Option<DVec2>) -> &mut Self
    where
        F: Fn(Complex64) -> Complex64 + Send + Sync + 'static,
    {
        let w = Arc::new(w);
        let w_y = Arc::clone(&w);
        self.add_cartesian(
            move |x, y| potential_velocity(w.as_ref(), DVec2::new(x, y)).x,
            move |x, y| potential_velocity(w_y.as_ref(), DVec2::new(x, y)).y,
            offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const FD_TOL: f64 = 1e-4;

    fn assert_close(a: DVec2, b: DVec2, tol: f64) {
        assert!(
            (a - b).length() < tol,
            "expected {b:?}, got {a:?} (tolerance {tol})"
        );
    }

    // -- Stream functions --

    #[test]
    fn hyperbolic_stream_function_gives_corner_flow() {
        let mut flow = FlowField::new();
        flow.add_stream_function(|x, y| x * y, None);
        for p in [
            DVec2::new(1.0, 2.0),
            DVec2::new(-0.3, 0.7),
            DVec2::new(4.0, -5.0),
        ] {
            let v = flow.evaluate_at(p).unwrap();
            assert_close(v, DVec2::new(p.x, -p.y), FD_TOL);
        }
    }

    #[test]
    fn uniform_stream_function_gives_uniform_flow() {
        let v = stream_velocity(&|_x: f64, y: f64| 2.0 * y, DVec2::new(7.0, -3.0));
        assert_close(v, DVec2::new(2.0, 0.0), FD_TOL);
    }

    #[test]
    fn stream_function_offset_translates_pattern() {
        let mut flow = FlowField::new();
        let centre = DVec2::new(1.0, -2.0);
        flow.add_stream_function(|x, y| x * y, Some(centre));
        assert_close(flow.evaluate_at(centre).unwrap(), DVec2::ZERO, FD_TOL);
        let v = flow.evaluate_at(centre + DVec2::new(1.0, 1.0)).unwrap();
        assert_close(v, DVec2::new(1.0, -1.0), FD_TOL);
    }

    #[test]
    fn stream_flow_is_divergence_free() {
        let psi = |x: f64, y: f64| (x * 1.3).sin() * (y * 0.7).cos() + x * x * y;
        let h = 1e-3;
        for p in [DVec2::new(0.2, 0.4), DVec2::new(-1.5, 2.0), DVec2::new(3.0, -0.5)] {
            let dvx = stream_velocity(&psi, p + DVec2::X * h).x
                - stream_velocity(&psi, p - DVec2::X * h).x;
            let dvy = stream_velocity(&psi, p + DVec2::Y * h).y
                - stream_velocity(&psi, p - DVec2::Y * h).y;
            let divergence = (dvx + dvy) / (2.0 * h);
            assert!(
                divergence.abs() < 1e-3,
                "divergence too large at {p:?}: {divergence}"
            );
        }
    }

    // -- Complex potentials --

    #[test]
    fn uniform_potential_gives_uniform_flow() {
        let u = Complex64::new(2.0, -1.0);
        let v = potential_velocity(&|z: Complex64| u * z, DVec2::new(0.5, 3.0));
        // dw/dz = 2 - i, so (vx, vy) = (2, 1).
        assert_close(v, DVec2::new(2.0, 1.0), FD_TOL);
    }

    #[test]
    fn log_potential_is_a_point_vortex() {
        // w = -i Gamma / (2 pi) log z: counter-clockwise vortex, speed Gamma / (2 pi r).
        let gamma = 2.0 * PI;
        let mut flow = FlowField::new();
        flow.add_complex_potential(
            move |z: Complex64| Complex64::new(0.0, -gamma / (2.0 * PI)) * z.ln(),
            None,
        );
        let v = flow.evaluate_at(DVec2::new(2.0, 0.0)).unwrap();
        assert_close(v, DVec2::new(0.0, 0.5), FD_TOL);
        let v = flow.evaluate_at(DVec2::new(0.0, -1.0)).unwrap();
        assert_close(v, DVec2::new(1.0, 0.0), FD_TOL);
    }

    #[test]
    fn potential_offset_translates_vortex_centre() {
        let mut flow = FlowField::new();
        let centre = DVec2::new(-1.0, 0.0);
        flow.add_complex_potential(|z: Complex64| Complex64::new(0.0, -1.0) * z.ln(), Some(centre));
        // Directly above the centre the swirl points in -x.
        let v = flow.evaluate_at(centre + DVec2::Y).unwrap();
        assert!(v.x < 0.0 && v.y.abs() < FD_TOL, "unexpected velocity {v:?}");
    }

    #[test]
    fn vortex_centre_is_singular() {
        let w = |z: Complex64| Complex64::new(0.0, -1.0) * z.ln();
        assert!(!potential_velocity(&w, DVec2::ZERO).is_finite());

        let mut flow = FlowField::new();
        let centre = DVec2::new(1.0, -4.0);
        flow.add_complex_potential(w, Some(centre));
        assert!(!flow.evaluate_at(centre).unwrap().is_finite());
        assert!(flow.evaluate_at(centre + DVec2::X).unwrap().is_finite());
    }

    #[test]
    fn singular_stream_function_is_flagged() {
        // psi = log r: finite everywhere except the origin.
        let psi = |x: f64, y: f64| 0.5 * (x * x + y * y).ln();
        assert!(!stream_velocity(&psi, DVec2::ZERO).is_finite());
        assert!(stream_velocity(&psi, DVec2::new(0.5, 0.5)).is_finite());
    }

    #[test]
    fn source_potential_matches_polar_source() {
        let m = 3.0;
        let mut from_potential = FlowField::new();
        from_potential.add_complex_potential(move |z: Complex64| z.ln() * (m / (2.0 * PI)), None);
        let mut from_polar = FlowField::new();
        from_polar
            .add_polar(move |r, _| m / (2.0 * PI * r), |_, _| 0.0, None, None)
            .unwrap();
        for p in [DVec2::new(1.0, 1.0), DVec2::new(-2.0, 0.5), DVec2::new(0.3, -4.0)] {
            assert_close(
                from_potential.evaluate_at(p).unwrap(),
                from_polar.evaluate_at(p).unwrap(),
                FD_TOL,
            );
        }
    }
}
