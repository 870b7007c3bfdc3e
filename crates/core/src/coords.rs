//! Conversions between Cartesian and polar coordinates.
//!
//! Angles come from the two-argument arctangent so every quadrant is
//! resolved correctly. Polar velocities are `(vr, vtheta)` where `vtheta`
//! is an angular rate (radians per unit time), so the tangential speed of a
//! point is `r * vtheta`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A point in polar form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Polar {
    pub r: f64,
    pub theta: f64,
}

impl Polar {
    pub const fn new(r: f64, theta: f64) -> Self {
        Self { r, theta }
    }
}

/// Converts a Cartesian point to polar form.
pub fn to_polar(p: DVec2) -> Polar {
    Polar {
        r: p.x.hypot(p.y),
        theta: p.y.atan2(p.x),
    }
}

/// Converts a polar point to Cartesian form.
pub fn to_cartesian(polar: Polar) -> DVec2 {
    let (sin, cos) = polar.theta.sin_cos();
    DVec2::new(polar.r * cos, polar.r * sin)
}

/// Changes basis of a polar velocity `(vr, vtheta)` sampled at `p` into
/// Cartesian components.
///
/// ```text
/// vx = vr cos(theta) - r vtheta sin(theta)
/// vy = vr sin(theta) + r vtheta cos(theta)
/// ```
///
/// Involves no division, so it is finite at the pole for finite inputs.
pub fn polar_velocity_to_cartesian(p: DVec2, vr: f64, vtheta: f64) -> DVec2 {
    polar_velocity_in_basis(to_polar(p), vr, vtheta)
}

/// Same as [`polar_velocity_to_cartesian`] for a point already in polar form.
pub fn polar_velocity_in_basis(polar: Polar, vr: f64, vtheta: f64) -> DVec2 {
    let (sin, cos) = polar.theta.sin_cos();
    DVec2::new(
        vr * cos - polar.r * vtheta * sin,
        vr * sin + polar.r * vtheta * cos,
    )
}

/// Element-wise [`to_polar`] over a batch of points.
pub fn to_polar_batch(points: &[DVec2]) -> Vec<Polar> {
    points.iter().copied().map(to_polar).collect()
}

/// Element-wise [`to_cartesian`] over a batch of polar points.
pub fn to_cartesian_batch(points: &[Polar]) -> Vec<DVec2> {
    points.iter().copied().map(to_cartesian).collect()
}
