//! Dye seeding: turns simple shapes into tracer particle sets.
//!
//! Every seeded shape becomes one shape group in the resulting
//! [`ParticleSet`], so renderers can colour shapes independently.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::particles::ParticleSet;

/// A shape of dye to inject into the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DyeShape {
    /// `count` evenly spaced particles from `start` to `end`, both included.
    Line {
        start: DVec2,
        end: DVec2,
        count: usize,
        #[serde(default)]
        mass: f64,
    },
    /// The perimeter of an axis-aligned rectangle, `count / 4` particles per
    /// side, walked clockwise from the bottom-left corner.
    Rectangle {
        center: DVec2,
        width: f64,
        height: f64,
        count: usize,
        #[serde(default)]
        mass: f64,
    },
    /// `count` particles evenly spaced in angle around a circle.
    Circle {
        center: DVec2,
        radius: f64,
        count: usize,
        #[serde(default)]
        mass: f64,
    },
}

impl DyeShape {
    /// Generates the particles for this shape.
    ///
    /// Returns `FlowError::Configuration` for a zero particle count,
    /// non-finite geometry, or a negative size.
    pub fn seed(&self) -> Result<ParticleSet, FlowError> {
        self.validate()?;
        let (positions, mass) = match *self {
            DyeShape::Line {
                start,
                end,
                count,
                mass,
            } => (line_points(start, end, count), mass),
            DyeShape::Rectangle {
                center,
                width,
                height,
                count,
                mass,
            } => (rectangle_points(center, width, height, count), mass),
            DyeShape::Circle {
                center,
                radius,
                count,
                mass,
            } => (circle_points(center, radius, count), mass),
        };
        Ok(ParticleSet::from_positions(positions, mass))
    }

    fn validate(&self) -> Result<(), FlowError> {
        let (count, points, sizes, mass) = match self {
            DyeShape::Line {
                start,
                end,
                count,
                mass,
            } => (*count, vec![*start, *end], vec![], *mass),
            DyeShape::Rectangle {
                center,
                width,
                height,
                count,
                mass,
            } => (*count, vec![*center], vec![*width, *height], *mass),
            DyeShape::Circle {
                center,
                radius,
                count,
                mass,
            } => (*count, vec![*center], vec![*radius], *mass),
        };
        if count == 0 {
            return Err(FlowError::Configuration(
                "dye shape needs at least one particle".into(),
            ));
        }
        if matches!(self, DyeShape::Rectangle { .. }) && count < 4 {
            return Err(FlowError::Configuration(
                "rectangle dye needs at least four particles".into(),
            ));
        }
        if !points.iter().all(|p| p.is_finite()) || !mass.is_finite() {
            return Err(FlowError::Configuration(
                "dye shape coordinates and mass must be finite".into(),
            ));
        }
        if !sizes.iter().all(|s| s.is_finite() && *s >= 0.0) {
            return Err(FlowError::Configuration(
                "dye shape sizes must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

fn line_points(start: DVec2, end: DVec2, count: usize) -> Vec<DVec2> {
    if count == 1 {
        return vec![start];
    }
    let last = (count - 1) as f64;
    (0..count)
        .map(|i| start.lerp(end, i as f64 / last))
        .collect()
}

fn rectangle_points(center: DVec2, width: f64, height: f64, count: usize) -> Vec<DVec2> {
    let half = DVec2::new(width, height) * 0.5;
    let bottom_left = center - half;
    let top_left = center + DVec2::new(-half.x, half.y);
    let top_right = center + half;
    let bottom_right = center + DVec2::new(half.x, -half.y);
    let per_side = count / 4;
    [
        (bottom_left, top_left),
        (top_left, top_right),
        (top_right, bottom_right),
        (bottom_right, bottom_left),
    ]
    .into_iter()
    .flat_map(|(a, b)| line_points(a, b, per_side))
    .collect()
}

fn circle_points(center: DVec2, radius: f64, count: usize) -> Vec<DVec2> {
    (0..count)
        .map(|i| {
            let theta = TAU * i as f64 / count as f64;
            center + DVec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect()
}

/// Accumulates dye shapes into one particle set, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Dye {
    particles: ParticleSet,
}

impl Dye {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `shape` and appends it as a new shape group.
    pub fn add(&mut self, shape: &DyeShape) -> Result<&mut Self, FlowError> {
        let seeded = shape.seed()?;
        self.particles.merge_in(seeded)?;
        Ok(self)
    }

    /// Seeds every shape in order.
    pub fn from_shapes<'a, I>(shapes: I) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = &'a DyeShape>,
    {
        let mut dye = Self::new();
        for shape in shapes {
            dye.add(shape)?;
        }
        Ok(dye)
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn into_particles(self) -> ParticleSet {
        self.particles
    }
}
