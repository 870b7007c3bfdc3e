//! Pure-computation RGBA rasterisation of a [`ParticleSet`].
//!
//! Always available (no feature gate) so callers without the `png` feature
//! can still get a pixel buffer.

use dyeflow_core::ParticleSet;
use glam::DVec2;

/// Background colour.
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
/// Colour of initial particle positions.
pub const INITIAL_GREY: [u8; 4] = [170, 170, 170, 255];

/// Per-shape colours for current positions, cycled when there are more
/// shapes than entries.
const SHAPE_COLORS: [[u8; 3]; 8] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [23, 190, 207],
];

/// The world-space rectangle mapped onto the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub min: DVec2,
    pub max: DVec2,
}

impl View {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Bounds of every finite position in the history, padded by `margin`
    /// times the larger extent. Degenerate extents grow to one unit; an empty
    /// set gives `[-1, 1]²`.
    pub fn fit(particles: &ParticleSet, margin: f64) -> Self {
        let mut points = particles
            .history()
            .iter()
            .flatten()
            .copied()
            .filter(|p| p.is_finite());
        let Some(first) = points.next() else {
            return Self::new(DVec2::NEG_ONE, DVec2::ONE);
        };
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        let center = (min + max) * 0.5;
        let half = ((max - min) * 0.5).max(DVec2::splat(0.5));
        let pad = half.max_element() * 2.0 * margin.max(0.0);
        Self::new(center - half - pad, center + half + pad)
    }

    /// Pixel (column, row) of world point `p`, or `None` outside the view.
    /// Row 0 is the top edge, so world `y` grows upwards.
    pub fn to_pixel(&self, p: DVec2, width: usize, height: usize) -> Option<(usize, usize)> {
        let size = self.max - self.min;
        if !p.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        let u = (p.x - self.min.x) / size.x;
        let v = (self.max.y - p.y) / size.y;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        let col = ((u * width as f64) as usize).min(width.checked_sub(1)?);
        let row = ((v * height as f64) as usize).min(height.checked_sub(1)?);
        Some((col, row))
    }
}

/// Colour of shape group `index` in the current-position layer.
pub fn shape_color(index: usize) -> [u8; 4] {
    let [r, g, b] = SHAPE_COLORS[index % SHAPE_COLORS.len()];
    [r, g, b, 255]
}

/// Draws initial positions in grey, then current positions coloured by
/// shape group, over a white background. The buffer length is
/// `width * height * 4`.
///
/// # Panics
///
/// If `width * height * 4` overflows `usize`; `snapshot::write_png`
/// checks this before calling.
pub fn particles_to_rgba(
    particles: &ParticleSet,
    view: &View,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut buf: Vec<u8> = BACKGROUND
        .iter()
        .copied()
        .cycle()
        .take(width * height * 4)
        .collect();
    let mut plot = |p: DVec2, color: [u8; 4]| {
        if let Some((col, row)) = view.to_pixel(p, width, height) {
            let i = (row * width + col) * 4;
            buf[i..i + 4].copy_from_slice(&color);
        }
    };

    for &p in particles.initial_positions() {
        plot(p, INITIAL_GREY);
    }
    let current = particles.current();
    for (shape, range) in particles.shape_ranges().into_iter().enumerate() {
        let color = shape_color(shape);
        for &p in &current[range] {
            plot(p, color);
        }
    }
    buf
}
