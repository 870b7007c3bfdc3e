//! CPU-side PNG rendering of a [`ParticleSet`].
//!
//! Feature-gated behind `png` (default on) so that library users who only
//! need the raw buffer from [`crate::pixel`] do not pull in the `image` crate.

use std::path::Path;

use dyeflow_core::{FlowError, ParticleSet};

use crate::pixel::{particles_to_rgba, View};

/// Writes the particle set as a `width` x `height` PNG.
///
/// Returns `FlowError::Configuration` if either dimension is zero or
/// overflows `u32`, or if the RGBA buffer size overflows `usize`;
/// `FlowError::Io` on write failure.
pub fn write_png(
    particles: &ParticleSet,
    view: &View,
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), FlowError> {
    let dims = u32::try_from(width).ok().zip(u32::try_from(height).ok());
    let (w, h) = match dims {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(FlowError::Configuration(format!(
                "invalid image dimensions {width}x{height}"
            )))
        }
    };
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            FlowError::Configuration(format!("image {width}x{height} is too large"))
        })?;
    let rgba = particles_to_rgba(particles, view, width, height);
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FlowError::Io(e.to_string()))?;
    log::info!("wrote {width}x{height} snapshot to {}", path.display());
    Ok(())
}
