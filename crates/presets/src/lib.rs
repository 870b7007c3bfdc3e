#![deny(unsafe_code)]
//! Preset registry: maps flow names to ready-built [`FlowField`]s and
//! provides CPU-side rasterisation of particle sets.
//!
//! The CLI depends on this crate so name dispatch and drawing live in one
//! place. Presets read their tunables from a loose JSON object; unknown keys
//! are ignored and missing keys take the defaults listed by
//! [`FlowPreset::defaults`].

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use std::f64::consts::TAU;

use dyeflow_core::params::{param_f64, param_u32, param_vec2};
use dyeflow_core::{FlowError, FlowField};
use glam::DVec2;
use noise::{NoiseFn, Perlin};
use num_complex::Complex64;
use serde_json::{json, Value};

/// All available preset names.
const PRESET_NAMES: &[&str] = &[
    "uniform",
    "rotation",
    "vortex",
    "vortex-quad",
    "corner",
    "source",
    "curl-noise",
];

/// Built-in flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPreset {
    /// Constant velocity `(u, v)`.
    Uniform,
    /// Rigid rotation at angular rate `omega` about `center`.
    Rotation,
    /// Free point vortex of `circulation` at `center`, from the complex
    /// potential `-i Γ / (2π) log z`.
    Vortex,
    /// Two counter-rotating vortex pairs at `(±1, 0)` and `(±1, -4)`.
    VortexQuad,
    /// Stagnation-point flow from the stream function `k x y`.
    Corner,
    /// Radial point source of `strength` at `center`.
    Source,
    /// Divergence-free noise: the stream function is scaled Perlin noise.
    CurlNoise,
}

impl FlowPreset {
    /// Looks up a preset by name.
    ///
    /// Returns `FlowError::UnknownPreset` if the name is not recognized.
    pub fn parse(name: &str) -> Result<Self, FlowError> {
        match name {
            "uniform" => Ok(FlowPreset::Uniform),
            "rotation" => Ok(FlowPreset::Rotation),
            "vortex" => Ok(FlowPreset::Vortex),
            "vortex-quad" => Ok(FlowPreset::VortexQuad),
            "corner" => Ok(FlowPreset::Corner),
            "source" => Ok(FlowPreset::Source),
            "curl-noise" => Ok(FlowPreset::CurlNoise),
            _ => Err(FlowError::UnknownPreset(name.to_string())),
        }
    }

    /// Builds the named preset's flow field from `params`.
    pub fn from_name(name: &str, params: &Value) -> Result<FlowField, FlowError> {
        let flow = Self::parse(name)?.build(params)?;
        log::debug!("built preset {name}: {:?}", flow.counts());
        Ok(flow)
    }

    /// Returns a slice of all recognized preset names.
    pub fn list_presets() -> &'static [&'static str] {
        PRESET_NAMES
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowPreset::Uniform => "uniform",
            FlowPreset::Rotation => "rotation",
            FlowPreset::Vortex => "vortex",
            FlowPreset::VortexQuad => "vortex-quad",
            FlowPreset::Corner => "corner",
            FlowPreset::Source => "source",
            FlowPreset::CurlNoise => "curl-noise",
        }
    }

    /// Default parameters, as a JSON object.
    pub fn defaults(&self) -> Value {
        match self {
            FlowPreset::Uniform => json!({"u": 1.0, "v": 0.0}),
            FlowPreset::Rotation => json!({"omega": 1.0, "center": [0.0, 0.0]}),
            FlowPreset::Vortex => json!({"circulation": TAU, "center": [0.0, 0.0]}),
            FlowPreset::VortexQuad => json!({"circulation": TAU}),
            FlowPreset::Corner => json!({"k": 1.0, "center": [0.0, 0.0]}),
            FlowPreset::Source => json!({"strength": 1.0, "center": [0.0, 0.0]}),
            FlowPreset::CurlNoise => json!({"scale": 1.0, "amplitude": 1.0, "seed": 0}),
        }
    }

    /// Builds this preset's flow field. Parameter values of the wrong type
    /// fall back to their defaults.
    pub fn build(&self, params: &Value) -> Result<FlowField, FlowError> {
        let center = param_vec2(params, "center", DVec2::ZERO);
        let mut flow = FlowField::new();
        match self {
            FlowPreset::Uniform => {
                let u = param_f64(params, "u", 1.0);
                let v = param_f64(params, "v", 0.0);
                flow.add_cartesian(move |_, _| u, move |_, _| v, None);
            }
            FlowPreset::Rotation => {
                let omega = param_f64(params, "omega", 1.0);
                flow.add_polar(|_, _| 0.0, move |_, _| omega, Some(center), None)?;
            }
            FlowPreset::Vortex => {
                let circulation = param_f64(params, "circulation", TAU);
                add_point_vortex(&mut flow, circulation, center);
            }
            FlowPreset::VortexQuad => {
                let circulation = param_f64(params, "circulation", TAU);
                for (x, y, sign) in [
                    (-1.0, 0.0, -1.0),
                    (-1.0, -4.0, 1.0),
                    (1.0, 0.0, 1.0),
                    (1.0, -4.0, -1.0),
                ] {
                    add_point_vortex(&mut flow, sign * circulation, DVec2::new(x, y));
                }
            }
            FlowPreset::Corner => {
                let k = param_f64(params, "k", 1.0);
                flow.add_stream_function(move |x, y| k * x * y, Some(center));
            }
            FlowPreset::Source => {
                let strength = param_f64(params, "strength", 1.0);
                flow.add_polar(
                    move |r, _| strength / (TAU * r),
                    |_, _| 0.0,
                    Some(center),
                    None,
                )?;
            }
            FlowPreset::CurlNoise => {
                let scale = param_f64(params, "scale", 1.0);
                let amplitude = param_f64(params, "amplitude", 1.0);
                let noise = Perlin::new(param_u32(params, "seed", 0));
                flow.add_stream_function(
                    move |x, y| amplitude * noise.get([x * scale, y * scale]),
                    None,
                );
            }
        }
        Ok(flow)
    }
}

/// Point vortex of circulation `gamma` (positive is anticlockwise).
fn add_point_vortex(flow: &mut FlowField, gamma: f64, center: DVec2) {
    let k = Complex64::new(0.0, -gamma / TAU);
    flow.add_complex_potential(move |z: Complex64| k * z.ln(), Some(center));
}
