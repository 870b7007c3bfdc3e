//! Forgiving typed lookups into a `serde_json::Value` parameter object.
//!
//! Flow presets and scenario files carry their tunables as a loose JSON
//! object. Each helper takes the object, a key, and a default; a missing key
//! or a value of the wrong shape yields the default, so these never fail.

use glam::DVec2;
use serde_json::Value;

/// Reads an `f64`, accepting any JSON number.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads a non-negative integer as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Reads a `u32`, e.g. a noise seed. Values above `u32::MAX` fall back.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// Reads a 2-vector written either as `[x, y]` or as `{"x": .., "y": ..}`.
pub fn param_vec2(params: &Value, name: &str, default: DVec2) -> DVec2 {
    let Some(value) = params.get(name) else {
        return default;
    };
    let pair = match value {
        Value::Array(items) if items.len() == 2 => items[0].as_f64().zip(items[1].as_f64()),
        Value::Object(_) => value
            .get("x")
            .and_then(Value::as_f64)
            .zip(value.get("y").and_then(Value::as_f64)),
        _ => None,
    };
    pair.map(|(x, y)| DVec2::new(x, y)).unwrap_or(default)
}
