//! Error types for the dyeflow core.

use thiserror::Error;

/// Errors produced by flow composition, particle bookkeeping and integration.
#[derive(Debug, Error)]
pub enum FlowError {
    /// `evaluate` was called on a flow field with no contributions.
    #[error("no flow defined: the flow field has no contributions")]
    NoFlowDefined,

    /// Invalid setup detected at composition time, before any step runs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Two values that must agree in shape or kind did not.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// An interpolated position was requested outside the recorded history.
    #[error("time index {requested} out of range: history holds {available} snapshot(s)")]
    OutOfRange { requested: f64, available: usize },

    /// A flow preset name was not recognised.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Writing an export (snapshot image, history dump) failed.
    #[error("I/O error: {0}")]
    Io(String),
}
