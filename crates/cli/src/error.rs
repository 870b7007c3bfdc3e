//! CLI errors and their process exit codes.
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | success |
//! | 2    | clap argument error (raised before `run`) |
//! | 10   | flow error: unknown preset, invalid setup or dye, empty flow |
//! | 11   | I/O: scenario read, PNG write |
//! | 12   | input: malformed JSON in a flag or scenario file, no preset given |
//! | 13   | serialization of the JSON report |

use dyeflow_core::FlowError;
use dyeflow_presets::FlowPreset;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Preset lookup miss; the message lists what is available.
    #[error("unknown preset `{name}` (available: {})", FlowPreset::list_presets().join(", "))]
    UnknownPreset { name: String },

    #[error(transparent)]
    Flow(FlowError),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Input(String),

    #[error("cannot serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownPreset { .. } | CliError::Flow(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// Export failures become I/O errors and registry misses get the preset
/// list; everything else keeps its flow error.
impl From<FlowError> for CliError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Io(msg) => CliError::Io(msg),
            FlowError::UnknownPreset(name) => CliError::UnknownPreset { name },
            other => CliError::Flow(other),
        }
    }
}
