//! Shader core error taxonomy.

use crate::gpu_device::ShaderKind;
use thiserror::Error;

/// Errors surfaced while building or binding shader programs.
///
/// None of these are retried: the same source against the same driver fails
/// the same way, and there is no placeholder shader to fall back to.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// The source generator could not translate the configuration.
    #[error("failed to generate {kind} shader source")]
    Generation { kind: ShaderKind },

    /// The driver rejected a shader stage.
    #[error("error compiling {kind} shader:\n{log}")]
    Compile { kind: ShaderKind, log: String },

    /// The driver rejected a program link.
    #[error("error linking shader program:\n{log}")]
    Link { log: String },

    /// The driver laid out a uniform block differently from the host record.
    #[error("uniform block `{block}` is {actual} bytes on the device, host record is {expected} bytes")]
    UniformBlockSize {
        block: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A mandatory stage has not been selected before applying.
    #[error("no {kind} shader selected")]
    MissingStage { kind: ShaderKind },
}
