//! OpenGL shader program cache and binding manager for the PICA200 hardware
//! renderer.
//!
//! Register state captured from the emulated GPU is turned into per-stage
//! configuration keys; `ShaderProgramManager` compiles one GLSL stage per
//! distinct key, combines the selected stages into something drawable and
//! writes the result into the renderer's `RenderState`.

pub mod config;
pub mod error;
pub mod gl_device;
pub mod gpu_device;
pub mod shader;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::{BindingMode, ManagerConfig};
pub use error::ShaderError;
pub use gl_device::GlDevice;
pub use gpu_device::{BufferHandle, GpuDevice, PipelineHandle, ProgramHandle, ShaderHandle, ShaderKind, StageFlags};
pub use shader::{CacheStats, ShaderGenerator, ShaderProgramManager};
pub use state::{DrawState, RenderState};
