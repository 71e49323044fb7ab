//! PICA200 register and shader unit state.
//!
//! The subset of emulated GPU state the hardware renderer reads when it builds
//! shader configurations and fills uniform blocks.

pub mod float24;
pub mod math;
pub mod regs;
pub mod shader_setup;

pub use float24::Float24;
pub use math::Vec4;
pub use regs::{IntUniform, PipelineRegs, RasterizerRegs, Regs, ShaderRegs, VsOutputAttributes};
pub use shader_setup::{ShaderSetup, Uniforms};
