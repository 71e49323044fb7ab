//! Render-state fields written by the shader program manager.
//!
//! The state object belongs to the renderer, which diffs and submits it; the
//! manager only fills in which program or pipeline and which uniform buffers
//! the next draw uses.

use crate::gpu_device::{BufferHandle, PipelineHandle, ProgramHandle};
use crate::shader::UniformBindings;

/// Draw-time bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawState {
    /// Monolithic program to use, if any.
    pub shader_program: Option<ProgramHandle>,
    /// Program pipeline to bind when no monolithic program is set.
    pub program_pipeline: Option<PipelineHandle>,
    /// Uniform buffer bound to each `UniformBindings` point.
    pub uniform_buffers: [Option<BufferHandle>; UniformBindings::COUNT],
}

/// Renderer-owned GL state snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderState {
    pub draw: DrawState,
}

impl RenderState {
    /// Buffer bound to `binding`.
    pub fn uniform_buffer(&self, binding: UniformBindings) -> Option<BufferHandle> {
        self.draw.uniform_buffers[binding as usize]
    }
}
