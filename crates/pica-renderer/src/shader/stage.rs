//! Compiled stage objects.

use super::bindings::bind_program_interface;
use super::util::{load_program, load_shader};
use crate::error::ShaderError;
use crate::gpu_device::{GpuDevice, ProgramHandle, ShaderHandle, ShaderKind};

/// Non-owning identity of a compiled stage.
///
/// Which variant a manager hands out depends on its binding mode: shader
/// objects for monolithic linking, separable programs for program pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageHandle {
    Shader(ShaderHandle),
    Program(ProgramHandle),
}

impl StageHandle {
    pub fn shader(self) -> Option<ShaderHandle> {
        match self {
            StageHandle::Shader(shader) => Some(shader),
            StageHandle::Program(_) => None,
        }
    }

    pub fn program(self) -> Option<ProgramHandle> {
        match self {
            StageHandle::Program(program) => Some(program),
            StageHandle::Shader(_) => None,
        }
    }
}

/// One compiled stage, owned by a cache.
#[derive(Debug)]
pub struct ShaderStage {
    handle: StageHandle,
    kind: ShaderKind,
}

impl ShaderStage {
    /// Compile `source` as a stage of the given kind.
    ///
    /// In separable mode the shader is linked on its own into a separable
    /// program, which gets its uniform blocks and samplers bound; the
    /// intermediate shader object is deleted.
    pub fn create<D: GpuDevice>(
        device: &mut D,
        source: &str,
        kind: ShaderKind,
        separable: bool,
    ) -> Result<Self, ShaderError> {
        let shader = load_shader(device, source, kind)?;
        if !separable {
            return Ok(Self {
                handle: StageHandle::Shader(shader),
                kind,
            });
        }

        let program = load_program(device, true, &[shader]);
        device.delete_shader(shader);
        let program = bind_program_interface(device, program?)?;

        Ok(Self {
            handle: StageHandle::Program(program),
            kind,
        })
    }

    #[inline]
    pub fn handle(&self) -> StageHandle {
        self.handle
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    /// Delete the underlying GL object.
    pub fn release<D: GpuDevice>(self, device: &mut D) {
        match self.handle {
            StageHandle::Shader(shader) => device.delete_shader(shader),
            StageHandle::Program(program) => device.delete_program(program),
        }
    }
}
