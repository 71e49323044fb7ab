//! Graphics device interface
//!
//! The OpenGL entry points the shader core relies on, expressed as a trait so
//! the cache and manager can run against the real context (`GlDevice`) or a
//! recording device in tests. Every call is synchronous and must be made on the
//! thread that owns the context.

use bitflags::bitflags;
use std::fmt;

// ============================================================================
// Object handles
// ============================================================================

/// GL shader object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// GL program object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// GL program pipeline object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub u32);

/// GL buffer object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

// ============================================================================
// Stage kinds
// ============================================================================

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderKind {
    /// Matching `GL_*_SHADER` enum.
    pub const fn gl_enum(self) -> u32 {
        match self {
            ShaderKind::Vertex => gl::VERTEX_SHADER,
            ShaderKind::Geometry => gl::GEOMETRY_SHADER,
            ShaderKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }

    /// Pipeline stage bit used when attaching a separable program.
    pub const fn stage_flags(self) -> StageFlags {
        match self {
            ShaderKind::Vertex => StageFlags::VERTEX,
            ShaderKind::Geometry => StageFlags::GEOMETRY,
            ShaderKind::Fragment => StageFlags::FRAGMENT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Geometry => "geometry",
            ShaderKind::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// `GL_*_SHADER_BIT` values for `glUseProgramStages`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageFlags: u32 {
        const VERTEX = gl::VERTEX_SHADER_BIT;
        const FRAGMENT = gl::FRAGMENT_SHADER_BIT;
        const GEOMETRY = gl::GEOMETRY_SHADER_BIT;
    }
}

// ============================================================================
// Device trait
// ============================================================================

/// The GL call surface used by the shader core.
///
/// Methods map one-to-one onto GL entry points; none of them report errors
/// beyond what GL itself exposes through status queries and info logs.
pub trait GpuDevice {
    // Shaders
    fn create_shader(&mut self, kind: ShaderKind) -> ShaderHandle;
    fn shader_source(&mut self, shader: ShaderHandle, source: &str);
    fn compile_shader(&mut self, shader: ShaderHandle);
    fn shader_compile_status(&self, shader: ShaderHandle) -> bool;
    fn shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&mut self, shader: ShaderHandle);

    // Programs
    fn create_program(&mut self) -> ProgramHandle;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn set_program_separable(&mut self, program: ProgramHandle, separable: bool);
    fn link_program(&mut self, program: ProgramHandle);
    fn program_link_status(&self, program: ProgramHandle) -> bool;
    fn program_info_log(&self, program: ProgramHandle) -> String;
    fn delete_program(&mut self, program: ProgramHandle);
    fn current_program(&self) -> Option<ProgramHandle>;
    fn use_program(&mut self, program: Option<ProgramHandle>);

    // Program interface
    fn uniform_block_index(&self, program: ProgramHandle, name: &str) -> Option<u32>;
    fn uniform_block_data_size(&self, program: ProgramHandle, index: u32) -> usize;
    fn uniform_block_binding(&mut self, program: ProgramHandle, index: u32, binding: u32);
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<i32>;
    /// Set an integer uniform of the current program.
    fn uniform_1i(&mut self, location: i32, value: i32);

    // Program pipelines
    fn create_program_pipeline(&mut self) -> PipelineHandle;
    fn use_program_stages(
        &mut self,
        pipeline: PipelineHandle,
        stages: StageFlags,
        program: Option<ProgramHandle>,
    );
    fn delete_program_pipeline(&mut self, pipeline: PipelineHandle);

    // Uniform buffers
    /// Create a uniform buffer with `size` bytes of uninitialised dynamic storage.
    fn create_uniform_buffer(&mut self, size: usize) -> BufferHandle;
    fn buffer_sub_data(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferHandle);

    // Capabilities
    /// Whether `ARB_separate_shader_objects` (or GL 4.1) is available.
    fn supports_separate_shader_objects(&self) -> bool;
}
