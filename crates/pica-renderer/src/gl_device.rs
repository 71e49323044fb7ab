//! OpenGL device
//!
//! `GpuDevice` over the `gl` crate's global function pointers. The host window
//! layer makes a context current and hands its loader to `GlDevice::load_with`.

use crate::gpu_device::{
    BufferHandle, GpuDevice, PipelineHandle, ProgramHandle, ShaderHandle, ShaderKind, StageFlags,
};
use gl::types::{GLchar, GLint, GLintptr, GLsizei, GLsizeiptr, GLuint};
use std::ffi::{c_char, c_void, CStr, CString};
use std::marker::PhantomData;
use std::ptr;

/// Handle to the current OpenGL context.
///
/// Not `Send`/`Sync`: GL calls are only valid on the thread the context is
/// current on.
pub struct GlDevice {
    separate_shader_objects: bool,
    _not_send: PhantomData<*const ()>,
}

impl GlDevice {
    /// Load GL function pointers for the current context.
    ///
    /// # Safety
    /// A GL 3.3+ context must be current on the calling thread, and every later
    /// use of the returned device must happen on that thread.
    pub unsafe fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        // SAFETY: the caller guarantees a current context; out pointers are
        // valid and extension strings are NUL-terminated and owned by GL.
        let mut major: GLint = 0;
        let mut minor: GLint = 0;
        let mut num_extensions: GLint = 0;
        gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
        gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);
        gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);

        let extensions: Vec<String> = (0..num_extensions.max(0) as GLuint)
            .filter_map(|index| {
                let name = gl::GetStringi(gl::EXTENSIONS, index);
                (!name.is_null()).then(|| CStr::from_ptr(name as *const c_char).to_string_lossy().into_owned())
            })
            .collect();

        let entry_points_loaded = gl::UseProgramStages::is_loaded()
            && gl::GenProgramPipelines::is_loaded()
            && gl::DeleteProgramPipelines::is_loaded()
            && gl::ProgramParameteri::is_loaded();

        Self {
            separate_shader_objects: has_separate_shader_objects(
                (major, minor),
                extensions.iter().map(String::as_str),
                entry_points_loaded,
            ),
            _not_send: PhantomData,
        }
    }
}

/// Whether a context with this version and extension list can use separable
/// programs. Core since GL 4.1, otherwise `GL_ARB_separate_shader_objects`.
///
/// Loaders may hand out non-null pointers for any name, so loaded entry points
/// alone are not enough.
fn has_separate_shader_objects<'a>(
    (major, minor): (GLint, GLint),
    mut extensions: impl Iterator<Item = &'a str>,
    entry_points_loaded: bool,
) -> bool {
    let core = (major, minor) >= (4, 1);
    entry_points_loaded && (core || extensions.any(|ext| ext == "GL_ARB_separate_shader_objects"))
}

/// Read an info log of `len` bytes (including the terminator) through `read`.
fn read_info_log(len: GLint, read: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 1 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    read(len, &mut written, buf.as_mut_ptr() as *mut GLchar);
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Names containing an interior NUL cannot exist in GLSL; treat them as absent.
fn c_name(name: &str) -> Option<CString> {
    CString::new(name).ok()
}

impl GpuDevice for GlDevice {
    fn create_shader(&mut self, kind: ShaderKind) -> ShaderHandle {
        // SAFETY: context is current (GlDevice invariant).
        ShaderHandle(unsafe { gl::CreateShader(kind.gl_enum()) })
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        // SAFETY: pointer/length pair describes `source`, which outlives the call.
        unsafe { gl::ShaderSource(shader.0, 1, &ptr, &len) }
    }

    fn compile_shader(&mut self, shader: ShaderHandle) {
        // SAFETY: context is current.
        unsafe { gl::CompileShader(shader.0) }
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        let mut status: GLint = gl::FALSE as GLint;
        // SAFETY: `status` is a valid out pointer.
        unsafe { gl::GetShaderiv(shader.0, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        let mut len: GLint = 0;
        // SAFETY: out pointers are valid; the buffer holds `len` bytes.
        unsafe {
            gl::GetShaderiv(shader.0, gl::INFO_LOG_LENGTH, &mut len);
            read_info_log(len, |cap, written, buf| gl::GetShaderInfoLog(shader.0, cap, written, buf))
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        // SAFETY: context is current.
        unsafe { gl::DeleteShader(shader.0) }
    }

    fn create_program(&mut self) -> ProgramHandle {
        // SAFETY: context is current.
        ProgramHandle(unsafe { gl::CreateProgram() })
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        // SAFETY: context is current.
        unsafe { gl::AttachShader(program.0, shader.0) }
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        // SAFETY: context is current.
        unsafe { gl::DetachShader(program.0, shader.0) }
    }

    fn set_program_separable(&mut self, program: ProgramHandle, separable: bool) {
        let value = if separable { gl::TRUE } else { gl::FALSE };
        // SAFETY: context is current.
        unsafe { gl::ProgramParameteri(program.0, gl::PROGRAM_SEPARABLE, value as GLint) }
    }

    fn link_program(&mut self, program: ProgramHandle) {
        // SAFETY: context is current.
        unsafe { gl::LinkProgram(program.0) }
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        let mut status: GLint = gl::FALSE as GLint;
        // SAFETY: `status` is a valid out pointer.
        unsafe { gl::GetProgramiv(program.0, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        let mut len: GLint = 0;
        // SAFETY: out pointers are valid; the buffer holds `len` bytes.
        unsafe {
            gl::GetProgramiv(program.0, gl::INFO_LOG_LENGTH, &mut len);
            read_info_log(len, |cap, written, buf| gl::GetProgramInfoLog(program.0, cap, written, buf))
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        // SAFETY: context is current.
        unsafe { gl::DeleteProgram(program.0) }
    }

    fn current_program(&self) -> Option<ProgramHandle> {
        let mut current: GLint = 0;
        // SAFETY: `current` is a valid out pointer.
        unsafe { gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut current) };
        (current != 0).then_some(ProgramHandle(current as GLuint))
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        // SAFETY: context is current.
        unsafe { gl::UseProgram(program.map_or(0, |p| p.0)) }
    }

    fn uniform_block_index(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let name = c_name(name)?;
        // SAFETY: `name` is NUL-terminated and outlives the call.
        let index = unsafe { gl::GetUniformBlockIndex(program.0, name.as_ptr()) };
        (index != gl::INVALID_INDEX).then_some(index)
    }

    fn uniform_block_data_size(&self, program: ProgramHandle, index: u32) -> usize {
        let mut size: GLint = 0;
        // SAFETY: `size` is a valid out pointer.
        unsafe {
            gl::GetActiveUniformBlockiv(program.0, index, gl::UNIFORM_BLOCK_DATA_SIZE, &mut size)
        };
        size.max(0) as usize
    }

    fn uniform_block_binding(&mut self, program: ProgramHandle, index: u32, binding: u32) {
        // SAFETY: context is current.
        unsafe { gl::UniformBlockBinding(program.0, index, binding) }
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<i32> {
        let name = c_name(name)?;
        // SAFETY: `name` is NUL-terminated and outlives the call.
        let location = unsafe { gl::GetUniformLocation(program.0, name.as_ptr()) };
        (location != -1).then_some(location)
    }

    fn uniform_1i(&mut self, location: i32, value: i32) {
        // SAFETY: context is current.
        unsafe { gl::Uniform1i(location, value) }
    }

    fn create_program_pipeline(&mut self) -> PipelineHandle {
        let mut pipeline: GLuint = 0;
        // SAFETY: `pipeline` is a valid out pointer for one name.
        unsafe { gl::GenProgramPipelines(1, &mut pipeline) };
        PipelineHandle(pipeline)
    }

    fn use_program_stages(
        &mut self,
        pipeline: PipelineHandle,
        stages: StageFlags,
        program: Option<ProgramHandle>,
    ) {
        // SAFETY: context is current.
        unsafe { gl::UseProgramStages(pipeline.0, stages.bits(), program.map_or(0, |p| p.0)) }
    }

    fn delete_program_pipeline(&mut self, pipeline: PipelineHandle) {
        // SAFETY: pointer to one valid name.
        unsafe { gl::DeleteProgramPipelines(1, &pipeline.0) }
    }

    fn create_uniform_buffer(&mut self, size: usize) -> BufferHandle {
        let mut buffer: GLuint = 0;
        // SAFETY: `buffer` is a valid out pointer; a null data pointer only
        // allocates storage.
        unsafe {
            gl::GenBuffers(1, &mut buffer);
            gl::BindBuffer(gl::UNIFORM_BUFFER, buffer);
            gl::BufferData(gl::UNIFORM_BUFFER, size as GLsizeiptr, ptr::null(), gl::DYNAMIC_DRAW);
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
        }
        BufferHandle(buffer)
    }

    fn buffer_sub_data(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) {
        // SAFETY: `data` is valid for `data.len()` bytes during the call.
        unsafe {
            gl::BindBuffer(gl::UNIFORM_BUFFER, buffer.0);
            gl::BufferSubData(
                gl::UNIFORM_BUFFER,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            );
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        // SAFETY: pointer to one valid name.
        unsafe { gl::DeleteBuffers(1, &buffer.0) }
    }

    fn supports_separate_shader_objects(&self) -> bool {
        self.separate_shader_objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_info_log_empty_when_short() {
        let log = read_info_log(1, |_, _, _| panic!("must not read a one-byte log"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_read_info_log_truncates_to_written() {
        let log = read_info_log(16, |cap, written, buf| {
            let msg = b"0:1: error";
            assert_eq!(cap, 16);
            // SAFETY: the buffer provided by read_info_log holds `cap` bytes.
            unsafe {
                std::ptr::copy_nonoverlapping(msg.as_ptr() as *const GLchar, buf, msg.len());
                *written = msg.len() as GLsizei;
            }
        });
        assert_eq!(log, "0:1: error");
    }

    #[test]
    fn test_sso_requires_core_version_or_extension() {
        assert!(has_separate_shader_objects((4, 1), std::iter::empty(), true));
        assert!(has_separate_shader_objects((4, 6), std::iter::empty(), true));
        assert!(!has_separate_shader_objects((3, 3), std::iter::empty(), true));
        assert!(!has_separate_shader_objects((4, 0), ["GL_ARB_sync"].into_iter(), true));
        assert!(has_separate_shader_objects(
            (3, 3),
            ["GL_ARB_sync", "GL_ARB_separate_shader_objects"].into_iter(),
            true
        ));
    }

    #[test]
    fn test_sso_requires_loaded_entry_points() {
        assert!(!has_separate_shader_objects((4, 5), std::iter::empty(), false));
        assert!(!has_separate_shader_objects((3, 3), ["GL_ARB_separate_shader_objects"].into_iter(), false));
    }

    #[test]
    fn test_c_name_rejects_interior_nul() {
        assert!(c_name("tex0").is_some());
        assert!(c_name("te\0x").is_none());
    }
}
