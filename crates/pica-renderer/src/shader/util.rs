//! Shader load/link helpers.
//!
//! Stateless wrappers around compile and link that turn driver status into
//! `ShaderError` and log the driver's diagnostics. Nothing here retries or
//! touches the source.

use crate::error::ShaderError;
use crate::gpu_device::{GpuDevice, ProgramHandle, ShaderHandle, ShaderKind};
use tracing::{debug, error};

/// Create and compile a GLSL shader of the given kind.
///
/// On failure the shader object is deleted and the info log is returned in
/// the error.
pub fn load_shader<D: GpuDevice>(
    device: &mut D,
    source: &str,
    kind: ShaderKind,
) -> Result<ShaderHandle, ShaderError> {
    let shader = device.create_shader(kind);
    device.shader_source(shader, source);
    debug!("Compiling {} shader...", kind);
    device.compile_shader(shader);

    let compiled = device.shader_compile_status(shader);
    let log = device.shader_info_log(shader);

    if compiled {
        if !log.is_empty() {
            debug!("{}", log);
        }
        return Ok(shader);
    }

    error!("Error compiling {} shader:\n{}", kind, log);
    error!("Shader source code:\n{}", source);
    device.delete_shader(shader);
    Err(ShaderError::Compile { kind, log })
}

/// Create and link a program from compiled shaders.
///
/// `separable` must match how the caller intends to bind the program: a
/// separable program goes into a program pipeline, a monolithic one is used
/// directly. Shaders are detached again after linking so they can be deleted
/// independently of the program.
pub fn load_program<D: GpuDevice>(
    device: &mut D,
    separable: bool,
    shaders: &[ShaderHandle],
) -> Result<ProgramHandle, ShaderError> {
    debug!("Linking program...");
    let program = device.create_program();

    for &shader in shaders {
        device.attach_shader(program, shader);
    }
    if separable {
        device.set_program_separable(program, true);
    }

    device.link_program(program);

    let linked = device.program_link_status(program);
    let log = device.program_info_log(program);

    for &shader in shaders {
        device.detach_shader(program, shader);
    }

    if linked {
        if !log.is_empty() {
            debug!("{}", log);
        }
        return Ok(program);
    }

    error!("Error linking shader:\n{}", log);
    device.delete_program(program);
    Err(ShaderError::Link { log })
}
