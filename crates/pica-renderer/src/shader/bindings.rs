//! Uniform block and sampler binding points.
//!
//! Generated GLSL targets GL 3.3 without `layout(binding = N)`, so every new
//! program gets its blocks and samplers assigned here.

use super::uniforms::UniformBindings;
use crate::error::ShaderError;
use crate::gpu_device::{GpuDevice, ProgramHandle};
use tracing::error;

/// Texture unit assignment of every sampler the generated shaders may declare.
pub const SAMPLER_BINDINGS: [(&str, i32); 7] = [
    ("tex0", 0),
    ("tex1", 1),
    ("tex2", 2),
    ("tex_cube", 3),
    ("texture_buffer_lut_lf", 4),
    ("texture_buffer_lut_rg", 5),
    ("texture_buffer_lut_rgba", 6),
];

/// Bind the program's uniform blocks to their fixed binding points.
///
/// Blocks the program does not declare are skipped. A declared block whose
/// device size differs from the host record is an error.
pub fn set_uniform_block_bindings<D: GpuDevice>(
    device: &mut D,
    program: ProgramHandle,
) -> Result<(), ShaderError> {
    for binding in UniformBindings::ALL {
        let block = binding.block_name();
        let Some(index) = device.uniform_block_index(program, block) else {
            continue;
        };

        let actual = device.uniform_block_data_size(program, index);
        let expected = binding.data_size();
        if actual != expected {
            error!("uniform block {} size mismatch: got {}, expected {}", block, actual, expected);
            return Err(ShaderError::UniformBlockSize { block, expected, actual });
        }

        device.uniform_block_binding(program, index, binding as u32);
    }
    Ok(())
}

/// Point the program's samplers at their texture units.
///
/// Sampler uniforms can only be set on the current program; the previously
/// current program is restored afterwards.
pub fn set_sampler_bindings<D: GpuDevice>(device: &mut D, program: ProgramHandle) {
    let previous = device.current_program();
    device.use_program(Some(program));

    for (name, unit) in SAMPLER_BINDINGS {
        if let Some(location) = device.uniform_location(program, name) {
            device.uniform_1i(location, unit);
        }
    }

    device.use_program(previous);
}

/// Finish a freshly linked program: bind its uniform blocks and samplers.
///
/// The program is deleted if its uniform blocks do not match the host records.
pub fn bind_program_interface<D: GpuDevice>(
    device: &mut D,
    program: ProgramHandle,
) -> Result<ProgramHandle, ShaderError> {
    if let Err(err) = set_uniform_block_bindings(device, program) {
        device.delete_program(program);
        return Err(err);
    }
    set_sampler_bindings(device, program);
    Ok(program)
}
