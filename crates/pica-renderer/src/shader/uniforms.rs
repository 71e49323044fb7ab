//! Uniform Buffer Object (UBO) definitions
//!
//! Host-side mirrors of the std140 uniform blocks declared by the generated
//! GLSL. Field order, padding and total size must match the shader side byte
//! for byte; the `const` assertions below turn any drift into a build error.
//!
//! Every block ends with a vec4. GL does not say whether trailing padding is
//! counted in `UNIFORM_BLOCK_DATA_SIZE`, and some drivers disagree, so a full
//! width last member pins the size.

use crate::gpu_device::{BufferHandle, GpuDevice};
use bytemuck::{Pod, Zeroable};
use pica_common::regs::{NUM_BOOL_UNIFORMS, NUM_FLOAT_UNIFORMS, NUM_INT_UNIFORMS};
use pica_common::{ShaderRegs, ShaderSetup};
use std::marker::PhantomData;
use std::mem::{offset_of, size_of};

/// Minimum `GL_MAX_UNIFORM_BLOCK_SIZE` every GL 3.3 implementation provides.
pub const MIN_MAX_UNIFORM_BLOCK_SIZE: usize = 16384;

/// Number of hardware light sources.
pub const NUM_LIGHTS: usize = 8;
/// Number of texture combiner stages.
pub const NUM_TEV_STAGES: usize = 6;

/// Uniform block binding points.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformBindings {
    Common = 0,
    Vs = 1,
    Gs = 2,
}

impl UniformBindings {
    pub const COUNT: usize = 3;
    pub const ALL: [UniformBindings; Self::COUNT] = [Self::Common, Self::Vs, Self::Gs];

    /// Block name in the generated GLSL.
    pub const fn block_name(self) -> &'static str {
        match self {
            UniformBindings::Common => "shader_data",
            UniformBindings::Vs => "vs_config",
            UniformBindings::Gs => "gs_config",
        }
    }

    /// Size of the host record backing the block.
    pub const fn data_size(self) -> usize {
        match self {
            UniformBindings::Common => size_of::<UniformData>(),
            UniformBindings::Vs => size_of::<VsUniformData>(),
            UniformBindings::Gs => size_of::<GsUniformData>(),
        }
    }
}

// ============================================================================
// Common block (binding = 0)
// ============================================================================

/// One fragment lighting source. Each vec3 occupies a 16-byte slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LightSrc {
    pub specular_0: [f32; 3],
    pub _pad0: f32,
    pub specular_1: [f32; 3],
    pub _pad1: f32,
    pub diffuse: [f32; 3],
    pub _pad2: f32,
    pub ambient: [f32; 3],
    pub _pad3: f32,
    pub position: [f32; 3],
    pub _pad4: f32,
    /// Negated.
    pub spot_direction: [f32; 3],
    /// Packed into the tail of `spot_direction`'s slot.
    pub dist_atten_bias: f32,
    pub dist_atten_scale: f32,
    pub _pad5: [f32; 3],
}

/// Rasterizer and fragment uniforms shared by every program.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct UniformData {
    pub framebuffer_scale: i32,
    pub alphatest_ref: i32,
    pub depth_scale: f32,
    pub depth_offset: f32,
    pub scissor_x1: i32,
    pub scissor_y1: i32,
    pub scissor_x2: i32,
    pub scissor_y2: i32,
    pub fog_color: [f32; 3],
    pub _pad0: f32,
    pub proctex_noise_f: [f32; 2],
    pub proctex_noise_a: [f32; 2],
    pub proctex_noise_p: [f32; 2],
    pub _pad1: [f32; 2],
    pub lighting_global_ambient: [f32; 3],
    pub _pad2: f32,
    pub light_src: [LightSrc; NUM_LIGHTS],
    /// Constant color of each texture combiner stage.
    pub const_color: [[f32; 4]; NUM_TEV_STAGES],
    pub tev_combiner_buffer_color: [f32; 4],
    pub clip_coef: [f32; 4],
}

impl Default for UniformData {
    fn default() -> Self {
        Self::zeroed()
    }
}

const _: () = assert!(size_of::<LightSrc>() == 112);
const _: () = assert!(offset_of!(LightSrc, dist_atten_bias) == 92);
const _: () = assert!(offset_of!(UniformData, fog_color) == 32);
const _: () = assert!(offset_of!(UniformData, proctex_noise_f) == 48);
const _: () = assert!(offset_of!(UniformData, lighting_global_ambient) == 80);
const _: () = assert!(offset_of!(UniformData, light_src) == 96);
const _: () = assert!(offset_of!(UniformData, const_color) == 992);
const _: () = assert!(offset_of!(UniformData, clip_coef) == 1104);
const _: () = assert!(
    size_of::<UniformData>() == 0x460,
    "The size of UniformData has changed, update the block in the shader"
);
const _: () = assert!(size_of::<UniformData>() < MIN_MAX_UNIFORM_BLOCK_SIZE);

// ============================================================================
// Shader unit blocks (binding = 1, 2)
// ============================================================================

/// A boolean uniform in its own 16-byte slot (std140 scalar array stride).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct BoolAligned {
    pub b: u32,
    pub _pad: [u32; 3],
}

/// PICA shader unit uniform registers, indexed exactly as on hardware.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PicaUniformsData {
    pub bools: [BoolAligned; NUM_BOOL_UNIFORMS],
    pub i: [[u32; 4]; NUM_INT_UNIFORMS],
    pub f: [[f32; 4]; NUM_FLOAT_UNIFORMS],
}

impl Default for PicaUniformsData {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl PicaUniformsData {
    /// Copy the uniform register file. Register `n` lands in slot `n` of the
    /// matching array: booleans and floats from the setup, integers from the
    /// register block.
    pub fn set_from_regs(&mut self, regs: &ShaderRegs, setup: &ShaderSetup) {
        for (dst, &value) in self.bools.iter_mut().zip(setup.uniforms.b.iter()) {
            *dst = BoolAligned { b: value as u32, _pad: [0; 3] };
        }
        for (dst, value) in self.i.iter_mut().zip(regs.int_uniforms.iter()) {
            *dst = [value.x(), value.y(), value.z(), value.w()].map(u32::from);
        }
        for (dst, value) in self.f.iter_mut().zip(setup.uniforms.f.iter()) {
            *dst = value.map(|c| c.to_f32()).to_array();
        }
    }
}

/// Vertex shader unit block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VsUniformData {
    pub uniforms: PicaUniformsData,
}

/// Geometry shader unit block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GsUniformData {
    pub uniforms: PicaUniformsData,
}

const _: () = assert!(offset_of!(PicaUniformsData, i) == 256);
const _: () = assert!(offset_of!(PicaUniformsData, f) == 320);
const _: () = assert!(
    size_of::<VsUniformData>() == 1856,
    "The size of VsUniformData has changed, update the block in the shader"
);
const _: () = assert!(size_of::<VsUniformData>() < MIN_MAX_UNIFORM_BLOCK_SIZE);
const _: () = assert!(
    size_of::<GsUniformData>() == 1856,
    "The size of GsUniformData has changed, update the block in the shader"
);
const _: () = assert!(size_of::<GsUniformData>() < MIN_MAX_UNIFORM_BLOCK_SIZE);

// ============================================================================
// Uniform buffer
// ============================================================================

/// A GL uniform buffer sized for one host record.
///
/// Uploads always replace the whole record.
pub struct UniformBuffer<T> {
    buffer: BufferHandle,
    binding: UniformBindings,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformBuffer<T> {
    /// Allocate device storage for `T` at the given binding point.
    pub fn new<D: GpuDevice>(device: &mut D, binding: UniformBindings) -> Self {
        Self {
            buffer: device.create_uniform_buffer(size_of::<T>()),
            binding,
            _marker: PhantomData,
        }
    }

    /// Replace the buffer contents with `data`.
    pub fn update<D: GpuDevice>(&self, device: &mut D, data: &T) {
        device.buffer_sub_data(self.buffer, 0, bytemuck::bytes_of(data));
    }

    pub fn binding(&self) -> UniformBindings {
        self.binding
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Release the device storage. The buffer must not be used afterwards.
    pub fn release<D: GpuDevice>(&self, device: &mut D) {
        device.delete_buffer(self.buffer);
    }
}
