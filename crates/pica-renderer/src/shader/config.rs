//! Shader configuration keys
//!
//! Snapshots of the register state that decides what a generated stage does.
//! Keys are plain integer records with no implicit padding, so structural
//! equality and hashing are the same as comparing and hashing their bytes.
//! Each stage kind has its own key type.

use super::uniforms::NUM_TEV_STAGES;
use bytemuck::{Pod, Zeroable};
use crc::{Crc, CRC_64_XZ};
use pica_common::regs::{INVALID_SEMANTIC, NUM_IO_REGISTERS, NUM_SEMANTICS, NUM_VS_OUTPUT_ATTRIBUTES};
use pica_common::{Regs, ShaderRegs, ShaderSetup};
use std::hash::Hash;
use tracing::error;

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_XZ);

/// Map entry for an I/O register that is not used.
pub const UNUSED_REGISTER: u32 = NUM_IO_REGISTERS as u32;

/// A cache key for one stage kind.
pub trait ShaderConfig: Pod + Eq + Hash {
    /// 64-bit digest of the key bytes, for logs.
    fn fingerprint(&self) -> u64 {
        CRC64.checksum(bytemuck::bytes_of(self))
    }
}

// ============================================================================
// Shader unit configuration (vertex and geometry programs)
// ============================================================================

/// State shared by every stage translated from a PICA shader program.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PicaShaderConfigCommon {
    pub program_hash: u64,
    pub swizzle_hash: u64,
    pub main_offset: u32,
    /// Non-zero to emulate the hardware's `0 * inf = 0` multiply.
    pub sanitize_mul: u32,
    pub num_outputs: u32,
    /// Output slot for each output register, `UNUSED_REGISTER` if not written.
    pub output_map: [u32; NUM_IO_REGISTERS],
    pub _pad: u32,
}

impl Default for PicaShaderConfigCommon {
    fn default() -> Self {
        Self {
            output_map: [UNUSED_REGISTER; NUM_IO_REGISTERS],
            ..Self::zeroed()
        }
    }
}

impl PicaShaderConfigCommon {
    /// Capture the program identity and output layout of one shader unit.
    pub fn from_regs(regs: &ShaderRegs, setup: &ShaderSetup, sanitize_mul: bool) -> Self {
        let mut config = Self {
            program_hash: setup.program_code_hash(),
            swizzle_hash: setup.swizzle_data_hash(),
            main_offset: regs.main_offset(),
            sanitize_mul: sanitize_mul as u32,
            ..Self::default()
        };

        for reg in 0..NUM_IO_REGISTERS {
            if regs.output_mask() & (1 << reg) != 0 {
                config.output_map[reg] = config.num_outputs;
                config.num_outputs += 1;
            }
        }

        config
    }
}

/// Programmable vertex stage key.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PicaVsConfig {
    pub common: PicaShaderConfigCommon,
}

impl PicaVsConfig {
    pub fn from_regs(regs: &ShaderRegs, setup: &ShaderSetup, sanitize_mul: bool) -> Self {
        Self {
            common: PicaShaderConfigCommon::from_regs(regs, setup, sanitize_mul),
        }
    }
}

impl ShaderConfig for PicaVsConfig {}

// ============================================================================
// Geometry configuration
// ============================================================================

/// Where one output semantic lives in the vertex output.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct AttributeMap {
    pub attribute: u32,
    pub component: u32,
}

impl AttributeMap {
    /// Semantic not produced by any output.
    pub const UNMAPPED: Self = Self {
        attribute: UNUSED_REGISTER,
        component: 0,
    };
}

/// Fixed geometry stage key: vertex output layout as seen by the rasterizer.
///
/// Shared by every full geometry configuration with the same output layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PicaGsConfigCommon {
    pub vs_output_attributes: u32,
    pub gs_output_attributes: u32,
    pub semantic_maps: [AttributeMap; NUM_SEMANTICS],
}

impl Default for PicaGsConfigCommon {
    fn default() -> Self {
        Self {
            vs_output_attributes: 0,
            gs_output_attributes: 0,
            semantic_maps: [AttributeMap::UNMAPPED; NUM_SEMANTICS],
        }
    }
}

impl PicaGsConfigCommon {
    pub fn from_regs(regs: &Regs) -> Self {
        let vs_output_attributes = regs.vs.output_mask().count_ones();
        let mut config = Self {
            vs_output_attributes,
            gs_output_attributes: vs_output_attributes,
            ..Self::default()
        };

        let total = (regs.rasterizer.vs_output_total as usize).min(NUM_VS_OUTPUT_ATTRIBUTES);
        for (attribute, output) in regs.rasterizer.vs_output_attributes[..total].iter().enumerate() {
            for (component, semantic) in output.semantics().into_iter().enumerate() {
                if (semantic as usize) < NUM_SEMANTICS {
                    config.semantic_maps[semantic as usize] = AttributeMap {
                        attribute: attribute as u32,
                        component: component as u32,
                    };
                } else if semantic != INVALID_SEMANTIC {
                    error!("Invalid/unknown semantic id: {}", semantic);
                }
            }
        }

        config
    }
}

impl ShaderConfig for PicaGsConfigCommon {}

/// Programmable geometry stage key.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PicaGsConfig {
    pub common: PicaShaderConfigCommon,
    pub gs: PicaGsConfigCommon,
    pub num_inputs: u32,
    pub attributes_per_vertex: u32,
    /// Attribute index feeding each input register, `UNUSED_REGISTER` if none.
    pub input_map: [u32; NUM_IO_REGISTERS],
}

impl Default for PicaGsConfig {
    fn default() -> Self {
        Self {
            common: PicaShaderConfigCommon::default(),
            gs: PicaGsConfigCommon::default(),
            num_inputs: 0,
            attributes_per_vertex: 0,
            input_map: [UNUSED_REGISTER; NUM_IO_REGISTERS],
        }
    }
}

impl PicaGsConfig {
    pub fn from_regs(regs: &Regs, setup: &ShaderSetup, sanitize_mul: bool) -> Self {
        let mut config = Self {
            common: PicaShaderConfigCommon::from_regs(&regs.gs, setup, sanitize_mul),
            gs: PicaGsConfigCommon::from_regs(regs),
            num_inputs: regs.gs.max_input_attribute_index() + 1,
            attributes_per_vertex: regs.pipeline.vs_outmap_total_minus_1_a() + 1,
            ..Self::default()
        };

        for attr in 0..config.num_inputs {
            config.input_map[regs.gs.register_for_attribute(attr) as usize] = attr;
        }
        config.gs.gs_output_attributes = regs.gs.output_mask().count_ones();

        config
    }
}

impl ShaderConfig for PicaGsConfig {}

// ============================================================================
// Fragment configuration
// ============================================================================

/// Raw combiner registers of one texture combiner stage.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct TevStageConfig {
    pub sources_raw: u32,
    pub modifiers_raw: u32,
    pub ops_raw: u32,
    pub scales_raw: u32,
}

/// Fragment stage key: fixed-function per-fragment state.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PicaFsConfig {
    pub alpha_test_func: u32,
    pub scissor_test_mode: u32,
    pub texture0_type: u32,
    pub texture2_use_coord1: u32,
    pub tev_stages: [TevStageConfig; NUM_TEV_STAGES],
    pub combiner_buffer_input: u32,
    pub depthmap_enable: u32,
    pub fog_mode: u32,
    pub fog_flip: u32,
    pub lighting_enable: u32,
    pub lighting_src_num: u32,
    pub proctex_enable: u32,
    pub shadow_rendering: u32,
}

impl ShaderConfig for PicaFsConfig {}
