//! Shader unit setup: uniform register file, program code and swizzle data.

use crate::float24::Float24;
use crate::math::Vec4;
use crate::regs::{ShaderRegs, NUM_BOOL_UNIFORMS, NUM_FLOAT_UNIFORMS};
use crc::{Crc, CRC_64_XZ};
use std::cell::Cell;

/// Program memory size in instruction words.
pub const MAX_PROGRAM_CODE_LENGTH: usize = 4096;
/// Operand descriptor memory size in words.
pub const MAX_SWIZZLE_DATA_LENGTH: usize = 4096;

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_XZ);

/// Uniform register file of one shader unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniforms {
    pub f: [Vec4<Float24>; NUM_FLOAT_UNIFORMS],
    pub b: [bool; NUM_BOOL_UNIFORMS],
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            f: [Vec4::default(); NUM_FLOAT_UNIFORMS],
            b: [false; NUM_BOOL_UNIFORMS],
        }
    }
}

/// Everything the shader unit executes with, apart from its register block.
///
/// Content hashes of the program and swizzle memories are cached and
/// recomputed only after a write.
#[derive(Clone, Debug)]
pub struct ShaderSetup {
    pub uniforms: Uniforms,
    program_code: Vec<u32>,
    swizzle_data: Vec<u32>,
    program_code_hash: Cell<Option<u64>>,
    swizzle_data_hash: Cell<Option<u64>>,
}

impl Default for ShaderSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderSetup {
    pub fn new() -> Self {
        Self {
            uniforms: Uniforms::default(),
            program_code: vec![0; MAX_PROGRAM_CODE_LENGTH],
            swizzle_data: vec![0; MAX_SWIZZLE_DATA_LENGTH],
            program_code_hash: Cell::new(None),
            swizzle_data_hash: Cell::new(None),
        }
    }

    pub fn program_code(&self) -> &[u32] {
        &self.program_code
    }

    pub fn swizzle_data(&self) -> &[u32] {
        &self.swizzle_data
    }

    /// Store one instruction word. Offsets wrap at the memory size, as on hardware.
    pub fn write_program_code(&mut self, offset: usize, word: u32) {
        self.program_code[offset % MAX_PROGRAM_CODE_LENGTH] = word;
        self.program_code_hash.set(None);
    }

    /// Store one operand descriptor word. Offsets wrap at the memory size.
    pub fn write_swizzle_data(&mut self, offset: usize, word: u32) {
        self.swizzle_data[offset % MAX_SWIZZLE_DATA_LENGTH] = word;
        self.swizzle_data_hash.set(None);
    }

    /// Latch the boolean uniforms from the register block.
    pub fn update_bool_uniforms(&mut self, regs: &ShaderRegs) {
        for (index, value) in self.uniforms.b.iter_mut().enumerate() {
            *value = regs.bool_uniform(index);
        }
    }

    pub fn program_code_hash(&self) -> u64 {
        Self::cached_hash(&self.program_code_hash, &self.program_code)
    }

    pub fn swizzle_data_hash(&self) -> u64 {
        Self::cached_hash(&self.swizzle_data_hash, &self.swizzle_data)
    }

    fn cached_hash(cache: &Cell<Option<u64>>, words: &[u32]) -> u64 {
        if let Some(hash) = cache.get() {
            return hash;
        }
        let hash = CRC64.checksum(bytemuck::cast_slice(words));
        cache.set(Some(hash));
        hash
    }
}
