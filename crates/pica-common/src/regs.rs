//! PICA register blocks read by the hardware renderer.
//!
//! Only the fields that feed shader configuration and uniform upload are
//! modelled. Field packing follows the hardware register encoding so values
//! can be copied straight from the emulated register file.

/// Number of integer uniform registers per shader unit.
pub const NUM_INT_UNIFORMS: usize = 4;
/// Number of boolean uniform registers per shader unit.
pub const NUM_BOOL_UNIFORMS: usize = 16;
/// Number of float uniform registers per shader unit.
pub const NUM_FLOAT_UNIFORMS: usize = 96;
/// Number of shader unit input/output registers.
pub const NUM_IO_REGISTERS: usize = 16;
/// Number of vertex output attribute registers in the rasterizer block.
pub const NUM_VS_OUTPUT_ATTRIBUTES: usize = 7;

/// Number of distinct output semantics (position, quaternion, color, texcoords, view).
pub const NUM_SEMANTICS: usize = 24;
/// Semantic id marking an unused output component.
pub const INVALID_SEMANTIC: u32 = 0x1F;

/// One packed integer uniform register: four unsigned bytes, x in the low byte.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntUniform(pub u32);

impl IntUniform {
    pub const fn new(x: u8, y: u8, z: u8, w: u8) -> Self {
        Self(x as u32 | (y as u32) << 8 | (z as u32) << 16 | (w as u32) << 24)
    }

    #[inline]
    pub const fn x(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn y(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn z(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn w(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// Register block of one shader unit (vertex or geometry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShaderRegs {
    /// Boolean uniforms, one per bit (low 16 bits).
    pub bool_uniforms: u32,
    pub int_uniforms: [IntUniform; NUM_INT_UNIFORMS],
    /// Highest input attribute index in use.
    pub max_input_attribute_index: u32,
    /// Input register for attributes 0-7, four bits each.
    pub input_attribute_to_register_map_low: u32,
    /// Input register for attributes 8-15, four bits each.
    pub input_attribute_to_register_map_high: u32,
    /// Output registers written by the program.
    pub output_mask: u32,
    /// Program entry point, in instruction words.
    pub main_offset: u32,
}

impl ShaderRegs {
    /// Input register that receives attribute `attr`.
    pub fn register_for_attribute(&self, attr: u32) -> u32 {
        if attr < 8 {
            (self.input_attribute_to_register_map_low >> (attr * 4)) & 0xF
        } else {
            (self.input_attribute_to_register_map_high >> ((attr - 8) * 4)) & 0xF
        }
    }

    #[inline]
    pub fn bool_uniform(&self, index: usize) -> bool {
        index < NUM_BOOL_UNIFORMS && (self.bool_uniforms >> index) & 1 != 0
    }

    /// Highest input attribute index (4-bit field).
    #[inline]
    pub fn max_input_attribute_index(&self) -> u32 {
        self.max_input_attribute_index & 0xF
    }

    /// Output register mask (16-bit field).
    #[inline]
    pub fn output_mask(&self) -> u32 {
        self.output_mask & 0xFFFF
    }

    /// Entry point (16-bit field).
    #[inline]
    pub fn main_offset(&self) -> u32 {
        self.main_offset & 0xFFFF
    }
}

/// Semantic assignment of the four components of one vertex output register.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VsOutputAttributes(pub u32);

impl VsOutputAttributes {
    pub const fn new(x: u32, y: u32, z: u32, w: u32) -> Self {
        Self((x & 0x1F) | (y & 0x1F) << 8 | (z & 0x1F) << 16 | (w & 0x1F) << 24)
    }

    /// Semantics of the x, y, z, w components.
    pub const fn semantics(self) -> [u32; 4] {
        [
            self.0 & 0x1F,
            (self.0 >> 8) & 0x1F,
            (self.0 >> 16) & 0x1F,
            (self.0 >> 24) & 0x1F,
        ]
    }
}

impl Default for VsOutputAttributes {
    fn default() -> Self {
        Self::new(INVALID_SEMANTIC, INVALID_SEMANTIC, INVALID_SEMANTIC, INVALID_SEMANTIC)
    }
}

/// Rasterizer registers describing how vertex outputs are consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterizerRegs {
    /// Number of valid entries in `vs_output_attributes`.
    pub vs_output_total: u32,
    pub vs_output_attributes: [VsOutputAttributes; NUM_VS_OUTPUT_ATTRIBUTES],
}

/// Geometry pipeline registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineRegs {
    /// Vertex output attribute count minus one, as seen by the geometry shader.
    pub vs_outmap_total_minus_1_a: u32,
}

impl PipelineRegs {
    /// `vs_outmap_total_minus_1_a` as a 4-bit field.
    #[inline]
    pub fn vs_outmap_total_minus_1_a(&self) -> u32 {
        self.vs_outmap_total_minus_1_a & 0xF
    }
}

/// Register file snapshot consumed by the shader configuration builders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Regs {
    pub vs: ShaderRegs,
    pub gs: ShaderRegs,
    pub rasterizer: RasterizerRegs,
    pub pipeline: PipelineRegs,
}
