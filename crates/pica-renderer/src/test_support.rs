//! Recording device and source generator for unit tests.

use crate::gpu_device::{
    BufferHandle, GpuDevice, PipelineHandle, ProgramHandle, ShaderHandle, ShaderKind, StageFlags,
};
use crate::shader::config::{PicaFsConfig, PicaGsConfig, PicaGsConfigCommon, PicaVsConfig, ShaderConfig};
use crate::shader::{ShaderGenerator, UniformBindings};
use crate::state::RenderState;
use pica_common::ShaderSetup;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Sources containing this fail to compile.
pub const COMPILE_ERROR: &str = "MOCK_COMPILE_ERROR";
/// Programs linked from a source containing this fail to link.
pub const LINK_ERROR: &str = "MOCK_LINK_ERROR";
/// First line of every source generated for a separable program.
pub const SEPARABLE_HEADER: &str = "out gl_PerVertex { vec4 gl_Position; };";

const STAGE_SLOTS: [ShaderKind; 3] = [ShaderKind::Vertex, ShaderKind::Geometry, ShaderKind::Fragment];

/// Whether `source` contains `name` as a whole identifier.
fn declares(source: &str, name: &str) -> bool {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|token| token == name)
}

// ============================================================================
// Device
// ============================================================================

/// Everything the mock device has been asked to do.
#[derive(Debug, Default)]
pub struct MockLog {
    next_id: u32,
    next_location: i32,
    pub supports_sso: bool,

    pub compiles: usize,
    pub links: usize,
    pub shader_kinds: HashMap<u32, ShaderKind>,
    pub shader_sources: HashMap<u32, String>,
    compiled: HashMap<u32, bool>,
    pub deleted_shaders: Vec<u32>,

    pub attached: HashMap<u32, Vec<u32>>,
    pub separable_programs: HashSet<u32>,
    /// Stage sources a program was linked from, in attach order.
    pub program_sources: HashMap<u32, Vec<(ShaderKind, String)>>,
    linked: HashMap<u32, bool>,
    pub deleted_programs: Vec<u32>,
    pub current_program: Option<u32>,

    pub block_bindings: HashMap<u32, HashMap<String, u32>>,
    /// Device-reported block sizes that differ from the host records.
    pub block_size_override: HashMap<String, usize>,
    locations: HashMap<i32, (u32, String)>,
    pub sampler_units: HashMap<u32, HashMap<String, i32>>,

    /// Program attached to the vertex, geometry and fragment slot.
    pub pipeline_stages: HashMap<u32, [Option<u32>; 3]>,
    pub use_program_stages_calls: usize,
    pub deleted_pipelines: Vec<u32>,

    pub buffer_sizes: HashMap<u32, usize>,
    pub buffer_contents: HashMap<u32, Vec<u8>>,
    pub deleted_buffers: Vec<u32>,
}

impl MockLog {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn declared(&self, program: u32, name: &str) -> bool {
        self.program_sources
            .get(&program)
            .is_some_and(|sources| sources.iter().any(|(_, source)| declares(source, name)))
    }

    /// Program attached to `kind`'s slot of a pipeline.
    pub fn pipeline_program(&self, pipeline: u32, kind: ShaderKind) -> Option<u32> {
        let slot = STAGE_SLOTS.iter().position(|k| *k == kind)?;
        self.pipeline_stages.get(&pipeline)?[slot]
    }

    /// Stage sources a draw with `state` would run, separable headers removed.
    pub fn effective_sources(&self, state: &RenderState) -> Vec<(ShaderKind, String)> {
        let programs: Vec<u32> = match (state.draw.shader_program, state.draw.program_pipeline) {
            (Some(program), _) => vec![program.0],
            (None, Some(pipeline)) => self.pipeline_stages[&pipeline.0].iter().flatten().copied().collect(),
            (None, None) => Vec::new(),
        };

        let header = format!("{}\n", SEPARABLE_HEADER);
        programs
            .iter()
            .flat_map(|program| self.program_sources[program].iter())
            .map(|(kind, source)| (*kind, source.replace(&header, "")))
            .collect()
    }

    /// Objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        let shaders = self.shader_kinds.keys().filter(|id| !self.deleted_shaders.contains(id)).count();
        let programs = self.attached.keys().filter(|id| !self.deleted_programs.contains(id)).count();
        let pipelines = self.pipeline_stages.keys().filter(|id| !self.deleted_pipelines.contains(id)).count();
        let buffers = self.buffer_sizes.keys().filter(|id| !self.deleted_buffers.contains(id)).count();
        shaders + programs + pipelines + buffers
    }
}

/// `GpuDevice` that records calls instead of talking to a driver.
///
/// Clones share one log, so a test can keep a handle after moving the device
/// into a manager.
#[derive(Debug, Clone)]
pub struct MockDevice(Rc<RefCell<MockLog>>);

impl MockDevice {
    pub fn new() -> Self {
        let log = MockLog {
            supports_sso: true,
            ..Default::default()
        };
        Self(Rc::new(RefCell::new(log)))
    }

    pub fn without_separate_shader_objects() -> Self {
        let device = Self::new();
        device.log_mut().supports_sso = false;
        device
    }

    pub fn log(&self) -> Ref<'_, MockLog> {
        self.0.borrow()
    }

    pub fn log_mut(&self) -> RefMut<'_, MockLog> {
        self.0.borrow_mut()
    }
}

impl GpuDevice for MockDevice {
    fn create_shader(&mut self, kind: ShaderKind) -> ShaderHandle {
        let mut log = self.log_mut();
        let id = log.next_id();
        log.shader_kinds.insert(id, kind);
        ShaderHandle(id)
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) {
        self.log_mut().shader_sources.insert(shader.0, source.to_string());
    }

    fn compile_shader(&mut self, shader: ShaderHandle) {
        let mut log = self.log_mut();
        log.compiles += 1;
        let ok = !log.shader_sources[&shader.0].contains(COMPILE_ERROR);
        log.compiled.insert(shader.0, ok);
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.log().compiled.get(&shader.0).copied().unwrap_or(false)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error, unexpected IDENTIFIER".to_string()
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        let mut log = self.log_mut();
        assert!(!log.deleted_shaders.contains(&shader.0), "shader {} deleted twice", shader.0);
        log.deleted_shaders.push(shader.0);
    }

    fn create_program(&mut self) -> ProgramHandle {
        let mut log = self.log_mut();
        let id = log.next_id();
        log.attached.insert(id, Vec::new());
        ProgramHandle(id)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        self.log_mut().attached.entry(program.0).or_default().push(shader.0);
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if let Some(attached) = self.log_mut().attached.get_mut(&program.0) {
            attached.retain(|&s| s != shader.0);
        }
    }

    fn set_program_separable(&mut self, program: ProgramHandle, separable: bool) {
        let mut log = self.log_mut();
        if separable {
            log.separable_programs.insert(program.0);
        } else {
            log.separable_programs.remove(&program.0);
        }
    }

    fn link_program(&mut self, program: ProgramHandle) {
        let mut log = self.log_mut();
        log.links += 1;

        let sources: Vec<(ShaderKind, String)> = log.attached[&program.0]
            .iter()
            .map(|shader| (log.shader_kinds[shader], log.shader_sources[shader].clone()))
            .collect();
        let ok = log.attached[&program.0].iter().all(|shader| log.compiled.get(shader) == Some(&true))
            && !sources.iter().any(|(_, source)| source.contains(LINK_ERROR));

        log.program_sources.insert(program.0, sources);
        log.linked.insert(program.0, ok);
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        self.log().linked.get(&program.0).copied().unwrap_or(false)
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: mock linker rejected the program".to_string()
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        let mut log = self.log_mut();
        assert!(!log.deleted_programs.contains(&program.0), "program {} deleted twice", program.0);
        log.deleted_programs.push(program.0);
    }

    fn current_program(&self) -> Option<ProgramHandle> {
        self.log().current_program.map(ProgramHandle)
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.log_mut().current_program = program.map(|p| p.0);
    }

    fn uniform_block_index(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let log = self.log();
        if !log.declared(program.0, name) {
            return None;
        }
        UniformBindings::ALL
            .iter()
            .position(|binding| binding.block_name() == name)
            .map(|index| index as u32)
    }

    fn uniform_block_data_size(&self, _program: ProgramHandle, index: u32) -> usize {
        let binding = UniformBindings::ALL[index as usize];
        self.log()
            .block_size_override
            .get(binding.block_name())
            .copied()
            .unwrap_or(binding.data_size())
    }

    fn uniform_block_binding(&mut self, program: ProgramHandle, index: u32, binding: u32) {
        let name = UniformBindings::ALL[index as usize].block_name().to_string();
        self.log_mut().block_bindings.entry(program.0).or_default().insert(name, binding);
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<i32> {
        let mut log = self.log_mut();
        if !log.declared(program.0, name) {
            return None;
        }
        log.next_location += 1;
        let location = log.next_location;
        log.locations.insert(location, (program.0, name.to_string()));
        Some(location)
    }

    fn uniform_1i(&mut self, location: i32, value: i32) {
        let mut log = self.log_mut();
        let (program, name) = log.locations[&location].clone();
        assert_eq!(log.current_program, Some(program), "uniform set on a program that is not current");
        log.sampler_units.entry(program).or_default().insert(name, value);
    }

    fn create_program_pipeline(&mut self) -> PipelineHandle {
        let mut log = self.log_mut();
        let id = log.next_id();
        log.pipeline_stages.insert(id, [None; 3]);
        PipelineHandle(id)
    }

    fn use_program_stages(&mut self, pipeline: PipelineHandle, stages: StageFlags, program: Option<ProgramHandle>) {
        let mut log = self.log_mut();
        log.use_program_stages_calls += 1;
        let slots = log.pipeline_stages.get_mut(&pipeline.0).expect("unknown pipeline");
        for (slot, kind) in slots.iter_mut().zip(STAGE_SLOTS) {
            if stages.contains(kind.stage_flags()) {
                *slot = program.map(|p| p.0);
            }
        }
    }

    fn delete_program_pipeline(&mut self, pipeline: PipelineHandle) {
        let mut log = self.log_mut();
        assert!(!log.deleted_pipelines.contains(&pipeline.0), "pipeline {} deleted twice", pipeline.0);
        log.deleted_pipelines.push(pipeline.0);
    }

    fn create_uniform_buffer(&mut self, size: usize) -> BufferHandle {
        let mut log = self.log_mut();
        let id = log.next_id();
        log.buffer_sizes.insert(id, size);
        log.buffer_contents.insert(id, vec![0; size]);
        BufferHandle(id)
    }

    fn buffer_sub_data(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) {
        let mut log = self.log_mut();
        let contents = log.buffer_contents.get_mut(&buffer.0).expect("unknown buffer");
        contents[offset..offset + data.len()].copy_from_slice(data);
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        let mut log = self.log_mut();
        assert!(!log.deleted_buffers.contains(&buffer.0), "buffer {} deleted twice", buffer.0);
        log.deleted_buffers.push(buffer.0);
    }

    fn supports_separate_shader_objects(&self) -> bool {
        self.log().supports_sso
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Generates small GLSL-like sources that identify their configuration.
///
/// Programmable vertex sources depend only on the program hash and entry
/// point, so configurations differing in swizzle data translate identically.
#[derive(Debug, Clone, Default)]
pub struct TestGenerator {
    /// Number of generator calls, shared between clones.
    pub calls: Rc<Cell<usize>>,
    pub trivial_vertex_source: Option<String>,
    pub trivial_geometry_source: Option<String>,
    pub no_trivial_geometry: bool,
    pub fail_program_translation: bool,
}

impl TestGenerator {
    /// Alpha test function value whose fragment source fails to compile.
    pub const BROKEN_ALPHA_FUNC: u32 = 0xBAD;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn source(&self, separable: bool, body: String) -> String {
        self.calls.set(self.calls.get() + 1);
        if separable {
            format!("{}\n{}", SEPARABLE_HEADER, body)
        } else {
            body
        }
    }
}

impl ShaderGenerator for TestGenerator {
    fn trivial_vertex_shader(&self, separable: bool) -> String {
        let body = self.trivial_vertex_source.clone().unwrap_or_else(|| {
            "// trivial vertex\nuniform shader_data {};\nuniform vs_config {};\nvoid main() {}\n".to_string()
        });
        self.source(separable, body)
    }

    fn trivial_geometry_shader(&self, separable: bool) -> Option<String> {
        if self.no_trivial_geometry {
            self.calls.set(self.calls.get() + 1);
            return None;
        }
        let body = self
            .trivial_geometry_source
            .clone()
            .unwrap_or_else(|| "// trivial geometry\nvoid main() {}\n".to_string());
        Some(self.source(separable, body))
    }

    fn vertex_shader(&self, _setup: &ShaderSetup, config: &PicaVsConfig, separable: bool) -> Option<String> {
        if self.fail_program_translation {
            self.calls.set(self.calls.get() + 1);
            return None;
        }
        let body = format!(
            "// vertex program {:016x} entry {}\nuniform vs_config {{}};\nvoid main() {{}}\n",
            config.common.program_hash, config.common.main_offset
        );
        Some(self.source(separable, body))
    }

    fn geometry_shader(&self, _setup: &ShaderSetup, config: &PicaGsConfig, separable: bool) -> Option<String> {
        if self.fail_program_translation {
            self.calls.set(self.calls.get() + 1);
            return None;
        }
        let body = format!(
            "// geometry program {:016x}\nuniform gs_config {{}};\nvoid main() {{}}\n",
            config.fingerprint()
        );
        Some(self.source(separable, body))
    }

    fn fixed_geometry_shader(&self, config: &PicaGsConfigCommon, separable: bool) -> String {
        let body = format!("// fixed geometry {:016x}\nvoid main() {{}}\n", config.fingerprint());
        self.source(separable, body)
    }

    fn fragment_shader(&self, config: &PicaFsConfig, separable: bool) -> String {
        let broken = if config.alpha_test_func == Self::BROKEN_ALPHA_FUNC {
            COMPILE_ERROR
        } else {
            ""
        };
        let body = format!(
            "// fragment {:016x}\n\
             uniform shader_data {{}};\n\
             uniform sampler2D tex0;\n\
             uniform sampler2D tex1;\n\
             uniform sampler2D tex2;\n\
             uniform samplerCube tex_cube;\n\
             uniform samplerBuffer texture_buffer_lut_lf;\n\
             uniform samplerBuffer texture_buffer_lut_rg;\n\
             uniform samplerBuffer texture_buffer_lut_rgba;\n\
             {}\nvoid main() {{}}\n",
            config.fingerprint(),
            broken
        );
        self.source(separable, body)
    }
}
