//! Shader program manager
//!
//! Tracks the vertex, geometry and fragment stage selected for the next draw
//! and binds that combination into the render state. Stages are looked up in
//! per-kind caches; combining them is done either with a program pipeline
//! (separable programs) or by linking one program per combination. The mode
//! is fixed when the manager is built.

use super::bindings::bind_program_interface;
use super::cache::{ShaderCache, ShaderDoubleCache, TrivialShader};
use super::config::{PicaFsConfig, PicaGsConfig, PicaGsConfigCommon, PicaVsConfig};
use super::generator::ShaderGenerator;
use super::stage::StageHandle;
use super::uniforms::{GsUniformData, UniformBindings, UniformBuffer, UniformData, VsUniformData};
use super::util::load_program;
use crate::config::{BindingMode, ManagerConfig};
use crate::error::ShaderError;
use crate::gpu_device::{GpuDevice, PipelineHandle, ProgramHandle, ShaderHandle, ShaderKind};
use crate::state::RenderState;
use pica_common::ShaderSetup;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info};

/// Selected (vertex, geometry, fragment) stages.
type ShaderTuple = (Option<StageHandle>, Option<StageHandle>, Option<StageHandle>);

/// Cache occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Compiled vertex stages, trivial included.
    pub vertex_variants: usize,
    /// Compiled geometry stages, trivial included.
    pub geometry_variants: usize,
    pub fragment_variants: usize,
    /// Linked programs (monolithic mode only).
    pub linked_programs: usize,
}

/// Mode-specific binding state.
enum BindingStrategy {
    Separable {
        pipeline: PipelineHandle,
        /// Stages currently attached to `pipeline`.
        attached: ShaderTuple,
    },
    Monolithic {
        program_cache: FxHashMap<ShaderTuple, ProgramHandle>,
    },
}

/// Owns every compiled stage, linked program and uniform buffer used for
/// hardware rendering.
pub struct ShaderProgramManager<D: GpuDevice, G: ShaderGenerator> {
    device: D,
    generator: G,
    config: ManagerConfig,

    current: ShaderTuple,
    dirty: bool,

    trivial_vertex_shader: TrivialShader,
    trivial_geometry_shader: TrivialShader,
    programmable_vertex_shaders: ShaderDoubleCache<PicaVsConfig>,
    programmable_geometry_shaders: ShaderDoubleCache<PicaGsConfig>,
    fixed_geometry_shaders: ShaderCache<PicaGsConfigCommon>,
    fragment_shaders: ShaderCache<PicaFsConfig>,

    strategy: BindingStrategy,

    uniform_buffer: UniformBuffer<UniformData>,
    vs_uniform_buffer: UniformBuffer<VsUniformData>,
    gs_uniform_buffer: UniformBuffer<GsUniformData>,
}

impl<D: GpuDevice, G: ShaderGenerator> ShaderProgramManager<D, G> {
    /// Build a manager, compiling the trivial stages up front.
    ///
    /// `config` should come from `ManagerConfig::new` so the binding mode is
    /// one the device supports.
    pub fn new(mut device: D, generator: G, config: ManagerConfig) -> Result<Self, ShaderError> {
        let separable = config.is_separable();
        info!("Shader program manager: {:?} binding", config.binding_mode);

        let strategy = match config.binding_mode {
            BindingMode::Separable => BindingStrategy::Separable {
                pipeline: device.create_program_pipeline(),
                attached: (None, None, None),
            },
            BindingMode::Monolithic => BindingStrategy::Monolithic {
                program_cache: FxHashMap::default(),
            },
        };

        let uniform_buffer = UniformBuffer::new(&mut device, UniformBindings::Common);
        let vs_uniform_buffer = UniformBuffer::new(&mut device, UniformBindings::Vs);
        let gs_uniform_buffer = UniformBuffer::new(&mut device, UniformBindings::Gs);

        let mut manager = Self {
            device,
            generator,
            config,
            current: (None, None, None),
            dirty: true,
            trivial_vertex_shader: TrivialShader::default(),
            trivial_geometry_shader: TrivialShader::default(),
            programmable_vertex_shaders: ShaderDoubleCache::new(ShaderKind::Vertex, separable),
            programmable_geometry_shaders: ShaderDoubleCache::new(ShaderKind::Geometry, separable),
            fixed_geometry_shaders: ShaderCache::new(ShaderKind::Geometry, separable),
            fragment_shaders: ShaderCache::new(ShaderKind::Fragment, separable),
            strategy,
            uniform_buffer,
            vs_uniform_buffer,
            gs_uniform_buffer,
        };

        // Dropping `manager` on error releases whatever was created so far.
        let source = manager.generator.trivial_vertex_shader(separable);
        manager.trivial_vertex_shader =
            TrivialShader::new(&mut manager.device, Some(source.as_str()), ShaderKind::Vertex, separable)?;
        let source = manager.generator.trivial_geometry_shader(separable);
        manager.trivial_geometry_shader =
            TrivialShader::new(&mut manager.device, source.as_deref(), ShaderKind::Geometry, separable)?;

        Ok(manager)
    }

    // ========================================================================
    // Stage selection
    // ========================================================================

    /// Select the vertex stage translated from the vertex shader unit program.
    ///
    /// On error the current selection is kept.
    pub fn use_programmable_vertex_shader(
        &mut self,
        config: &PicaVsConfig,
        setup: &ShaderSetup,
    ) -> Result<(), ShaderError> {
        let generator = &self.generator;
        let handle = self.programmable_vertex_shaders.get(&mut self.device, config, |config, separable| {
            generator.vertex_shader(setup, config, separable)
        })?;
        self.select_vertex(Some(handle));
        Ok(())
    }

    /// Select the pass-through vertex stage.
    pub fn use_trivial_vertex_shader(&mut self) {
        self.select_vertex(self.trivial_vertex_shader.get());
    }

    /// Select the geometry stage translated from the geometry shader unit
    /// program.
    ///
    /// On error the current selection is kept.
    pub fn use_programmable_geometry_shader(
        &mut self,
        config: &PicaGsConfig,
        setup: &ShaderSetup,
    ) -> Result<(), ShaderError> {
        let generator = &self.generator;
        let handle = self.programmable_geometry_shaders.get(&mut self.device, config, |config, separable| {
            generator.geometry_shader(setup, config, separable)
        })?;
        self.select_geometry(Some(handle));
        Ok(())
    }

    /// Select the geometry stage of the fixed geometry path.
    pub fn use_fixed_geometry_shader(&mut self, config: &PicaGsConfigCommon) -> Result<(), ShaderError> {
        let generator = &self.generator;
        let handle = self.fixed_geometry_shaders.get(&mut self.device, config, |config, separable| {
            generator.fixed_geometry_shader(config, separable)
        })?;
        self.select_geometry(Some(handle));
        Ok(())
    }

    /// Select the pass-through geometry stage, which may be no stage at all.
    pub fn use_trivial_geometry_shader(&mut self) {
        self.select_geometry(self.trivial_geometry_shader.get());
    }

    pub fn use_fragment_shader(&mut self, config: &PicaFsConfig) -> Result<(), ShaderError> {
        let generator = &self.generator;
        let handle = self.fragment_shaders.get(&mut self.device, config, |config, separable| {
            generator.fragment_shader(config, separable)
        })?;
        self.select_fragment(Some(handle));
        Ok(())
    }

    fn select_vertex(&mut self, handle: Option<StageHandle>) {
        if self.current.0 != handle {
            self.current.0 = handle;
            self.dirty = true;
        }
    }

    fn select_geometry(&mut self, handle: Option<StageHandle>) {
        if self.current.1 != handle {
            self.current.1 = handle;
            self.dirty = true;
        }
    }

    fn select_fragment(&mut self, handle: Option<StageHandle>) {
        if self.current.2 != handle {
            self.current.2 = handle;
            self.dirty = true;
        }
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Bind the selected stages and the uniform buffers into `state`.
    ///
    /// Does nothing if the selection has not changed since the last
    /// successful call. On error the selection stays pending.
    pub fn apply_to(&mut self, state: &mut RenderState) -> Result<(), ShaderError> {
        if !self.dirty {
            return Ok(());
        }

        let (vs, gs, fs) = self.current;
        if vs.is_none() {
            return Err(ShaderError::MissingStage { kind: ShaderKind::Vertex });
        }
        if fs.is_none() {
            return Err(ShaderError::MissingStage { kind: ShaderKind::Fragment });
        }

        match &mut self.strategy {
            BindingStrategy::Separable { pipeline, attached } => {
                let slots = [
                    (ShaderKind::Vertex, vs, &mut attached.0),
                    (ShaderKind::Geometry, gs, &mut attached.1),
                    (ShaderKind::Fragment, fs, &mut attached.2),
                ];
                for (kind, selected, bound) in slots {
                    if selected != *bound {
                        self.device.use_program_stages(
                            *pipeline,
                            kind.stage_flags(),
                            selected.and_then(StageHandle::program),
                        );
                        *bound = selected;
                    }
                }

                state.draw.shader_program = None;
                state.draw.program_pipeline = Some(*pipeline);
            }
            BindingStrategy::Monolithic { program_cache } => {
                let program = match program_cache.entry(self.current) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        let program = link_stages(&mut self.device, self.current)?;
                        *entry.insert(program)
                    }
                };

                state.draw.shader_program = Some(program);
                state.draw.program_pipeline = None;
            }
        }

        state.draw.uniform_buffers[UniformBindings::Common as usize] = Some(self.uniform_buffer.buffer());
        state.draw.uniform_buffers[UniformBindings::Vs as usize] = Some(self.vs_uniform_buffer.buffer());
        state.draw.uniform_buffers[UniformBindings::Gs as usize] = Some(self.gs_uniform_buffer.buffer());

        self.dirty = false;
        Ok(())
    }

    // ========================================================================
    // Uniform data
    // ========================================================================

    /// Replace the contents of the common uniform block.
    pub fn upload_uniforms(&mut self, data: &UniformData) {
        self.uniform_buffer.update(&mut self.device, data);
    }

    /// Replace the contents of the vertex shader unit uniform block.
    pub fn upload_vs_uniforms(&mut self, data: &VsUniformData) {
        self.vs_uniform_buffer.update(&mut self.device, data);
    }

    /// Replace the contents of the geometry shader unit uniform block.
    pub fn upload_gs_uniforms(&mut self, data: &GsUniformData) {
        self.gs_uniform_buffer.update(&mut self.device, data);
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Whether the next `apply_to` will rebind.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn binding_mode(&self) -> BindingMode {
        self.config.binding_mode
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            vertex_variants: self.trivial_vertex_shader.len() + self.programmable_vertex_shaders.len(),
            geometry_variants: self.trivial_geometry_shader.len()
                + self.programmable_geometry_shaders.len()
                + self.fixed_geometry_shaders.len(),
            fragment_variants: self.fragment_shaders.len(),
            linked_programs: match &self.strategy {
                BindingStrategy::Separable { .. } => 0,
                BindingStrategy::Monolithic { program_cache } => program_cache.len(),
            },
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

/// Link the selected shader objects into one program.
fn link_stages<D: GpuDevice>(device: &mut D, (vs, gs, fs): ShaderTuple) -> Result<ProgramHandle, ShaderError> {
    let shaders: Vec<ShaderHandle> = [vs, gs, fs]
        .into_iter()
        .flatten()
        .filter_map(StageHandle::shader)
        .collect();

    debug!("Linking program from {} stages", shaders.len());
    let program = load_program(device, false, &shaders)?;
    bind_program_interface(device, program)
}

impl<D: GpuDevice, G: ShaderGenerator> Drop for ShaderProgramManager<D, G> {
    fn drop(&mut self) {
        let device = &mut self.device;

        match &mut self.strategy {
            BindingStrategy::Separable { pipeline, .. } => device.delete_program_pipeline(*pipeline),
            BindingStrategy::Monolithic { program_cache } => {
                for (_, program) in program_cache.drain() {
                    device.delete_program(program);
                }
            }
        }

        self.trivial_vertex_shader.release(device);
        self.trivial_geometry_shader.release(device);
        self.programmable_vertex_shaders.release(device);
        self.programmable_geometry_shaders.release(device);
        self.fixed_geometry_shaders.release(device);
        self.fragment_shaders.release(device);

        self.uniform_buffer.release(device);
        self.vs_uniform_buffer.release(device);
        self.gs_uniform_buffer.release(device);
    }
}
