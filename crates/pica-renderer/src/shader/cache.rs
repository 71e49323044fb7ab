//! Shader variant caches
//!
//! Append-only maps from configuration key to compiled stage. A stage is
//! compiled on the first request for its key and lives until the owning
//! manager releases the cache.

use super::config::ShaderConfig;
use super::stage::{ShaderStage, StageHandle};
use crate::error::ShaderError;
use crate::gpu_device::{GpuDevice, ShaderKind};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

// ============================================================================
// Trivial stages
// ============================================================================

/// A stage that does not depend on any configuration.
#[derive(Debug, Default)]
pub struct TrivialShader {
    stage: Option<ShaderStage>,
}

impl TrivialShader {
    /// Compile `source`, or hold nothing if there is no source.
    pub fn new<D: GpuDevice>(
        device: &mut D,
        source: Option<&str>,
        kind: ShaderKind,
        separable: bool,
    ) -> Result<Self, ShaderError> {
        let stage = match source {
            Some(source) => Some(ShaderStage::create(device, source, kind, separable)?),
            None => None,
        };
        Ok(Self { stage })
    }

    pub fn get(&self) -> Option<StageHandle> {
        self.stage.as_ref().map(ShaderStage::handle)
    }

    pub fn len(&self) -> usize {
        self.stage.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.stage.is_none()
    }

    pub fn release<D: GpuDevice>(&mut self, device: &mut D) {
        if let Some(stage) = self.stage.take() {
            stage.release(device);
        }
    }
}

// ============================================================================
// Single-level cache
// ============================================================================

/// Configuration key to compiled stage.
#[derive(Debug)]
pub struct ShaderCache<K> {
    kind: ShaderKind,
    separable: bool,
    shaders: FxHashMap<K, ShaderStage>,
}

impl<K: ShaderConfig> ShaderCache<K> {
    pub fn new(kind: ShaderKind, separable: bool) -> Self {
        Self {
            kind,
            separable,
            shaders: FxHashMap::default(),
        }
    }

    /// Get the stage for `config`, generating and compiling it on a miss.
    ///
    /// A failed compile leaves the cache unchanged.
    pub fn get<D, F>(&mut self, device: &mut D, config: &K, generate: F) -> Result<StageHandle, ShaderError>
    where
        D: GpuDevice,
        F: FnOnce(&K, bool) -> String,
    {
        if let Some(stage) = self.shaders.get(config) {
            return Ok(stage.handle());
        }

        debug!("{} shader cache miss, config {:016x}", self.kind, config.fingerprint());
        let source = generate(config, self.separable);
        let stage = ShaderStage::create(device, &source, self.kind, self.separable)?;
        let handle = stage.handle();
        self.shaders.insert(*config, stage);
        Ok(handle)
    }

    /// Number of compiled variants.
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    pub fn release<D: GpuDevice>(&mut self, device: &mut D) {
        for (_, stage) in self.shaders.drain() {
            stage.release(device);
        }
    }
}

// ============================================================================
// Two-level cache
// ============================================================================

/// Cache for stages translated from PICA shader programs.
///
/// The key includes hashes of the whole program buffer, so keys that differ
/// only in unreachable code translate to the same GLSL. Compiled stages are
/// therefore stored by source text, and each key remembers which stage it
/// resolved to. Keys whose program could not be translated are remembered
/// too, so the generator is not asked again.
#[derive(Debug)]
pub struct ShaderDoubleCache<K> {
    kind: ShaderKind,
    separable: bool,
    configs: FxHashMap<K, Option<StageHandle>>,
    shaders: FxHashMap<String, ShaderStage>,
}

impl<K: ShaderConfig> ShaderDoubleCache<K> {
    pub fn new(kind: ShaderKind, separable: bool) -> Self {
        Self {
            kind,
            separable,
            configs: FxHashMap::default(),
            shaders: FxHashMap::default(),
        }
    }

    /// Get the stage for `config`.
    ///
    /// `generate` returns `None` if the program cannot be translated; that
    /// outcome is cached and reported as `ShaderError::Generation`.
    pub fn get<D, F>(&mut self, device: &mut D, config: &K, generate: F) -> Result<StageHandle, ShaderError>
    where
        D: GpuDevice,
        F: FnOnce(&K, bool) -> Option<String>,
    {
        if let Some(&entry) = self.configs.get(config) {
            return entry.ok_or(ShaderError::Generation { kind: self.kind });
        }

        debug!("{} shader cache miss, config {:016x}", self.kind, config.fingerprint());
        let Some(source) = generate(config, self.separable) else {
            warn!("failed to generate {} shader, config {:016x}", self.kind, config.fingerprint());
            self.configs.insert(*config, None);
            return Err(ShaderError::Generation { kind: self.kind });
        };

        let handle = match self.shaders.get(&source) {
            Some(stage) => stage.handle(),
            None => {
                let stage = ShaderStage::create(device, &source, self.kind, self.separable)?;
                let handle = stage.handle();
                self.shaders.insert(source, stage);
                handle
            }
        };

        self.configs.insert(*config, Some(handle));
        Ok(handle)
    }

    /// Number of compiled variants (distinct sources).
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    pub fn release<D: GpuDevice>(&mut self, device: &mut D) {
        self.configs.clear();
        for (_, stage) in self.shaders.drain() {
            stage.release(device);
        }
    }
}
