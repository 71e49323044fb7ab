//! Shader compilation, caching and binding for the hardware renderer.

pub mod bindings;
pub mod cache;
pub mod config;
pub mod generator;
pub mod manager;
pub mod stage;
pub mod uniforms;
pub mod util;

pub use cache::{ShaderCache, ShaderDoubleCache, TrivialShader};
pub use config::{
    AttributeMap, PicaFsConfig, PicaGsConfig, PicaGsConfigCommon, PicaShaderConfigCommon, PicaVsConfig,
    ShaderConfig, TevStageConfig,
};
pub use generator::ShaderGenerator;
pub use manager::{CacheStats, ShaderProgramManager};
pub use stage::{ShaderStage, StageHandle};
pub use uniforms::{
    GsUniformData, LightSrc, PicaUniformsData, UniformBindings, UniformBuffer, UniformData, VsUniformData,
};
