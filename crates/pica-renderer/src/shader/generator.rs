//! GLSL source generation interface
//!
//! The translation from register state to GLSL lives outside this crate. The
//! manager only needs source text per stage; it never inspects it.
//!
//! Every method takes `separable`: a separable program has to redeclare the
//! `gl_PerVertex` interface block, a monolithic one must not.

use super::config::{PicaFsConfig, PicaGsConfig, PicaGsConfigCommon, PicaVsConfig};
use pica_common::ShaderSetup;

pub trait ShaderGenerator {
    /// Pass-through vertex shader used when vertices are already transformed.
    fn trivial_vertex_shader(&self, separable: bool) -> String;

    /// Pass-through geometry shader, or `None` to leave the geometry slot
    /// empty.
    fn trivial_geometry_shader(&self, separable: bool) -> Option<String>;

    /// Translate the vertex shader unit program. `None` if the program cannot
    /// be translated.
    fn vertex_shader(&self, setup: &ShaderSetup, config: &PicaVsConfig, separable: bool) -> Option<String>;

    /// Translate the geometry shader unit program. `None` if the program
    /// cannot be translated.
    fn geometry_shader(&self, setup: &ShaderSetup, config: &PicaGsConfig, separable: bool) -> Option<String>;

    /// Geometry stage for the fixed (non-programmable) geometry path.
    fn fixed_geometry_shader(&self, config: &PicaGsConfigCommon, separable: bool) -> String;

    fn fragment_shader(&self, config: &PicaFsConfig, separable: bool) -> String;
}
