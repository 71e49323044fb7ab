//! Shader manager construction settings.
//!
//! The binding mode is requested by the user and validated against what the
//! device supports, once, before the manager is built.

use tracing::warn;

/// How selected stages are combined into something drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingMode {
    /// Each stage is its own separable program, attached to a program pipeline.
    Separable,
    /// Stages are plain shader objects linked into one program per combination.
    Monolithic,
}

/// Settings the shader program manager is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Effective binding mode.
    pub binding_mode: BindingMode,
    /// Whether the device could have used separable programs.
    pub separable_supported: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            binding_mode: BindingMode::Monolithic,
            separable_supported: false,
        }
    }
}

impl ManagerConfig {
    /// Resolve the requested binding mode against device support.
    ///
    /// # Arguments
    /// * `requested` - binding mode from user settings
    /// * `separable_supported` - whether the device has separate shader objects
    pub fn new(requested: BindingMode, separable_supported: bool) -> Self {
        let binding_mode = match requested {
            BindingMode::Separable if !separable_supported => {
                warn!("separate shader objects unsupported, falling back to monolithic programs");
                BindingMode::Monolithic
            }
            mode => mode,
        };

        Self {
            binding_mode,
            separable_supported,
        }
    }

    #[inline]
    pub fn is_separable(&self) -> bool {
        self.binding_mode == BindingMode::Separable
    }
}
