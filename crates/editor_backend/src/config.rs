//! Gizmo settings.
//!
//! Settings live in a RON file next to the editor project. Every field has a
//! default, so a file only needs to name what it overrides:
//!
//! ```ron
//! (
//!     size: 1.25,
//!     translation_snap: Some(0.25),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gizmo::types::{TransformMode, TransformSpace};

/// Name of the overlay layer gizmos render into.
pub const DEFAULT_LAYER_NAME: &str = "gizmo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoSettings {
    /// Multiplier on top of the distance based screen scale.
    pub size: f32,
    /// Camera distance at which a gizmo of `size` 1.0 has unit scale.
    pub reference_distance: f32,
    /// Opacity of visible handles.
    pub handle_opacity: f32,
    /// Opacity applied while a handle is highlighted.
    pub highlight_opacity: f32,
    /// Lower bound for every scale component produced by a scale drag.
    pub min_scale: f32,
    /// Translation step in world units. `None` disables snapping.
    pub translation_snap: Option<f32>,
    /// Rotation step in degrees. `None` disables snapping.
    pub rotation_snap: Option<f32>,
    /// Far distance for picker ray casts.
    pub pick_distance: f32,
    pub layer_name: String,
    pub initial_mode: TransformMode,
    pub initial_space: TransformSpace,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            size: 1.0,
            reference_distance: 6.0,
            handle_opacity: 0.9,
            highlight_opacity: 0.5,
            min_scale: 0.001,
            translation_snap: None,
            rotation_snap: None,
            pick_distance: 1000.0,
            layer_name: DEFAULT_LAYER_NAME.to_string(),
            initial_mode: TransformMode::Translate,
            initial_space: TransformSpace::World,
        }
    }
}

impl GizmoSettings {
    /// Load and validate settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_ron_str(&text)?;
        tracing::info!("[GIZMO] Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        fn opacity(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must lie in 0..=1, got {value}"),
                })
            }
        }

        positive("size", self.size)?;
        positive("reference_distance", self.reference_distance)?;
        positive("min_scale", self.min_scale)?;
        positive("pick_distance", self.pick_distance)?;
        opacity("handle_opacity", self.handle_opacity)?;
        opacity("highlight_opacity", self.highlight_opacity)?;
        if let Some(step) = self.translation_snap {
            positive("translation_snap", step)?;
        }
        if let Some(step) = self.rotation_snap {
            positive("rotation_snap", step)?;
        }
        if self.layer_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "layer_name",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
