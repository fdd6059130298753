//! Render layer registry.
//!
//! Layers are drawn in order. Gizmos live in an overlay layer placed directly
//! after the scene's "World" layer so they draw over scene geometry but below
//! UI layers.

use crate::camera::ViewportCamera;
use crate::error::GizmoError;

pub const WORLD_LAYER: &str = "World";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Whether the layer draws with alpha blending.
    pub transparent: bool,
}

/// Ordered list of render layers.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: Vec<Layer>,
    next_id: u32,
}

impl LayerStack {
    /// An empty stack. Most hosts want [`LayerStack::default`], which carries
    /// the World and UI layers.
    pub fn empty() -> Self {
        Self {
            layers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Append a layer. Returns its id.
    pub fn push(&mut self, name: impl Into<String>, transparent: bool) -> LayerId {
        let index = self.layers.len();
        self.insert(index, name, transparent)
    }

    /// Insert a layer at `index`, clamped to the end. Returns its id.
    pub fn insert(&mut self, index: usize, name: impl Into<String>, transparent: bool) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        let index = index.min(self.layers.len());
        self.layers.insert(index, Layer { id, name: name.into(), transparent });
        id
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        let mut stack = Self::empty();
        stack.push(WORLD_LAYER, false);
        stack.push("UI", true);
        stack
    }
}

/// Return the overlay layer called `name`, creating it right after the World
/// layer when missing. The camera always ends up rendering it.
pub fn ensure_overlay_layer(
    stack: &mut LayerStack,
    camera: &mut ViewportCamera,
    name: &str,
) -> Result<LayerId, GizmoError> {
    let id = match stack.get_by_name(name) {
        Some(layer) => {
            tracing::debug!("[GIZMO] Reusing layer '{}'", name);
            layer.id
        }
        None => {
            let world = stack
                .get_by_name(WORLD_LAYER)
                .map(|layer| layer.id)
                .ok_or_else(|| GizmoError::MissingLayer(WORLD_LAYER.to_string()))?;
            let index = stack
                .index_of(world)
                .ok_or_else(|| GizmoError::MissingLayer(WORLD_LAYER.to_string()))?;
            let id = stack.insert(index + 1, name, true);
            tracing::info!("[GIZMO] Created overlay layer '{}' after '{}'", name, WORLD_LAYER);
            id
        }
    };
    camera.add_layer(id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn camera() -> ViewportCamera {
        ViewportCamera::new(Vec2::new(640.0, 480.0)).unwrap()
    }

    #[test]
    fn test_overlay_inserted_after_world() {
        let mut stack = LayerStack::default();
        let mut camera = camera();
        let id = ensure_overlay_layer(&mut stack, &mut camera, "gizmo").unwrap();

        let names: Vec<&str> = stack.layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["World", "gizmo", "UI"]);
        assert!(camera.has_layer(id));
    }

    #[test]
    fn test_existing_layer_is_reused() {
        let mut stack = LayerStack::default();
        let mut camera = camera();
        let first = ensure_overlay_layer(&mut stack, &mut camera, "gizmo").unwrap();
        let second = ensure_overlay_layer(&mut stack, &mut camera, "gizmo").unwrap();

        assert_eq!(first, second);
        assert_eq!(stack.layers().len(), 3);
        assert_eq!(camera.layers().len(), 1);
    }

    #[test]
    fn test_missing_world_layer_is_an_error() {
        let mut stack = LayerStack::empty();
        stack.push("UI", true);
        let err = ensure_overlay_layer(&mut stack, &mut camera(), "gizmo").unwrap_err();
        assert!(matches!(err, GizmoError::MissingLayer(name) if name == "World"));
    }

    #[test]
    fn test_prebuilt_layer_without_world_is_fine() {
        let mut stack = LayerStack::empty();
        let id = stack.push("gizmo", true);
        let mut camera = camera();
        assert_eq!(ensure_overlay_layer(&mut stack, &mut camera, "gizmo").unwrap(), id);
    }
}
