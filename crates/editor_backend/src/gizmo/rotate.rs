use std::sync::Arc;

use glam::Vec3;

use super::geometry::{GeometryBuilder, PickerShape};
use super::layer::LayerId;
use super::types::{GizmoAxis, GizmoPlane, GizmoTarget, TransformMode};
use super::{GizmoVariant, TransformGizmo};
use crate::config::GizmoSettings;

const RING_RADIUS: f32 = 0.5;
const RING_TUBE: f32 = 0.01;
const PICKER_TUBE: f32 = 0.05;
const PICKER_SEGMENTS: usize = 24;

/// One ring per axis. Dragging a ring spins the object about that axis.
pub struct RotateGizmo {
    core: TransformGizmo,
}

impl RotateGizmo {
    pub fn new(geometry: &dyn GeometryBuilder, layer: LayerId, settings: &GizmoSettings) -> Self {
        let mut core = TransformGizmo::new(TransformMode::Rotate, layer, settings);
        let ring = Arc::new(geometry.torus(RING_RADIUS, RING_TUBE));

        for axis in GizmoAxis::ALL {
            let target = GizmoTarget::Axis(axis);
            core.add_handle(
                format!("rotate_{}_ring", axis.label()),
                target,
                ring.clone(),
                axis.color(),
                Vec3::ZERO,
                axis.align_from_y(),
            );
            core.add_picker(
                format!("rotate_{}_picker", axis.label()),
                target,
                PickerShape::Ring {
                    radius: RING_RADIUS,
                    tube_radius: PICKER_TUBE,
                    segments: PICKER_SEGMENTS,
                },
                Vec3::ZERO,
                axis.align_from_y(),
            );
        }

        Self { core }
    }
}

impl GizmoVariant for RotateGizmo {
    fn core(&self) -> &TransformGizmo {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransformGizmo {
        &mut self.core
    }

    /// The plane perpendicular to the rotation axis, whatever the eye.
    fn choose_plane(&self, target: GizmoTarget, _eye: Vec3) -> Option<GizmoPlane> {
        match target {
            GizmoTarget::Axis(GizmoAxis::X) => Some(GizmoPlane::YZ),
            GizmoTarget::Axis(GizmoAxis::Y) => Some(GizmoPlane::XZ),
            GizmoTarget::Axis(GizmoAxis::Z) => Some(GizmoPlane::XY),
            GizmoTarget::Plane(_) => None,
        }
    }
}
