use std::sync::Arc;

use glam::Vec3;

use super::geometry::{GeometryBuilder, PickerShape};
use super::layer::LayerId;
use super::types::{GizmoAxis, GizmoPlane, GizmoTarget, TransformMode};
use super::{linear_drag_plane, GizmoVariant, TransformGizmo};
use crate::config::GizmoSettings;

const SHAFT_RADIUS: f32 = 0.01;
const SHAFT_LENGTH: f32 = 1.0;
const HEAD_RADIUS: f32 = 0.05;
const HEAD_LENGTH: f32 = 0.2;

const AXIS_PICKER_RADIUS: f32 = 0.1;
const AXIS_PICKER_LENGTH: f32 = 1.2;

const PATCH_HALF: f32 = 0.25;
const PATCH_OFFSET: f32 = 0.4;
const PATCH_PICKER_HALF: f32 = 0.3;
const PATCH_PICKER_THICKNESS: f32 = 0.01;

const CENTER_HALF: f32 = 0.08;
const CENTER_PICKER_HALF: f32 = 0.12;

/// Arrows per axis, planar patches per axis pair and a center cube for free
/// movement on the camera plane.
pub struct TranslateGizmo {
    core: TransformGizmo,
}

impl TranslateGizmo {
    pub fn new(geometry: &dyn GeometryBuilder, layer: LayerId, settings: &GizmoSettings) -> Self {
        let mut core = TransformGizmo::new(TransformMode::Translate, layer, settings);

        let shaft = Arc::new(geometry.cylinder(SHAFT_RADIUS, SHAFT_LENGTH));
        let head = Arc::new(geometry.cone(HEAD_RADIUS, HEAD_LENGTH));

        for axis in GizmoAxis::ALL {
            let target = GizmoTarget::Axis(axis);
            let direction = axis.unit();
            let align = axis.align_from_y();

            core.add_handle(
                format!("translate_{}_shaft", axis.label()),
                target,
                shaft.clone(),
                axis.color(),
                direction * (SHAFT_LENGTH * 0.5),
                align,
            );
            core.add_handle(
                format!("translate_{}_head", axis.label()),
                target,
                head.clone(),
                axis.color(),
                direction * (SHAFT_LENGTH + HEAD_LENGTH * 0.5),
                align,
            );
            core.add_picker(
                format!("translate_{}_picker", axis.label()),
                target,
                PickerShape::Cylinder {
                    radius: AXIS_PICKER_RADIUS,
                    height: AXIS_PICKER_LENGTH,
                },
                direction * (AXIS_PICKER_LENGTH * 0.5),
                align,
            );
        }

        core.add_plane_patches(
            geometry,
            "translate",
            PATCH_HALF,
            PATCH_PICKER_HALF,
            PATCH_PICKER_THICKNESS,
            PATCH_OFFSET,
        );
        core.add_center_handle(geometry, "translate", CENTER_HALF, CENTER_PICKER_HALF);

        Self { core }
    }
}

impl GizmoVariant for TranslateGizmo {
    fn core(&self) -> &TransformGizmo {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransformGizmo {
        &mut self.core
    }

    fn choose_plane(&self, target: GizmoTarget, eye: Vec3) -> Option<GizmoPlane> {
        Some(linear_drag_plane(target, eye))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::geometry::ProceduralGeometry;
    use crate::gizmo::types::HandleRole;

    fn gizmo() -> TranslateGizmo {
        TranslateGizmo::new(&ProceduralGeometry::default(), LayerId(2), &GizmoSettings::default())
    }

    #[test]
    fn test_builds_arrows_patches_and_center() {
        let gizmo = gizmo();
        let core = gizmo.core();
        // 3 arrows of two parts, 3 patches, 1 center cube
        assert_eq!(core.handles().len(), 10);
        assert_eq!(core.pickers().len(), 7);
        assert!(core.handles().iter().all(|h| h.tag.role == HandleRole::Handle));
        assert!(core.pickers().iter().all(|p| p.tag.role == HandleRole::Picker));
        assert!(core.handles().iter().all(|h| h.layer == LayerId(2)));
    }

    #[test]
    fn test_arrow_meshes_are_shared() {
        let gizmo = gizmo();
        let shafts: Vec<_> = gizmo
            .core()
            .handles()
            .iter()
            .filter(|h| h.name.ends_with("_shaft"))
            .collect();
        assert_eq!(shafts.len(), 3);
        assert!(Arc::ptr_eq(&shafts[0].mesh, &shafts[1].mesh));
    }

    #[test]
    fn test_patch_colors_follow_plane_normal() {
        let gizmo = gizmo();
        let color_of = |plane: GizmoPlane| {
            gizmo
                .core()
                .handles()
                .iter()
                .find(|h| h.tag.target == GizmoTarget::Plane(plane))
                .map(|h| h.material.color())
        };
        assert_eq!(color_of(GizmoPlane::XY).map(|c| c.b), Some(1.0));
        assert_eq!(color_of(GizmoPlane::YZ).map(|c| c.r), Some(1.0));
        assert_eq!(color_of(GizmoPlane::XZ).map(|c| c.g), Some(1.0));
    }

    #[test]
    fn test_x_axis_plane_choice() {
        let mut gizmo = gizmo();
        let x = GizmoTarget::Axis(GizmoAxis::X);

        let plane = gizmo.set_active_plane(x, Vec3::new(0.0, 0.2, 1.0).normalize()).unwrap();
        assert_eq!(plane.kind, GizmoPlane::XY);

        let plane = gizmo.set_active_plane(x, Vec3::new(0.0, 1.0, 0.2).normalize()).unwrap();
        assert_eq!(plane.kind, GizmoPlane::XZ);
        assert!(plane.contains_direction(Vec3::X));
    }

    #[test]
    fn test_plane_target_uses_camera_plane() {
        let mut gizmo = gizmo();
        let eye = Vec3::new(1.0, 1.0, 1.0).normalize();
        let plane = gizmo.set_active_plane(GizmoTarget::Plane(GizmoPlane::XZ), eye).unwrap();
        assert_eq!(plane.kind, GizmoPlane::XYZE);
        assert!(plane.normal.abs_diff_eq(eye, 1e-6));
        assert_eq!(gizmo.core().active_plane(), Some(&plane));
    }
}
