use std::sync::Arc;

use glam::{Quat, Vec3};

use super::geometry::{GeometryBuilder, PickerShape};
use super::layer::LayerId;
use super::types::{GizmoAxis, GizmoPlane, GizmoTarget, TransformMode, TransformSpace};
use super::{linear_drag_plane, GizmoVariant, TransformGizmo};
use crate::config::GizmoSettings;

const SHAFT_RADIUS: f32 = 0.01;
const SHAFT_LENGTH: f32 = 1.0;
const BOX_HALF: f32 = 0.06;
const AXIS_PICKER_HALF: Vec3 = Vec3::new(0.1, 0.6, 0.1);

const PATCH_HALF: f32 = 0.25;
const PATCH_OFFSET: f32 = 0.4;
const PATCH_PICKER_HALF: f32 = 0.3;
const PATCH_PICKER_THICKNESS: f32 = 0.01;

const CENTER_HALF: f32 = 0.1;
const CENTER_PICKER_HALF: f32 = 0.15;

/// Box-tipped lines per axis, planar patches and a uniform center cube.
/// Always oriented with the object, scale only makes sense in local axes.
pub struct ScaleGizmo {
    core: TransformGizmo,
}

impl ScaleGizmo {
    pub fn new(geometry: &dyn GeometryBuilder, layer: LayerId, settings: &GizmoSettings) -> Self {
        let mut core = TransformGizmo::new(TransformMode::Scale, layer, settings);

        let line = Arc::new(geometry.cylinder(SHAFT_RADIUS, SHAFT_LENGTH));
        let tip = Arc::new(geometry.cuboid(Vec3::splat(BOX_HALF)));

        for axis in GizmoAxis::ALL {
            let target = GizmoTarget::Axis(axis);
            let direction = axis.unit();
            let align = axis.align_from_y();

            core.add_handle(
                format!("scale_{}_line", axis.label()),
                target,
                line.clone(),
                axis.color(),
                direction * (SHAFT_LENGTH * 0.5),
                align,
            );
            core.add_handle(
                format!("scale_{}_box", axis.label()),
                target,
                tip.clone(),
                axis.color(),
                direction * (SHAFT_LENGTH + BOX_HALF),
                align,
            );
            core.add_picker(
                format!("scale_{}_picker", axis.label()),
                target,
                PickerShape::Cuboid {
                    half_extents: AXIS_PICKER_HALF,
                },
                direction * AXIS_PICKER_HALF.y,
                align,
            );
        }

        core.add_plane_patches(
            geometry,
            "scale",
            PATCH_HALF,
            PATCH_PICKER_HALF,
            PATCH_PICKER_THICKNESS,
            PATCH_OFFSET,
        );
        core.add_center_handle(geometry, "scale", CENTER_HALF, CENTER_PICKER_HALF);

        Self { core }
    }
}

impl GizmoVariant for ScaleGizmo {
    fn core(&self) -> &TransformGizmo {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransformGizmo {
        &mut self.core
    }

    fn choose_plane(&self, target: GizmoTarget, eye: Vec3) -> Option<GizmoPlane> {
        Some(linear_drag_plane(target, eye))
    }

    fn container_rotation(&self, object_rotation: Quat, _space: TransformSpace) -> Quat {
        object_rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::geometry::ProceduralGeometry;

    fn gizmo() -> ScaleGizmo {
        ScaleGizmo::new(&ProceduralGeometry::default(), LayerId(0), &GizmoSettings::default())
    }

    #[test]
    fn test_container_follows_object_rotation_in_world_space() {
        let gizmo = gizmo();
        let rotation = Quat::from_rotation_y(0.7);
        assert_eq!(gizmo.container_rotation(rotation, TransformSpace::World), rotation);
    }

    #[test]
    fn test_plane_choice_uses_local_eye() {
        let mut gizmo = gizmo();
        let turned = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        gizmo.core_mut().place(Vec3::ZERO, turned);

        // Camera on world +X looks along the object's local Z axis.
        let plane = gizmo
            .set_active_plane(GizmoTarget::Axis(GizmoAxis::X), Vec3::X)
            .unwrap();
        assert_eq!(plane.kind, GizmoPlane::XY);
        assert!(plane.normal.abs_diff_eq(Vec3::X, 1e-5));
        assert!(plane.contains_direction(turned * Vec3::X));
    }

    #[test]
    fn test_uniform_target_is_camera_facing() {
        let mut gizmo = gizmo();
        let plane = gizmo
            .set_active_plane(GizmoTarget::Plane(GizmoPlane::XYZ), Vec3::Y)
            .unwrap();
        assert_eq!(plane.kind, GizmoPlane::XYZE);
    }
}
