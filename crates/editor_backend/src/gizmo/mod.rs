//! Transform gizmos.
//!
//! A gizmo is a container of visible handles plus invisible picker volumes,
//! all positioned relative to the container transform:
//! - [`TransformGizmo`] owns the parts, the container pose, visibility and the
//!   active intersection plane
//! - [`GizmoVariant`] adds the mode specific plane choice on top of it
//! - [`GizmoSet`] holds one gizmo per [`TransformMode`]

pub mod geometry;
pub mod layer;
pub mod manipulation;
pub mod material;
pub mod rotate;
pub mod scale;
pub mod translate;
pub mod types;

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};
use rapier3d::prelude::ColliderHandle;

use crate::config::GizmoSettings;
use crate::scene::ObjectId;
use crate::services::picking_service::{PickerEntry, PickingService};

use geometry::{GeometryBuilder, Mesh, PickerShape};
use layer::LayerId;
use material::GizmoMaterial;
use types::{GizmoAxis, GizmoColor, GizmoPlane, GizmoTarget, HandleTag, TransformMode, TransformSpace};

pub use rotate::RotateGizmo;
pub use scale::ScaleGizmo;
pub use translate::TranslateGizmo;

/// Smallest container scale, keeps picker shapes non-degenerate when the
/// camera sits on the gizmo.
const MIN_CONTAINER_SCALE: f32 = 1e-4;

// ─── Parts ───────────────────────────────────────────────────────────────────

/// Visible gizmo geometry. Rendered and highlighted, never hit-tested.
#[derive(Debug, Clone)]
pub struct GizmoHandle {
    pub name: String,
    pub tag: HandleTag,
    pub mesh: Arc<Mesh>,
    pub material: GizmoMaterial,
    /// Offset from the container origin, in unscaled gizmo units.
    pub offset: Vec3,
    pub rotation: Quat,
    pub layer: LayerId,
}

impl GizmoHandle {
    pub fn world_matrix(&self, container: &GizmoContainer) -> Mat4 {
        let (position, rotation) = container.place(self.offset, self.rotation);
        Mat4::from_scale_rotation_translation(Vec3::splat(container.scale), rotation, position)
    }
}

/// Invisible collision proxy co-located with a handle.
#[derive(Debug, Clone)]
pub struct PickerVolume {
    pub name: String,
    pub tag: HandleTag,
    pub shape: PickerShape,
    pub offset: Vec3,
    pub rotation: Quat,
    pub layer: LayerId,
    /// Set once the volume is registered with the picking service.
    pub collider: Option<ColliderHandle>,
}

/// Pose shared by every part of a gizmo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoContainer {
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform screen scale.
    pub scale: f32,
}

impl Default for GizmoContainer {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl GizmoContainer {
    /// World pose of a part given its container relative offset and rotation.
    pub fn place(&self, offset: Vec3, rotation: Quat) -> (Vec3, Quat) {
        (
            self.position + self.rotation * (offset * self.scale),
            self.rotation * rotation,
        )
    }

    /// Express a world direction in the container frame.
    pub fn to_local(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }
}

/// Surface pointer rays are projected onto while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePlane {
    pub kind: GizmoPlane,
    pub origin: Vec3,
    pub normal: Vec3,
}

impl ActivePlane {
    /// Intersect a ray with the plane. `None` when the ray is parallel to it
    /// or the plane lies behind the ray origin.
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_direction: Vec3) -> Option<Vec3> {
        let denom = self.normal.dot(ray_direction);
        if denom.abs() < 0.0001 {
            return None;
        }

        let t = (self.origin - ray_origin).dot(self.normal) / denom;
        if t < 0.0 {
            return None;
        }

        Some(ray_origin + ray_direction * t)
    }

    pub fn contains_direction(&self, direction: Vec3) -> bool {
        self.normal.dot(direction).abs() < 1e-4
    }
}

/// Screen scale keeping the gizmo a constant size on screen.
pub fn screen_scale(gizmo_position: Vec3, camera_position: Vec3, reference_distance: f32, size: f32) -> f32 {
    gizmo_position.distance(camera_position) / reference_distance * size
}

// ─── TransformGizmo ──────────────────────────────────────────────────────────

/// Mode independent gizmo state.
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    mode: TransformMode,
    layer: LayerId,
    handles: Vec<GizmoHandle>,
    pickers: Vec<PickerVolume>,
    container: GizmoContainer,
    active_plane: Option<ActivePlane>,
    selected: Option<ObjectId>,
    visible: bool,
    handle_opacity: f32,
    highlight_opacity: f32,
}

impl TransformGizmo {
    pub fn new(mode: TransformMode, layer: LayerId, settings: &GizmoSettings) -> Self {
        Self {
            mode,
            layer,
            handles: Vec::new(),
            pickers: Vec::new(),
            container: GizmoContainer::default(),
            active_plane: None,
            selected: None,
            visible: false,
            handle_opacity: settings.handle_opacity,
            highlight_opacity: settings.highlight_opacity,
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn handles(&self) -> &[GizmoHandle] {
        &self.handles
    }

    pub fn pickers(&self) -> &[PickerVolume] {
        &self.pickers
    }

    pub fn container(&self) -> &GizmoContainer {
        &self.container
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.highlight(None);
            self.active_plane = None;
        }
    }

    pub fn selected(&self) -> Option<&ObjectId> {
        self.selected.as_ref()
    }

    /// Attach to (or detach from) an object. Attaching moves the container to
    /// the object's world position.
    pub fn set_selected_object(&mut self, selected: Option<(ObjectId, Vec3)>) {
        match selected {
            Some((id, position)) => {
                self.selected = Some(id);
                self.container.position = position;
            }
            None => {
                self.selected = None;
                self.active_plane = None;
                self.highlight(None);
            }
        }
    }

    /// Place the container at the object pose.
    pub fn place(&mut self, position: Vec3, rotation: Quat) {
        self.container.position = position;
        self.container.rotation = rotation;
    }

    /// Recompute the screen scale from the camera position. Returns the new scale.
    pub fn update(&mut self, camera_position: Vec3, size: f32, reference_distance: f32) -> f32 {
        let scale = screen_scale(self.container.position, camera_position, reference_distance, size);
        self.container.scale = scale.max(MIN_CONTAINER_SCALE);
        self.container.scale
    }

    pub fn active_plane(&self) -> Option<&ActivePlane> {
        self.active_plane.as_ref()
    }

    pub fn clear_active_plane(&mut self) {
        self.active_plane = None;
    }

    /// Activate `kind`, passing through the container origin. Axis-pair planes
    /// follow the container rotation; camera-facing planes take `eye` as normal.
    pub fn activate_plane(&mut self, kind: GizmoPlane, eye: Vec3) -> ActivePlane {
        let normal = match kind.normal_axis() {
            Some(axis) => self.container.rotation * axis.unit(),
            None => eye.try_normalize().unwrap_or(Vec3::Z),
        };
        let plane = ActivePlane {
            kind,
            origin: self.container.position,
            normal,
        };
        self.active_plane = Some(plane);
        plane
    }

    /// Highlight the handles tagged with `target` and clear every other one.
    pub fn highlight(&mut self, target: Option<GizmoTarget>) {
        for handle in &mut self.handles {
            handle.material.highlight(target == Some(handle.tag.target));
        }
    }

    pub fn highlighted_target(&self) -> Option<GizmoTarget> {
        self.handles
            .iter()
            .find(|handle| handle.material.is_highlighted())
            .map(|handle| handle.tag.target)
    }

    /// Handles with their world matrices, empty while hidden.
    pub fn render_items(&self) -> impl Iterator<Item = (&GizmoHandle, Mat4)> + '_ {
        let container = self.container;
        self.handles
            .iter()
            .filter(move |_| self.visible)
            .map(move |handle| (handle, handle.world_matrix(&container)))
    }

    pub fn add_handle(
        &mut self,
        name: impl Into<String>,
        target: GizmoTarget,
        mesh: Arc<Mesh>,
        color: GizmoColor,
        offset: Vec3,
        rotation: Quat,
    ) {
        let name = name.into();
        let material = GizmoMaterial::with_color(name.clone(), color.with_alpha(self.handle_opacity))
            .with_highlight_opacity(self.highlight_opacity);
        self.handles.push(GizmoHandle {
            name,
            tag: HandleTag::handle(target),
            mesh,
            material,
            offset,
            rotation,
            layer: self.layer,
        });
    }

    pub fn add_picker(
        &mut self,
        name: impl Into<String>,
        target: GizmoTarget,
        shape: PickerShape,
        offset: Vec3,
        rotation: Quat,
    ) {
        self.pickers.push(PickerVolume {
            name: name.into(),
            tag: HandleTag::picker(target),
            shape,
            offset,
            rotation,
            layer: self.layer,
            collider: None,
        });
    }

    /// Register every picker that has no collider yet.
    pub fn register_pickers(&mut self, picking: &PickingService) {
        for picker in &mut self.pickers {
            if picker.collider.is_some() {
                continue;
            }
            let (position, rotation) = self.container.place(picker.offset, picker.rotation);
            let entry = PickerEntry {
                mode: self.mode,
                tag: picker.tag,
                layer: picker.layer,
                enabled: self.visible,
            };
            picker.collider = Some(picking.register_picker(
                entry,
                &picker.shape,
                position,
                rotation,
                self.container.scale,
            ));
        }
        tracing::debug!(
            "[GIZMO] Registered {} {} pickers",
            self.pickers.len(),
            self.mode.name()
        );
    }

    /// Drop every picker collider from the picking service.
    pub fn unregister_pickers(&mut self, picking: &PickingService) {
        for picker in &mut self.pickers {
            let Some(collider) = picker.collider.take() else {
                continue;
            };
            if !picking.unregister_picker(collider) {
                tracing::warn!("[GIZMO] Picker '{}' was already gone", picker.name);
            }
        }
    }

    /// Push the current container pose and visibility to the picker colliders.
    pub fn sync_pickers(&self, picking: &PickingService) {
        for picker in &self.pickers {
            let Some(collider) = picker.collider else {
                continue;
            };
            let (position, rotation) = self.container.place(picker.offset, picker.rotation);
            if !picking.update_picker(
                collider,
                &picker.shape,
                position,
                rotation,
                self.container.scale,
                self.visible,
            ) {
                tracing::warn!("[GIZMO] Picker '{}' lost its collider", picker.name);
            }
        }
    }

    /// Planar patches for the XY, YZ and XZ targets plus their pickers,
    /// colored after the axis normal to each plane.
    pub(crate) fn add_plane_patches(
        &mut self,
        geometry: &dyn GeometryBuilder,
        prefix: &str,
        patch_half: f32,
        picker_half: f32,
        picker_thickness: f32,
        patch_offset: f32,
    ) {
        let patch = Arc::new(geometry.plane(Vec2::splat(patch_half)));
        for plane in GizmoPlane::AXIS_PAIRS {
            let Some(normal) = plane.normal_axis() else {
                continue;
            };
            let target = GizmoTarget::Plane(plane);
            let offset = (Vec3::ONE - normal.unit()) * patch_offset;
            let rotation = normal.align_from_y();

            self.add_handle(
                format!("{prefix}_{}", plane.label()),
                target,
                patch.clone(),
                normal.color(),
                offset,
                rotation,
            );
            self.add_picker(
                format!("{prefix}_{}_picker", plane.label()),
                target,
                PickerShape::Cuboid {
                    half_extents: Vec3::new(picker_half, picker_thickness, picker_half),
                },
                offset,
                rotation,
            );
        }
    }

    /// Small cube at the origin driving the uniform target.
    pub(crate) fn add_center_handle(
        &mut self,
        geometry: &dyn GeometryBuilder,
        prefix: &str,
        half: f32,
        picker_half: f32,
    ) {
        let target = GizmoTarget::Plane(GizmoPlane::XYZ);
        self.add_handle(
            format!("{prefix}_XYZ"),
            target,
            Arc::new(geometry.cuboid(Vec3::splat(half))),
            GizmoColor::WHITE,
            Vec3::ZERO,
            Quat::IDENTITY,
        );
        self.add_picker(
            format!("{prefix}_XYZ_picker"),
            target,
            PickerShape::Cuboid {
                half_extents: Vec3::splat(picker_half),
            },
            Vec3::ZERO,
            Quat::IDENTITY,
        );
    }
}

// ─── Variants ────────────────────────────────────────────────────────────────

/// Mode specific behaviour layered on a [`TransformGizmo`].
pub trait GizmoVariant: Send + Sync {
    fn core(&self) -> &TransformGizmo;

    fn core_mut(&mut self) -> &mut TransformGizmo;

    /// Plane used to drag `target`, given the eye vector in the gizmo frame.
    /// `None` when this mode cannot drag the target.
    fn choose_plane(&self, target: GizmoTarget, eye: Vec3) -> Option<GizmoPlane>;

    fn mode(&self) -> TransformMode {
        self.core().mode()
    }

    /// Container rotation for an object rotated by `object_rotation`.
    fn container_rotation(&self, object_rotation: Quat, space: TransformSpace) -> Quat {
        match space {
            TransformSpace::Local => object_rotation,
            TransformSpace::World => Quat::IDENTITY,
        }
    }

    /// Pick and activate the intersection plane for `target`. `eye` is the
    /// world space unit vector from the gizmo towards the camera. Clears the
    /// active plane when the target cannot be dragged in this mode.
    fn set_active_plane(&mut self, target: GizmoTarget, eye: Vec3) -> Option<ActivePlane> {
        let local_eye = self.core().container().to_local(eye);
        match self.choose_plane(target, local_eye) {
            Some(kind) => Some(self.core_mut().activate_plane(kind, eye)),
            None => {
                self.core_mut().clear_active_plane();
                None
            }
        }
    }
}

/// Plane choice shared by the translate and scale gizmos: single axes use
/// the axis-pair plane containing the axis that best faces the eye, anything
/// else drags on the camera-facing plane.
pub fn linear_drag_plane(target: GizmoTarget, eye: Vec3) -> GizmoPlane {
    match target {
        GizmoTarget::Axis(GizmoAxis::X) => {
            if eye.y.abs() > eye.z.abs() {
                GizmoPlane::XZ
            } else {
                GizmoPlane::XY
            }
        }
        GizmoTarget::Axis(GizmoAxis::Y) => {
            if eye.x.abs() > eye.z.abs() {
                GizmoPlane::YZ
            } else {
                GizmoPlane::XY
            }
        }
        GizmoTarget::Axis(GizmoAxis::Z) => {
            if eye.x.abs() > eye.y.abs() {
                GizmoPlane::YZ
            } else {
                GizmoPlane::XZ
            }
        }
        GizmoTarget::Plane(_) => GizmoPlane::XYZE,
    }
}

/// One gizmo per mode.
pub struct GizmoSet {
    translate: TranslateGizmo,
    rotate: RotateGizmo,
    scale: ScaleGizmo,
}

impl GizmoSet {
    pub fn new(geometry: &dyn GeometryBuilder, layer: LayerId, settings: &GizmoSettings) -> Self {
        Self {
            translate: TranslateGizmo::new(geometry, layer, settings),
            rotate: RotateGizmo::new(geometry, layer, settings),
            scale: ScaleGizmo::new(geometry, layer, settings),
        }
    }

    pub fn get(&self, mode: TransformMode) -> &dyn GizmoVariant {
        match mode {
            TransformMode::Translate => &self.translate,
            TransformMode::Rotate => &self.rotate,
            TransformMode::Scale => &self.scale,
        }
    }

    pub fn get_mut(&mut self, mode: TransformMode) -> &mut dyn GizmoVariant {
        match mode {
            TransformMode::Translate => &mut self.translate,
            TransformMode::Rotate => &mut self.rotate,
            TransformMode::Scale => &mut self.scale,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn GizmoVariant> {
        [
            &mut self.translate as &mut dyn GizmoVariant,
            &mut self.rotate as &mut dyn GizmoVariant,
            &mut self.scale as &mut dyn GizmoVariant,
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gizmo() -> TransformGizmo {
        TransformGizmo::new(TransformMode::Translate, LayerId(1), &GizmoSettings::default())
    }

    #[test]
    fn test_screen_scale_matches_reference_distance() {
        assert!((screen_scale(Vec3::ZERO, Vec3::new(0.0, 0.0, 6.0), 6.0, 1.0) - 1.0).abs() < 1e-6);
        assert!((screen_scale(Vec3::ZERO, Vec3::new(0.0, 0.0, 12.0), 6.0, 0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_never_collapses_scale() {
        let mut gizmo = gizmo();
        assert_eq!(gizmo.update(Vec3::ZERO, 1.0, 6.0), MIN_CONTAINER_SCALE);
    }

    #[test]
    fn test_selecting_moves_container() {
        let mut gizmo = gizmo();
        gizmo.set_selected_object(Some(("crate_01".into(), Vec3::new(1.0, 2.0, 3.0))));
        assert_eq!(gizmo.container().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(gizmo.selected().map(String::as_str), Some("crate_01"));

        gizmo.set_selected_object(None);
        assert!(gizmo.selected().is_none());
    }

    #[test]
    fn test_container_places_parts_scaled_and_rotated() {
        let container = GizmoContainer {
            position: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: 2.0,
        };
        let (position, _) = container.place(Vec3::X, Quat::IDENTITY);
        assert!(position.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_axis_pair_plane_follows_container_rotation() {
        let mut gizmo = gizmo();
        gizmo.place(Vec3::ONE, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let plane = gizmo.activate_plane(GizmoPlane::XY, Vec3::Z);
        assert!(plane.normal.abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(plane.origin, Vec3::ONE);
    }

    #[test]
    fn test_camera_facing_plane_uses_eye() {
        let mut gizmo = gizmo();
        let plane = gizmo.activate_plane(GizmoPlane::XYZE, Vec3::new(0.0, 3.0, 4.0));
        assert!(plane.normal.abs_diff_eq(Vec3::new(0.0, 0.6, 0.8), 1e-6));
    }

    #[test]
    fn test_ray_plane_intersection() {
        let plane = ActivePlane {
            kind: GizmoPlane::XY,
            origin: Vec3::ZERO,
            normal: Vec3::Z,
        };
        let hit = plane.intersect_ray(Vec3::new(1.0, 2.0, 5.0), Vec3::NEG_Z).unwrap();
        assert_eq!(hit, Vec3::new(1.0, 2.0, 0.0));

        assert!(plane.intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::X).is_none());
        assert!(plane.intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).is_none());
    }

    #[test]
    fn test_linear_plane_choice_contains_axis() {
        let eyes = [
            Vec3::new(0.1, 0.9, 0.2),
            Vec3::new(0.9, 0.1, 0.2),
            Vec3::new(0.1, 0.2, 0.9),
            Vec3::new(-0.6, -0.5, 0.6),
        ];
        for eye in eyes {
            for axis in GizmoAxis::ALL {
                let plane = linear_drag_plane(GizmoTarget::Axis(axis), eye.normalize());
                assert!(plane.contains(axis), "{axis:?} dragged on {plane:?}");
                assert_eq!(plane, linear_drag_plane(GizmoTarget::Axis(axis), eye.normalize()));
            }
        }
    }

    #[test]
    fn test_linear_plane_choice_table() {
        let looking_down = Vec3::new(0.0, 1.0, 0.1).normalize();
        assert_eq!(linear_drag_plane(GizmoTarget::Axis(GizmoAxis::X), looking_down), GizmoPlane::XZ);
        assert_eq!(linear_drag_plane(GizmoTarget::Axis(GizmoAxis::Z), looking_down), GizmoPlane::XZ);
        assert_eq!(linear_drag_plane(GizmoTarget::Axis(GizmoAxis::Y), looking_down), GizmoPlane::XY);

        let from_side = Vec3::new(1.0, 0.1, 0.2).normalize();
        assert_eq!(linear_drag_plane(GizmoTarget::Axis(GizmoAxis::Y), from_side), GizmoPlane::YZ);
        assert_eq!(linear_drag_plane(GizmoTarget::Axis(GizmoAxis::Z), from_side), GizmoPlane::YZ);

        for plane in [GizmoPlane::XY, GizmoPlane::YZ, GizmoPlane::XZ, GizmoPlane::XYZ] {
            assert_eq!(linear_drag_plane(GizmoTarget::Plane(plane), from_side), GizmoPlane::XYZE);
        }
    }

    #[test]
    fn test_highlight_is_exclusive() {
        let mut set = GizmoSet::new(
            &geometry::ProceduralGeometry::default(),
            LayerId(1),
            &GizmoSettings::default(),
        );
        let core = set.get_mut(TransformMode::Translate).core_mut();
        core.highlight(Some(GizmoTarget::Axis(GizmoAxis::X)));
        core.highlight(Some(GizmoTarget::Axis(GizmoAxis::Y)));

        let highlighted: Vec<GizmoTarget> = core
            .handles()
            .iter()
            .filter(|h| h.material.is_highlighted())
            .map(|h| h.tag.target)
            .collect();
        assert!(!highlighted.is_empty());
        assert!(highlighted.iter().all(|t| *t == GizmoTarget::Axis(GizmoAxis::Y)));
        assert_eq!(core.highlighted_target(), Some(GizmoTarget::Axis(GizmoAxis::Y)));

        core.highlight(None);
        assert_eq!(core.highlighted_target(), None);
    }

    #[test]
    fn test_hidden_gizmo_renders_nothing() {
        let mut set = GizmoSet::new(
            &geometry::ProceduralGeometry::default(),
            LayerId(1),
            &GizmoSettings::default(),
        );
        let core = set.get_mut(TransformMode::Rotate).core_mut();
        assert_eq!(core.render_items().count(), 0);
        core.set_visible(true);
        assert_eq!(core.render_items().count(), core.handles().len());
    }
}
