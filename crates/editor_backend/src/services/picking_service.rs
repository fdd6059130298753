//! Picker ray casts for gizmo interaction.
//!
//! Picker volumes are sensor colliders in a collider set owned by this
//! service, separate from the scene's physics world. Each collider maps back
//! to a [`PickerEntry`] carrying the handle tag, so a hit resolves straight to
//! its target without name parsing.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::Mutex;
use rapier3d::na::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::parry::query::{Ray, RayCast};
use rapier3d::prelude::*;

use crate::gizmo::geometry::PickerShape;
use crate::gizmo::layer::LayerId;
use crate::gizmo::types::{HandleTag, TransformMode};

/// What a picker collider belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerEntry {
    pub mode: TransformMode,
    pub tag: HandleTag,
    pub layer: LayerId,
    /// Disabled pickers never report hits.
    pub enabled: bool,
}

/// Closest picker along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerHit {
    pub collider: ColliderHandle,
    pub entry: PickerEntry,
    pub point: Vec3,
    pub distance: f32,
}

/// Collider set holding every registered picker volume.
pub struct PickingService {
    collider_set: Arc<Mutex<ColliderSet>>,
    collider_to_picker: Arc<Mutex<HashMap<ColliderHandle, PickerEntry>>>,
}

impl PickingService {
    pub fn new() -> Self {
        Self {
            collider_set: Arc::new(Mutex::new(ColliderSet::new())),
            collider_to_picker: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a picker volume placed at `position`/`rotation`, with its
    /// shape scaled uniformly by `scale`.
    pub fn register_picker(
        &self,
        entry: PickerEntry,
        shape: &PickerShape,
        position: Vec3,
        rotation: Quat,
        scale: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::new(to_shared_shape(shape, scale))
            .position(to_isometry(position, rotation))
            .sensor(true)
            .build();
        let handle = self.collider_set.lock().insert(collider);
        self.collider_to_picker.lock().insert(handle, entry);
        handle
    }

    /// Move, rescale and enable/disable a registered picker. Returns `false`
    /// when the collider is unknown.
    pub fn update_picker(
        &self,
        handle: ColliderHandle,
        shape: &PickerShape,
        position: Vec3,
        rotation: Quat,
        scale: f32,
        enabled: bool,
    ) -> bool {
        let mut collider_set = self.collider_set.lock();
        let mut pickers = self.collider_to_picker.lock();
        let (Some(collider), Some(entry)) = (collider_set.get_mut(handle), pickers.get_mut(&handle)) else {
            return false;
        };

        collider.set_position(to_isometry(position, rotation));
        collider.set_shape(to_shared_shape(shape, scale));
        entry.enabled = enabled;
        true
    }

    pub fn unregister_picker(&self, handle: ColliderHandle) -> bool {
        let known = self.collider_to_picker.lock().remove(&handle).is_some();
        let mut islands = IslandManager::new();
        let mut bodies = RigidBodySet::new();
        let removed = self
            .collider_set
            .lock()
            .remove(handle, &mut islands, &mut bodies, false)
            .is_some();
        known && removed
    }

    pub fn len(&self) -> usize {
        self.collider_to_picker.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closest enabled picker accepted by `filter` on the segment `from → to`.
    pub fn raycast_first(
        &self,
        from: Vec3,
        to: Vec3,
        filter: impl Fn(&PickerEntry) -> bool,
    ) -> Option<PickerHit> {
        let segment = to - from;
        let max_distance = segment.length();
        let direction = segment.try_normalize()?;

        let ray = Ray::new(
            Point3::new(from.x, from.y, from.z),
            Vector3::new(direction.x, direction.y, direction.z),
        );

        let collider_set = self.collider_set.lock();
        let pickers = self.collider_to_picker.lock();

        let mut closest_hit: Option<(ColliderHandle, PickerEntry, f32)> = None;
        let mut tested_count = 0;

        for (handle, entry) in pickers.iter() {
            if !entry.enabled || !filter(entry) {
                continue;
            }
            let Some(collider) = collider_set.get(*handle) else {
                continue;
            };
            tested_count += 1;

            if let Some(toi) = collider.shape().cast_ray(collider.position(), &ray, max_distance, true) {
                if closest_hit.map_or(true, |(_, _, best)| toi < best) {
                    closest_hit = Some((*handle, *entry, toi));
                }
            }
        }

        tracing::trace!(
            "[PICKING] Tested {} pickers, hit: {}",
            tested_count,
            closest_hit.is_some()
        );

        closest_hit.map(|(collider, entry, distance)| PickerHit {
            collider,
            entry,
            point: from + direction * distance,
            distance,
        })
    }
}

impl Default for PickingService {
    fn default() -> Self {
        Self::new()
    }
}

pub fn to_isometry(position: Vec3, rotation: Quat) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(position.x, position.y, position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z)),
    )
}

/// Collider shape for a picker, scaled uniformly.
pub fn to_shared_shape(shape: &PickerShape, scale: f32) -> SharedShape {
    match *shape {
        PickerShape::Cylinder { radius, height } => {
            SharedShape::cylinder(height * 0.5 * scale, radius * scale)
        }
        PickerShape::Cuboid { half_extents } => {
            let h = half_extents * scale;
            SharedShape::cuboid(h.x, h.y, h.z)
        }
        PickerShape::Ring {
            radius,
            tube_radius,
            segments,
        } => {
            let segments = segments.max(3);
            let point = |i: usize| {
                let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
                Point3::new(angle.cos() * radius * scale, 0.0, angle.sin() * radius * scale)
            };
            let parts = (0..segments)
                .map(|i| {
                    (
                        Isometry3::identity(),
                        SharedShape::capsule(point(i), point(i + 1), tube_radius * scale),
                    )
                })
                .collect();
            SharedShape::compound(parts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::types::{GizmoAxis, GizmoPlane, GizmoTarget};

    fn entry(target: GizmoTarget) -> PickerEntry {
        PickerEntry {
            mode: TransformMode::Translate,
            tag: HandleTag::picker(target),
            layer: LayerId(1),
            enabled: true,
        }
    }

    #[test]
    fn test_raycast_returns_closest_picker() {
        let picking = PickingService::new();
        let cube = PickerShape::Cuboid { half_extents: Vec3::splat(0.5) };
        picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::X)), &cube, Vec3::new(0.0, 0.0, -5.0), Quat::IDENTITY, 1.0);
        picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::Y)), &cube, Vec3::new(0.0, 0.0, -2.0), Quat::IDENTITY, 1.0);

        let hit = picking
            .raycast_first(Vec3::ZERO, Vec3::new(0.0, 0.0, -100.0), |_| true)
            .unwrap();
        assert_eq!(hit.entry.tag.target, GizmoTarget::Axis(GizmoAxis::Y));
        assert!((hit.distance - 1.5).abs() < 1e-4);
        assert!(hit.point.abs_diff_eq(Vec3::new(0.0, 0.0, -1.5), 1e-4));
    }

    #[test]
    fn test_raycast_respects_filter_and_enabled() {
        let picking = PickingService::new();
        let cube = PickerShape::Cuboid { half_extents: Vec3::splat(0.5) };
        let near = picking.register_picker(entry(GizmoTarget::Plane(GizmoPlane::XY)), &cube, Vec3::new(0.0, 0.0, -2.0), Quat::IDENTITY, 1.0);
        picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::Z)), &cube, Vec3::new(0.0, 0.0, -5.0), Quat::IDENTITY, 1.0);

        let hit = picking
            .raycast_first(Vec3::ZERO, Vec3::new(0.0, 0.0, -100.0), |e| {
                matches!(e.tag.target, GizmoTarget::Axis(_))
            })
            .unwrap();
        assert_eq!(hit.entry.tag.target, GizmoTarget::Axis(GizmoAxis::Z));

        assert!(picking.update_picker(near, &cube, Vec3::new(0.0, 0.0, -2.0), Quat::IDENTITY, 1.0, false));
        let hit = picking
            .raycast_first(Vec3::ZERO, Vec3::new(0.0, 0.0, -100.0), |_| true)
            .unwrap();
        assert_eq!(hit.entry.tag.target, GizmoTarget::Axis(GizmoAxis::Z));
    }

    #[test]
    fn test_segment_length_limits_hits() {
        let picking = PickingService::new();
        let cube = PickerShape::Cuboid { half_extents: Vec3::splat(0.5) };
        picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::X)), &cube, Vec3::new(0.0, 0.0, -5.0), Quat::IDENTITY, 1.0);

        assert!(picking.raycast_first(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0), |_| true).is_none());
        assert!(picking.raycast_first(Vec3::ZERO, Vec3::ZERO, |_| true).is_none());
    }

    #[test]
    fn test_update_moves_and_scales_picker() {
        let picking = PickingService::new();
        let cylinder = PickerShape::Cylinder { radius: 0.1, height: 1.2 };
        let handle = picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::Y)), &cylinder, Vec3::ZERO, Quat::IDENTITY, 1.0);

        let ray_at = |x: f32| picking.raycast_first(Vec3::new(x, 0.0, 10.0), Vec3::new(x, 0.0, -10.0), |_| true);
        assert!(ray_at(0.0).is_some());
        assert!(ray_at(0.5).is_none());

        assert!(picking.update_picker(handle, &cylinder, Vec3::new(0.5, 0.0, 0.0), Quat::IDENTITY, 2.0, true));
        assert!(ray_at(0.5).is_some());
        assert!(ray_at(0.65).is_some());
    }

    #[test]
    fn test_ring_picker_has_a_hole() {
        let picking = PickingService::new();
        let ring = PickerShape::Ring { radius: 0.5, tube_radius: 0.05, segments: 24 };
        picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::Y)), &ring, Vec3::ZERO, Quat::IDENTITY, 1.0);

        let down = |x: f32| picking.raycast_first(Vec3::new(x, 5.0, 0.0), Vec3::new(x, -5.0, 0.0), |_| true);
        assert!(down(0.5).is_some());
        assert!(down(0.0).is_none());
    }

    #[test]
    fn test_unregister_forgets_picker() {
        let picking = PickingService::new();
        let cube = PickerShape::Cuboid { half_extents: Vec3::splat(0.5) };
        let handle = picking.register_picker(entry(GizmoTarget::Axis(GizmoAxis::X)), &cube, Vec3::ZERO, Quat::IDENTITY, 1.0);
        assert_eq!(picking.len(), 1);
        assert!(picking.unregister_picker(handle));
        assert!(picking.is_empty());
        assert!(!picking.unregister_picker(handle));
        assert!(picking.raycast_first(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -5.0), |_| true).is_none());
    }
}
