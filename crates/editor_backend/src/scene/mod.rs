//! Shared scene database for the editor.
//!
//! One `SceneDb` is shared by:
//! - The viewport renderer (reads transforms lock-free via atomics)
//! - The transform controls (write transforms while a gizmo is dragged)
//! - The host editor (adds and removes objects, links rigid bodies)
//!
//! ## Design
//!
//! Hot-path data (transforms) is stored as atomics so the render
//! thread never blocks on a lock. Cold data (name, physics body) sits behind a
//! `parking_lot::RwLock` that is only held briefly.
//!
//! Object storage uses `dashmap::DashMap`, reads on different shards proceed
//! in parallel.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use glam::{Quat, Vec3};
use parking_lot::RwLock;
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

// ─── Public types ────────────────────────────────────────────────────────────

pub type ObjectId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Avatar,
    Prop,
    Environment,
    Light,
    Camera,
    /// Editor helper geometry. Never selectable.
    GizmoGeometry,
}

impl ObjectKind {
    pub fn is_selectable(self) -> bool {
        !matches!(self, Self::GizmoGeometry)
    }
}

/// Position, rotation and scale of an object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// A point-in-time snapshot of an object, used for display, undo and
/// serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneObjectSnapshot {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    pub transform: TransformSnapshot,
}

impl SceneObjectSnapshot {
    /// Snapshot with an auto-assigned id at the origin.
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            kind,
            transform: TransformSnapshot::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }
}

// ─── Live object entry ───────────────────────────────────────────────────────

fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

/// A live scene object stored in the database.
pub struct SceneEntry {
    pub id: ObjectId,
    /// Kind is immutable after creation.
    pub kind: ObjectKind,

    // Hot path, lock-free
    position: [AtomicU32; 3],
    /// Quaternion as x, y, z, w.
    rotation: [AtomicU32; 4],
    scale: [AtomicU32; 3],

    pub meta: RwLock<SceneEntryMeta>,
}

pub struct SceneEntryMeta {
    pub name: String,
    /// Rigid body kept in sync while the object is dragged.
    pub body: Option<RigidBodyHandle>,
}

impl SceneEntry {
    fn new(snap: &SceneObjectSnapshot) -> Self {
        let t = &snap.transform;
        let rotation = t.rotation.normalize();
        Self {
            id: snap.id.clone(),
            kind: snap.kind,
            position: t.position.to_array().map(|v| AtomicU32::new(v.to_bits())),
            rotation: rotation.to_array().map(|v| AtomicU32::new(v.to_bits())),
            scale: t.scale.to_array().map(|v| AtomicU32::new(v.to_bits())),
            meta: RwLock::new(SceneEntryMeta {
                name: snap.name.clone(),
                body: None,
            }),
        }
    }

    // ── Hot-path accessors ───────────────────────────────────────────────

    #[inline]
    pub fn get_position(&self) -> Vec3 {
        Vec3::new(
            load_f32(&self.position[0]),
            load_f32(&self.position[1]),
            load_f32(&self.position[2]),
        )
    }

    #[inline]
    fn set_position(&self, v: Vec3) {
        for (cell, value) in self.position.iter().zip(v.to_array()) {
            store_f32(cell, value);
        }
    }

    #[inline]
    pub fn get_rotation(&self) -> Quat {
        Quat::from_xyzw(
            load_f32(&self.rotation[0]),
            load_f32(&self.rotation[1]),
            load_f32(&self.rotation[2]),
            load_f32(&self.rotation[3]),
        )
    }

    #[inline]
    fn set_rotation(&self, q: Quat) {
        for (cell, value) in self.rotation.iter().zip(q.normalize().to_array()) {
            store_f32(cell, value);
        }
    }

    #[inline]
    pub fn get_scale(&self) -> Vec3 {
        Vec3::new(
            load_f32(&self.scale[0]),
            load_f32(&self.scale[1]),
            load_f32(&self.scale[2]),
        )
    }

    #[inline]
    fn set_scale(&self, v: Vec3) {
        for (cell, value) in self.scale.iter().zip(v.to_array()) {
            store_f32(cell, value);
        }
    }

    pub fn transform(&self) -> TransformSnapshot {
        TransformSnapshot {
            position: self.get_position(),
            rotation: self.get_rotation(),
            scale: self.get_scale(),
        }
    }

    pub fn apply(&self, transform: &TransformSnapshot) {
        self.set_position(transform.position);
        self.set_rotation(transform.rotation);
        self.set_scale(transform.scale);
    }

    pub fn snapshot(&self) -> SceneObjectSnapshot {
        SceneObjectSnapshot {
            id: self.id.clone(),
            name: self.meta.read().name.clone(),
            kind: self.kind,
            transform: self.transform(),
        }
    }
}

// ─── SceneDb ─────────────────────────────────────────────────────────────────

struct SceneDbInner {
    objects: DashMap<ObjectId, Arc<SceneEntry>>,
    next_id: AtomicU64,
    selected: RwLock<Option<ObjectId>>,
}

/// The shared scene database. Clone-able, all clones share the same data.
#[derive(Clone)]
pub struct SceneDb {
    inner: Arc<SceneDbInner>,
}

impl SceneDb {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SceneDbInner {
                objects: DashMap::new(),
                next_id: AtomicU64::new(1),
                selected: RwLock::new(None),
            }),
        }
    }

    // ── Object creation / deletion ────────────────────────────────────────

    /// Add an object. Returns its id.
    pub fn add_object(&self, mut snap: SceneObjectSnapshot) -> ObjectId {
        if snap.id.is_empty() {
            let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            snap.id = format!("object_{}", n);
        }
        let id = snap.id.clone();
        self.inner.objects.insert(id.clone(), Arc::new(SceneEntry::new(&snap)));
        tracing::debug!("[SCENE] Added {:?} '{}' as {}", snap.kind, snap.name, id);
        id
    }

    pub fn remove_object(&self, id: &str) -> bool {
        if self.inner.objects.remove(id).is_none() {
            return false;
        }
        let mut sel = self.inner.selected.write();
        if sel.as_deref() == Some(id) {
            *sel = None;
        }
        true
    }

    // ── Selection ─────────────────────────────────────────────────────────

    pub fn select_object(&self, id: Option<ObjectId>) {
        *self.inner.selected.write() = id;
    }

    pub fn get_selected_id(&self) -> Option<ObjectId> {
        self.inner.selected.read().clone()
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.inner.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.objects.is_empty()
    }

    pub fn get_entry(&self, id: &str) -> Option<Arc<SceneEntry>> {
        self.inner.objects.get(id).map(|e| e.clone())
    }

    pub fn get_object(&self, id: &str) -> Option<SceneObjectSnapshot> {
        self.inner.objects.get(id).map(|e| e.snapshot())
    }

    pub fn transform(&self, id: &str) -> Option<TransformSnapshot> {
        self.inner.objects.get(id).map(|e| e.transform())
    }

    pub fn body_of(&self, id: &str) -> Option<RigidBodyHandle> {
        self.inner.objects.get(id).and_then(|e| e.meta.read().body)
    }

    // ── Writes ────────────────────────────────────────────────────────────

    pub fn apply_transform(&self, id: &str, transform: &TransformSnapshot) -> bool {
        self.with_entry(id, |e| e.apply(transform))
    }

    /// Link a rigid body so gizmo drags teleport it along with the object.
    pub fn attach_body(&self, id: &str, body: RigidBodyHandle) -> bool {
        self.with_entry(id, |e| e.meta.write().body = Some(body))
    }

    fn with_entry(&self, id: &str, f: impl FnOnce(&SceneEntry)) -> bool {
        match self.inner.objects.get(id) {
            Some(entry) => {
                f(entry.value());
                true
            }
            None => false,
        }
    }
}

impl Default for SceneDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_ids() {
        let scene = SceneDb::new();
        let a = scene.add_object(SceneObjectSnapshot::new("Avatar", ObjectKind::Avatar));
        let b = scene.add_object(SceneObjectSnapshot::new("Desk", ObjectKind::Prop).with_id("desk"));
        assert_eq!(a, "object_1");
        assert_eq!(b, "desk");
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_transform_round_trips_through_atomics() {
        let scene = SceneDb::new();
        let rotation = Quat::from_rotation_y(0.4);
        let id = scene.add_object(
            SceneObjectSnapshot::new("Chair", ObjectKind::Prop)
                .at(Vec3::new(1.0, 2.0, 3.0))
                .rotated(rotation)
                .scaled(Vec3::splat(2.0)),
        );

        let t = scene.transform(&id).unwrap();
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(t.rotation.abs_diff_eq(rotation, 1e-6));
        assert_eq!(t.scale, Vec3::splat(2.0));

        let moved = TransformSnapshot {
            position: Vec3::X,
            ..t
        };
        assert!(scene.apply_transform(&id, &moved));
        assert_eq!(scene.transform(&id).unwrap().position, Vec3::X);
    }

    #[test]
    fn test_writes_to_missing_objects_fail() {
        let scene = SceneDb::new();
        assert!(!scene.apply_transform("ghost", &TransformSnapshot::default()));
        assert!(!scene.attach_body("ghost", RigidBodyHandle::invalid()));
        assert!(scene.transform("ghost").is_none());
    }

    #[test]
    fn test_removing_selected_clears_selection() {
        let scene = SceneDb::new();
        let id = scene.add_object(SceneObjectSnapshot::new("Lamp", ObjectKind::Light));
        scene.select_object(Some(id.clone()));
        assert!(scene.remove_object(&id));
        assert_eq!(scene.get_selected_id(), None);
    }

    #[test]
    fn test_gizmo_geometry_is_not_selectable() {
        assert!(!ObjectKind::GizmoGeometry.is_selectable());
        assert!(ObjectKind::Avatar.is_selectable());
    }

    #[test]
    fn test_snapshot_serializes() {
        let scene = SceneDb::new();
        let id = scene.add_object(SceneObjectSnapshot::new("Trainee", ObjectKind::Avatar).at(Vec3::Y));
        let snap = scene.get_object(&id).unwrap();
        let text = ron::to_string(&snap).unwrap();
        let back: SceneObjectSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(back.transform, snap.transform);
        assert_eq!(back.name, "Trainee");
    }
}
