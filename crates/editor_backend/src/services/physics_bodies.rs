//! Rigid bodies of scene objects, as far as the editor cares about them.
//!
//! The editor never steps the simulation. Dragging an object with a gizmo
//! teleports its body to the new pose and kills any velocity it had, so
//! resuming simulation does not fling the object.

use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::Mutex;
use rapier3d::na::Vector3;
use rapier3d::prelude::*;

use super::picking_service::to_isometry;

pub struct PhysicsBodies {
    rigid_body_set: Arc<Mutex<RigidBodySet>>,
}

impl PhysicsBodies {
    pub fn new() -> Self {
        Self::with_body_set(Arc::new(Mutex::new(RigidBodySet::new())))
    }

    /// Share a body set owned by the host's physics world.
    pub fn with_body_set(rigid_body_set: Arc<Mutex<RigidBodySet>>) -> Self {
        Self { rigid_body_set }
    }

    pub fn insert(&self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.lock().insert(body)
    }

    pub fn insert_dynamic(&self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        self.insert(
            RigidBodyBuilder::dynamic()
                .position(to_isometry(position, rotation))
                .build(),
        )
    }

    pub fn len(&self) -> usize {
        self.rigid_body_set.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move a body to a pose and zero its velocities. Returns `false` if the
    /// body is gone.
    pub fn teleport(&self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) -> bool {
        let mut bodies = self.rigid_body_set.lock();
        let Some(body) = bodies.get_mut(handle) else {
            return false;
        };
        body.set_position(to_isometry(position, rotation), true);
        body.set_linvel(Vector3::zeros(), true);
        body.set_angvel(Vector3::zeros(), true);
        true
    }

    pub fn set_velocity(&self, handle: RigidBodyHandle, linear: Vec3, angular: Vec3) -> bool {
        let mut bodies = self.rigid_body_set.lock();
        let Some(body) = bodies.get_mut(handle) else {
            return false;
        };
        body.set_linvel(Vector3::new(linear.x, linear.y, linear.z), true);
        body.set_angvel(Vector3::new(angular.x, angular.y, angular.z), true);
        true
    }

    pub fn pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let bodies = self.rigid_body_set.lock();
        let body = bodies.get(handle)?;
        let t = body.translation();
        let r = body.rotation();
        Some((Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(r.i, r.j, r.k, r.w)))
    }

    /// Linear and angular velocity.
    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<(Vec3, Vec3)> {
        let bodies = self.rigid_body_set.lock();
        let body = bodies.get(handle)?;
        let v = body.linvel();
        let w = body.angvel();
        Some((Vec3::new(v.x, v.y, v.z), Vec3::new(w.x, w.y, w.z)))
    }
}

impl Default for PhysicsBodies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teleport_moves_and_stops_body() {
        let physics = PhysicsBodies::new();
        let handle = physics.insert_dynamic(Vec3::ZERO, Quat::IDENTITY);
        assert!(physics.set_velocity(handle, Vec3::new(3.0, 0.0, 0.0), Vec3::Y));

        let rotation = Quat::from_rotation_z(0.5);
        assert!(physics.teleport(handle, Vec3::new(1.0, 2.0, 3.0), rotation));

        let (position, actual) = physics.pose(handle).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(actual.abs_diff_eq(rotation, 1e-6));
        assert_eq!(physics.velocity(handle).unwrap(), (Vec3::ZERO, Vec3::ZERO));
    }

    #[test]
    fn test_teleport_unknown_body() {
        let physics = PhysicsBodies::new();
        let handle = physics.insert_dynamic(Vec3::ZERO, Quat::IDENTITY);
        let other = PhysicsBodies::new();
        assert!(other.is_empty());
        assert!(!other.teleport(handle, Vec3::ONE, Quat::IDENTITY));
        assert_eq!(physics.len(), 1);
    }
}
