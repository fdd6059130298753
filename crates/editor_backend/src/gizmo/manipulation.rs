//! Pointer delta to transform math, one function per mode.
//!
//! `frame` is the gizmo container rotation at drag start: identity in world
//! space, the object rotation in local space. Deltas and points are expressed
//! in that frame before constraints apply.

use glam::{Quat, Vec3};

use super::types::{GizmoAxis, GizmoTarget, TransformSpace};

/// Round `value` to the nearest multiple of `step`.
pub fn snap(value: f32, step: Option<f32>) -> f32 {
    match step {
        Some(step) if step > 0.0 => (value / step).round() * step,
        _ => value,
    }
}

/// New position after dragging by `delta` (world space) on `target`.
/// Components outside the target are zeroed in the gizmo frame.
pub fn translate(
    start: Vec3,
    delta: Vec3,
    target: GizmoTarget,
    frame: Quat,
    step: Option<f32>,
) -> Vec3 {
    let local = frame.inverse() * delta * target.mask();
    let local = Vec3::new(snap(local.x, step), snap(local.y, step), snap(local.z, step));
    start + frame * local
}

/// New scale after dragging by `delta_local` (gizmo frame) on `target`.
///
/// Each component the target affects is multiplied by `1 + delta` on that
/// component and never drops below `min_scale`. Other components keep their
/// start value.
pub fn scale(start: Vec3, delta_local: Vec3, target: GizmoTarget, min_scale: f32) -> Vec3 {
    let mask = target.mask();
    let scaled = (start * (Vec3::ONE + delta_local)).max(Vec3::splat(min_scale));
    Vec3::select(mask.cmpgt(Vec3::ZERO), scaled, start)
}

/// Angle in degrees of `point` around `axis`, measured right-handed.
pub fn angle_about(axis: GizmoAxis, point: Vec3) -> f32 {
    let radians = match axis {
        GizmoAxis::X => point.z.atan2(point.y),
        GizmoAxis::Y => point.x.atan2(point.z),
        GizmoAxis::Z => point.y.atan2(point.x),
    };
    radians.to_degrees()
}

/// Signed angle in degrees swept from `from` to `to` around `axis`, in
/// `[-180, 180)`.
pub fn swept_angle(axis: GizmoAxis, from: Vec3, to: Vec3) -> f32 {
    let raw = angle_about(axis, to) - angle_about(axis, from);
    (raw + 180.0).rem_euclid(360.0) - 180.0
}

/// New rotation after sweeping from `from` to `to` around `axis`.
///
/// Both points are relative to the gizmo center and expressed in the gizmo
/// frame. World space rotations pre-multiply the start rotation, local ones
/// post-multiply it.
pub fn rotate(
    start: Quat,
    axis: GizmoAxis,
    from: Vec3,
    to: Vec3,
    space: TransformSpace,
    step: Option<f32>,
) -> Quat {
    let degrees = snap(swept_angle(axis, from, to), step);
    let delta = Quat::from_axis_angle(axis.unit(), degrees.to_radians());
    match space {
        TransformSpace::World => (delta * start).normalize(),
        TransformSpace::Local => (start * delta).normalize(),
    }
}
