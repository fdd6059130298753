//! Shared vocabulary for gizmo parts: axes, planes, targets and tags.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Manipulation mode. Selects which gizmo is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformMode {
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [Self::Translate, Self::Rotate, Self::Scale];

    pub fn name(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }
}

/// Reference frame the gizmo axes are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformSpace {
    World,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [Self::X, Self::Y, Self::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    pub fn color(self) -> GizmoColor {
        match self {
            Self::X => GizmoColor::RED,
            Self::Y => GizmoColor::GREEN,
            Self::Z => GizmoColor::BLUE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    /// Rotation taking the +Y axis of a Y-aligned primitive onto this axis.
    pub fn align_from_y(self) -> Quat {
        match self {
            Self::X => Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2),
            Self::Y => Quat::IDENTITY,
            Self::Z => Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        }
    }
}

/// Intersection surfaces. `XYZE` faces the camera, `XYZ` is the uniform target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GizmoPlane {
    XY,
    YZ,
    XZ,
    XYZE,
    XYZ,
}

impl GizmoPlane {
    pub const AXIS_PAIRS: [GizmoPlane; 3] = [Self::XY, Self::YZ, Self::XZ];

    /// Axis perpendicular to an axis-pair plane.
    pub fn normal_axis(self) -> Option<GizmoAxis> {
        match self {
            Self::XY => Some(GizmoAxis::Z),
            Self::YZ => Some(GizmoAxis::X),
            Self::XZ => Some(GizmoAxis::Y),
            Self::XYZE | Self::XYZ => None,
        }
    }

    /// Whether `axis` lies in this plane. The camera-facing and uniform
    /// planes contain every axis.
    pub fn contains(self, axis: GizmoAxis) -> bool {
        self.normal_axis().map_or(true, |normal| normal != axis)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::XY => "XY",
            Self::YZ => "YZ",
            Self::XZ => "XZ",
            Self::XYZE => "XYZE",
            Self::XYZ => "XYZ",
        }
    }
}

/// What a handle or picker manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GizmoTarget {
    Axis(GizmoAxis),
    Plane(GizmoPlane),
}

impl GizmoTarget {
    /// Whether a drag on this target moves the given axis component.
    pub fn affects(self, axis: GizmoAxis) -> bool {
        match self {
            Self::Axis(a) => a == axis,
            Self::Plane(plane) => plane.contains(axis),
        }
    }

    /// Component mask with 1.0 on affected axes and 0.0 elsewhere.
    pub fn mask(self) -> Vec3 {
        Vec3::new(
            if self.affects(GizmoAxis::X) { 1.0 } else { 0.0 },
            if self.affects(GizmoAxis::Y) { 1.0 } else { 0.0 },
            if self.affects(GizmoAxis::Z) { 1.0 } else { 0.0 },
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Axis(axis) => axis.label(),
            Self::Plane(plane) => plane.label(),
        }
    }
}

/// Role of a gizmo part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    /// Visible geometry, rendered and highlighted.
    Handle,
    /// Invisible collision proxy used for hit tests.
    Picker,
    /// Intersection surface used while dragging.
    Plane,
}

/// Metadata attached to every gizmo part when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleTag {
    pub target: GizmoTarget,
    pub role: HandleRole,
}

impl HandleTag {
    pub const fn handle(target: GizmoTarget) -> Self {
        Self { target, role: HandleRole::Handle }
    }

    pub const fn picker(target: GizmoTarget) -> Self {
        Self { target, role: HandleRole::Picker }
    }
}

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GizmoColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GizmoColor {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 0.9);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 0.9);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 0.9);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 0.9);
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5, 0.9);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_contains_its_axes() {
        assert!(GizmoPlane::XY.contains(GizmoAxis::X));
        assert!(GizmoPlane::XY.contains(GizmoAxis::Y));
        assert!(!GizmoPlane::XY.contains(GizmoAxis::Z));
        assert!(!GizmoPlane::YZ.contains(GizmoAxis::X));
        assert!(!GizmoPlane::XZ.contains(GizmoAxis::Y));
        for axis in GizmoAxis::ALL {
            assert!(GizmoPlane::XYZE.contains(axis));
        }
    }

    #[test]
    fn test_target_masks() {
        assert_eq!(GizmoTarget::Axis(GizmoAxis::X).mask(), Vec3::X);
        assert_eq!(GizmoTarget::Plane(GizmoPlane::XZ).mask(), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(GizmoTarget::Plane(GizmoPlane::XYZ).mask(), Vec3::ONE);
    }

    #[test]
    fn test_align_from_y_maps_onto_axis() {
        for axis in GizmoAxis::ALL {
            let mapped = axis.align_from_y() * Vec3::Y;
            assert!(mapped.abs_diff_eq(axis.unit(), 1e-6), "{axis:?} -> {mapped:?}");
        }
    }
}
