//! Viewport camera used for picking and projection.
//!
//! Screen coordinates are pixels with the origin in the top-left corner of
//! the canvas, matching pointer event offsets.

use glam::{Mat3, Quat, Vec2, Vec3};

use crate::error::GizmoError;
use crate::gizmo::layer::LayerId;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    viewport: Vec2,
    layers: Vec<LayerId>,
}

impl ViewportCamera {
    pub fn new(viewport: Vec2) -> Result<Self, GizmoError> {
        check_viewport(viewport)?;
        Ok(Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            rotation: Quat::IDENTITY,
            fov_y: 45f32.to_radians(),
            near_clip: 0.1,
            far_clip: 1000.0,
            viewport,
            layers: Vec::new(),
        })
    }

    /// Place the camera at `position` looking at `target`.
    pub fn looking_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.look_at(position, target);
        self
    }

    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        let forward = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let up_hint = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let right = forward.cross(up_hint).normalize();
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize();
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) -> Result<(), GizmoError> {
        check_viewport(viewport)?;
        self.viewport = viewport;
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub fn has_layer(&self, layer: LayerId) -> bool {
        self.layers.contains(&layer)
    }

    pub fn add_layer(&mut self, layer: LayerId) {
        if !self.has_layer(layer) {
            self.layers.push(layer);
        }
    }

    fn screen_direction(&self, screen: Vec2) -> Vec3 {
        let ndc_x = (screen.x / self.viewport.x) * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen.y / self.viewport.y) * 2.0;
        let half_height = (self.fov_y / 2.0).tan();
        let half_width = half_height * self.aspect_ratio();
        self.forward()
            + self.right() * (ndc_x * half_width)
            + self.up() * (ndc_y * half_height)
    }

    /// World point under `screen` at `depth` units along the view axis.
    pub fn screen_to_world(&self, screen: Vec2, depth: f32) -> Vec3 {
        self.position + self.screen_direction(screen) * depth
    }

    /// Picking ray through `screen` as (origin, unit direction).
    pub fn ray(&self, screen: Vec2) -> (Vec3, Vec3) {
        (self.position, self.screen_direction(screen).normalize())
    }

    /// Project a world point to screen pixels. `None` when behind the camera.
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let relative = point - self.position;
        let depth = relative.dot(self.forward());
        if depth <= f32::EPSILON {
            return None;
        }
        let half_height = (self.fov_y / 2.0).tan();
        let half_width = half_height * self.aspect_ratio();
        let ndc_x = relative.dot(self.right()) / (depth * half_width);
        let ndc_y = relative.dot(self.up()) / (depth * half_height);
        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc_y) * 0.5 * self.viewport.y,
        ))
    }
}

fn check_viewport(viewport: Vec2) -> Result<(), GizmoError> {
    if viewport.x > 0.0 && viewport.y > 0.0 && viewport.is_finite() {
        Ok(())
    } else {
        Err(GizmoError::InvalidViewport {
            width: viewport.x,
            height: viewport.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ViewportCamera {
        ViewportCamera::new(Vec2::new(800.0, 600.0))
            .unwrap()
            .looking_at(Vec3::new(3.0, 4.0, 10.0), Vec3::ZERO)
    }

    #[test]
    fn test_rejects_empty_viewport() {
        assert!(matches!(
            ViewportCamera::new(Vec2::new(0.0, 600.0)),
            Err(GizmoError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let camera = camera();
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
        assert!(camera.right().y.abs() < 1e-5);
    }

    #[test]
    fn test_center_of_screen_hits_target() {
        let camera = camera();
        let (origin, dir) = camera.ray(Vec2::new(400.0, 300.0));
        let distance = camera.position.length();
        assert!((origin + dir * distance).abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn test_project_then_unproject() {
        let camera = camera();
        let point = Vec3::new(1.0, -0.5, 2.0);
        let screen = camera.world_to_screen(point).unwrap();
        let (origin, dir) = camera.ray(screen);
        let along = (point - origin).dot(dir);
        assert!((origin + dir * along).abs_diff_eq(point, 1e-4));
    }

    #[test]
    fn test_point_behind_camera_does_not_project() {
        let camera = camera();
        assert!(camera.world_to_screen(camera.position - camera.forward()).is_none());
    }

    #[test]
    fn test_layers_are_unique() {
        let mut camera = camera();
        camera.add_layer(LayerId(3));
        camera.add_layer(LayerId(3));
        assert_eq!(camera.layers(), &[LayerId(3)]);
    }
}
