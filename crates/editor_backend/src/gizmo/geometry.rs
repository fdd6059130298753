//! Gizmo geometry.
//!
//! Meshes are generated procedurally behind the [`GeometryBuilder`] trait so a
//! host can substitute its own primitives. All primitives are built around the
//! origin and aligned to +Y; gizmos orient them per axis with
//! [`super::types::GizmoAxis::align_from_y`].

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl PackedVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Indexed triangle mesh ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<PackedVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis aligned bounds as (min, max).
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), v| {
                let p = Vec3::from(v.position);
                (min.min(p), max.max(p))
            },
        )
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(PackedVertex::new(position.to_array(), normal.to_array()));
        index
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }
}

/// Primitive mesh factory used by the gizmos.
pub trait GeometryBuilder: Send + Sync {
    /// Y-aligned cylinder centered on the origin.
    fn cylinder(&self, radius: f32, height: f32) -> Mesh;

    /// Y-aligned cone with its base at `-height / 2` and tip at `+height / 2`.
    fn cone(&self, base_radius: f32, height: f32) -> Mesh;

    fn cuboid(&self, half_extents: Vec3) -> Mesh;

    /// Torus lying in the XZ plane, i.e. around the Y axis.
    fn torus(&self, ring_radius: f32, tube_radius: f32) -> Mesh;

    /// Double sided rectangle in the XZ plane.
    fn plane(&self, half_extents: Vec2) -> Mesh;
}

/// Default [`GeometryBuilder`] generating meshes on the CPU.
#[derive(Debug, Clone, Copy)]
pub struct ProceduralGeometry {
    pub radial_segments: usize,
    pub tube_segments: usize,
}

impl Default for ProceduralGeometry {
    fn default() -> Self {
        Self {
            radial_segments: 16,
            tube_segments: 8,
        }
    }
}

impl ProceduralGeometry {
    fn ring(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let segments = self.radial_segments.max(3);
        (0..=segments).map(move |i| {
            let angle = (i as f32 / segments as f32) * TAU;
            (angle.cos(), angle.sin())
        })
    }

    fn cap(&self, mesh: &mut Mesh, y: f32, radius: f32, normal: Vec3) {
        let center = mesh.push(Vec3::new(0.0, y, 0.0), normal);
        let rim: Vec<u32> = self
            .ring()
            .map(|(c, s)| mesh.push(Vec3::new(c * radius, y, s * radius), normal))
            .collect();
        for pair in rim.windows(2) {
            if normal.y > 0.0 {
                mesh.triangle(center, pair[1], pair[0]);
            } else {
                mesh.triangle(center, pair[0], pair[1]);
            }
        }
    }
}

impl GeometryBuilder for ProceduralGeometry {
    fn cylinder(&self, radius: f32, height: f32) -> Mesh {
        let mut mesh = Mesh::default();
        let half = height * 0.5;

        let mut previous: Option<(u32, u32)> = None;
        for (c, s) in self.ring() {
            let normal = Vec3::new(c, 0.0, s);
            let bottom = mesh.push(Vec3::new(c * radius, -half, s * radius), normal);
            let top = mesh.push(Vec3::new(c * radius, half, s * radius), normal);
            if let Some((prev_bottom, prev_top)) = previous {
                mesh.quad(prev_bottom, prev_top, top, bottom);
            }
            previous = Some((bottom, top));
        }

        self.cap(&mut mesh, half, radius, Vec3::Y);
        self.cap(&mut mesh, -half, radius, Vec3::NEG_Y);
        mesh
    }

    fn cone(&self, base_radius: f32, height: f32) -> Mesh {
        let mut mesh = Mesh::default();
        let half = height * 0.5;
        let slope = base_radius / height;

        let mut previous: Option<u32> = None;
        for (c, s) in self.ring() {
            let normal = Vec3::new(c, slope, s).normalize();
            let base = mesh.push(Vec3::new(c * base_radius, -half, s * base_radius), normal);
            if let Some(prev) = previous {
                let tip = mesh.push(Vec3::new(0.0, half, 0.0), normal);
                mesh.triangle(prev, tip, base);
            }
            previous = Some(base);
        }

        self.cap(&mut mesh, -half, base_radius, Vec3::NEG_Y);
        mesh
    }

    fn cuboid(&self, half_extents: Vec3) -> Mesh {
        let mut mesh = Mesh::default();
        let h = half_extents;

        // (normal, tangent u, tangent v) per face
        let faces = [
            (Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::X, Vec3::Y),
        ];

        for (normal, u, v) in faces {
            let center = normal * h;
            let du = u * h;
            let dv = v * h;
            let a = mesh.push(center - du - dv, normal);
            let b = mesh.push(center + du - dv, normal);
            let c = mesh.push(center + du + dv, normal);
            let d = mesh.push(center - du + dv, normal);
            mesh.quad(a, d, c, b);
        }
        mesh
    }

    fn torus(&self, ring_radius: f32, tube_radius: f32) -> Mesh {
        let mut mesh = Mesh::default();
        let major = self.radial_segments.max(3) * 2;
        let minor = self.tube_segments.max(3);

        for i in 0..=major {
            let u = (i as f32 / major as f32) * TAU;
            let (sin_u, cos_u) = u.sin_cos();

            for j in 0..=minor {
                let v = (j as f32 / minor as f32) * TAU;
                let (sin_v, cos_v) = v.sin_cos();

                let position = Vec3::new(
                    (ring_radius + tube_radius * cos_v) * cos_u,
                    tube_radius * sin_v,
                    (ring_radius + tube_radius * cos_v) * sin_u,
                );
                let normal = Vec3::new(cos_v * cos_u, sin_v, cos_v * sin_u);
                mesh.push(position, normal);
            }
        }

        for i in 0..major {
            for j in 0..minor {
                let a = (i * (minor + 1) + j) as u32;
                let b = a + (minor + 1) as u32;
                let c = a + 1;
                let d = b + 1;
                mesh.triangle(a, b, c);
                mesh.triangle(c, b, d);
            }
        }
        mesh
    }

    fn plane(&self, half_extents: Vec2) -> Mesh {
        let mut mesh = Mesh::default();
        let (hx, hz) = (half_extents.x, half_extents.y);
        let corners = [
            Vec3::new(-hx, 0.0, -hz),
            Vec3::new(hx, 0.0, -hz),
            Vec3::new(hx, 0.0, hz),
            Vec3::new(-hx, 0.0, hz),
        ];

        let front: Vec<u32> = corners.iter().map(|&p| mesh.push(p, Vec3::Y)).collect();
        mesh.quad(front[0], front[3], front[2], front[1]);

        let back: Vec<u32> = corners.iter().map(|&p| mesh.push(p, Vec3::NEG_Y)).collect();
        mesh.quad(back[0], back[1], back[2], back[3]);
        mesh
    }
}

/// Collision volume description for a picker, in the picker's local frame.
///
/// The picking service turns these into colliders, scaled by the gizmo's
/// screen scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickerShape {
    /// Y-aligned cylinder centered on the origin.
    Cylinder { radius: f32, height: f32 },
    Cuboid { half_extents: Vec3 },
    /// Ring of capsules around the Y axis, approximating a torus.
    Ring {
        radius: f32,
        tube_radius: f32,
        segments: usize,
    },
}
