//! CPU-side mesh data with the skinned vertex layout the geometry pass consumes.

use glam::{Mat4, Vec2, Vec3};

use crate::error::{Result, SsaoError};

/// One vertex. Bone data is carried through the layout but not evaluated.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    pub normal: [f32; 3],
    pub bone_index: [i32; 4],
    pub bone_weight: [f32; 4],
}

impl Vertex {
    /// A static vertex: no bone influence.
    #[must_use]
    pub fn new(position: Vec3, tex_coord: Vec2, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            tex_coord: tex_coord.to_array(),
            normal: normal.to_array(),
            bone_index: [0; 4],
            bone_weight: [0.0; 4],
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[must_use]
    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// An indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates a mesh, checking that the indices form whole triangles in range.
    pub fn new(name: &str, vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self { vertices, indices };
        mesh.validate(name)?;
        Ok(mesh)
    }

    /// Checks index count and range.
    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: String| SsaoError::InvalidMesh {
            name: name.to_string(),
            reason,
        };
        if self.indices.len() % 3 != 0 {
            return Err(invalid(format!("{} indices is not a multiple of 3", self.indices.len())));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(invalid(format!(
                "index {bad} out of range for {} vertices",
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> {
        self.indices.chunks_exact(3).map(|tri| {
            [
                &self.vertices[tri[0] as usize],
                &self.vertices[tri[1] as usize],
                &self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Axis-aligned box with outward normals and counter-clockwise faces.
    #[must_use]
    pub fn cube(center: Vec3, half_extents: Vec3) -> Self {
        // (normal, u axis, v axis) per face, with u × v = normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            let face_center = center + normal * half_extents;
            let (du, dv) = (u * half_extents, v * half_extents);
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (su, sv) in corners {
                let position = face_center + du * su + dv * sv;
                let uv = Vec2::new(su * 0.5 + 0.5, sv * 0.5 + 0.5);
                mesh.vertices.push(Vertex::new(position, uv, normal));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// A square in the XY plane facing +Z.
    #[must_use]
    pub fn quad(center: Vec3, half_size: f32) -> Self {
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let vertices = corners
            .iter()
            .map(|&(x, y)| {
                Vertex::new(
                    center + Vec3::new(x, y, 0.0) * half_size,
                    Vec2::new(x * 0.5 + 0.5, y * 0.5 + 0.5),
                    Vec3::Z,
                )
            })
            .collect();
        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// A latitude/longitude sphere.
    #[must_use]
    pub fn uv_sphere(center: Vec3, radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut mesh = Self::default();
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * std::f32::consts::PI;
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let phi = u * std::f32::consts::TAU;
                let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                mesh.vertices
                    .push(Vertex::new(center + normal * radius, Vec2::new(u, v), normal));
            }
        }
        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        mesh
    }

    /// Appends another mesh, transforming it by `transform`.
    pub fn append(&mut self, other: &MeshData, transform: Mat4) {
        let base = self.vertices.len() as u32;
        let normal_matrix = glam::Mat3::from_mat4(transform).inverse().transpose();
        self.vertices.extend(other.vertices.iter().map(|v| {
            let mut out = *v;
            out.position = transform.transform_point3(v.position()).to_array();
            out.normal = (normal_matrix * v.normal()).normalize_or_zero().to_array();
            out
        }));
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Combines several meshes into one.
    #[must_use]
    pub fn merge(parts: &[MeshData]) -> Self {
        let mut mesh = Self::default();
        for part in parts {
            mesh.append(part, Mat4::IDENTITY);
        }
        mesh
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position();
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.min(v.position()), hi.max(v.position()))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 64);
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let cube = MeshData::cube(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        cube.validate("cube").unwrap();
        for [a, b, c] in cube.triangles() {
            let face_normal = (b.position() - a.position()).cross(c.position() - a.position());
            assert!(face_normal.normalize().dot(a.normal()) > 0.99);
        }
    }

    #[test]
    fn test_cube_bounds() {
        let cube = MeshData::cube(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 2.0));
        let (lo, hi) = cube.bounds().unwrap();
        assert!((lo - Vec3::new(0.5, 1.0, 1.0)).length() < 1e-6);
        assert!((hi - Vec3::new(1.5, 3.0, 5.0)).length() < 1e-6);
    }

    #[test]
    fn test_quad_faces_positive_z() {
        let quad = MeshData::quad(Vec3::ZERO, 1.0);
        for [a, b, c] in quad.triangles() {
            let n = (b.position() - a.position()).cross(c.position() - a.position());
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_sphere_is_valid() {
        let sphere = MeshData::uv_sphere(Vec3::ZERO, 2.0, 12, 8);
        sphere.validate("sphere").unwrap();
        for v in &sphere.vertices {
            assert!((v.position().length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_invalid_indices_rejected() {
        let quad = MeshData::quad(Vec3::ZERO, 1.0);
        assert!(MeshData::new("bad", quad.vertices.clone(), vec![0, 1]).is_err());
        assert!(MeshData::new("bad", quad.vertices, vec![0, 1, 9]).is_err());
    }

    #[test]
    fn test_append_offsets_indices_and_transforms() {
        let mut mesh = MeshData::quad(Vec3::ZERO, 1.0);
        let quad = MeshData::quad(Vec3::ZERO, 1.0);
        mesh.append(&quad, Mat4::from_translation(Vec3::X * 5.0));
        assert_eq!(mesh.indices[6..], [4, 5, 6, 4, 6, 7]);
        assert!((mesh.vertices[4].position() - Vec3::new(4.0, -1.0, 0.0)).length() < 1e-6);
        assert_eq!(MeshData::merge(&[quad.clone(), quad]).triangle_count(), 4);
    }
}
