//! Geometry pass: rasterizes meshes into a view-space G-buffer.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::camera::FrameTransforms;
use crate::image::Image;
use crate::mesh::MeshData;

/// CPU G-buffer. Position `w` is 1 where geometry was written and 0 elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct GBufferImage {
    pub position: Image<Vec4>,
    pub normal: Image<Vec4>,
    pub albedo: Image<Vec4>,
    pub depth: Image<f32>,
}

impl GBufferImage {
    /// A cleared buffer: zero color, depth 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Image::new(width, height, Vec4::ZERO),
            normal: Image::new(width, height, Vec4::ZERO),
            albedo: Image::new(width, height, Vec4::ZERO),
            depth: Image::new(width, height, 1.0),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.position.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.position.height()
    }

    /// Returns whether geometry covers pixel `(x, y)`.
    #[must_use]
    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        self.position.get(x, y).w > 0.0
    }

    fn clear(&mut self) {
        *self = Self::new(self.width(), self.height());
    }
}

/// One mesh draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub mesh: &'a MeshData,
    pub model: Mat4,
    /// Negate normals, used for the enclosing box seen from inside.
    pub invert_normals: bool,
    /// Grey level written to the albedo buffer.
    pub albedo: f32,
}

/// Inverse-transpose of the upper 3×3 of a model-view matrix.
#[must_use]
pub fn normal_matrix(model_view: Mat4) -> Mat3 {
    Mat3::from_mat4(model_view).inverse().transpose()
}

#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    clip: Vec4,
    view: Vec3,
    normal: Vec3,
}

impl ClipVertex {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            view: self.view.lerp(other.view, t),
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

/// Clips a triangle against the near plane (`clip.z >= 0`).
fn clip_near(triangle: [ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let current = triangle[i];
        let next = triangle[(i + 1) % 3];
        let (dc, dn) = (current.clip.z, next.clip.z);
        if dc >= 0.0 {
            out.push(current);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            out.push(current.lerp(next, dc / (dc - dn)));
        }
    }
    out
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Overwrites `gbuffer` with the given draws.
///
/// No face culling; depth test is strict less-than against a buffer cleared
/// to 1.
pub fn geometry_pass(gbuffer: &mut GBufferImage, draws: &[DrawCall<'_>], transforms: &FrameTransforms) {
    gbuffer.clear();
    for draw in draws {
        let model_view = transforms.view * draw.model;
        let normals = normal_matrix(model_view);
        let sign = if draw.invert_normals { -1.0 } else { 1.0 };
        let albedo = Vec4::new(draw.albedo, draw.albedo, draw.albedo, 1.0);

        for vertices in draw.mesh.triangles() {
            let triangle = vertices.map(|v| {
                let view = model_view.transform_point3(v.position());
                ClipVertex {
                    clip: transforms.projection * view.extend(1.0),
                    view,
                    normal: normals * v.normal() * sign,
                }
            });
            let polygon = clip_near(triangle);
            for i in 1..polygon.len().saturating_sub(1) {
                rasterize(gbuffer, [polygon[0], polygon[i], polygon[i + 1]], albedo);
            }
        }
    }
}

fn rasterize(gbuffer: &mut GBufferImage, triangle: [ClipVertex; 3], albedo: Vec4) {
    let (width, height) = (gbuffer.width() as f32, gbuffer.height() as f32);
    let screen = triangle.map(|v| {
        let ndc = v.clip.truncate() / v.clip.w;
        Vec3::new((ndc.x * 0.5 + 0.5) * width, (0.5 - ndc.y * 0.5) * height, ndc.z)
    });
    let (a, b, c) = (screen[0].truncate(), screen[1].truncate(), screen[2].truncate());
    let area = edge(a, b, c);
    if area.abs() < f32::EPSILON {
        return;
    }

    let lo = a.min(b).min(c).floor().max(Vec2::ZERO);
    let hi = a.max(b).max(c).ceil().min(Vec2::new(width, height));
    let inv_w = triangle.map(|v| 1.0 / v.clip.w);

    for y in lo.y as u32..hi.y as u32 {
        for x in lo.x as u32..hi.x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let bary = Vec3::new(edge(b, c, p), edge(c, a, p), edge(a, b, p)) / area;
            // Small tolerance so pixel centers on shared edges are never dropped.
            if bary.min_element() < -1e-5 {
                continue;
            }
            let depth = bary.x * screen[0].z + bary.y * screen[1].z + bary.z * screen[2].z;
            if !(0.0..=1.0).contains(&depth) || depth >= gbuffer.depth.get(x, y) {
                continue;
            }

            let weights = bary * Vec3::from_array(inv_w);
            let weights = weights / weights.element_sum();
            let view = triangle[0].view * weights.x + triangle[1].view * weights.y + triangle[2].view * weights.z;
            let normal = triangle[0].normal * weights.x
                + triangle[1].normal * weights.y
                + triangle[2].normal * weights.z;

            gbuffer.depth.set(x, y, depth);
            gbuffer.position.set(x, y, view.extend(1.0));
            gbuffer.normal.set(x, y, normal.normalize_or_zero().extend(0.0));
            gbuffer.albedo.set(x, y, albedo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;

    fn facing_quad(distance: f32) -> (MeshData, Mat4) {
        // The default camera sits at z = -1 looking down +Z.
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, distance - 1.0))
            * Mat4::from_rotation_y(std::f32::consts::PI);
        (MeshData::quad(Vec3::ZERO, 4.0), model)
    }

    #[test]
    fn test_normal_matrix_handles_nonuniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = (normal_matrix(m) * Vec3::new(1.0, 1.0, 0.0)).normalize();
        // The surface tangent (2, -1) stays perpendicular to the transformed normal.
        assert!(n.dot(Vec3::new(2.0, -1.0, 0.0).normalize()).abs() < 1e-5);
    }

    #[test]
    fn test_quad_fills_gbuffer_in_view_space() {
        let camera = CameraState::default();
        let transforms = camera.transforms(1.0);
        let (mesh, model) = facing_quad(5.0);
        let mut gbuffer = GBufferImage::new(32, 32);
        let draw = DrawCall { mesh: &mesh, model, invert_normals: false, albedo: 0.95 };
        geometry_pass(&mut gbuffer, &[draw], &transforms);

        assert!(gbuffer.is_covered(16, 16));
        let p = gbuffer.position.get(16, 16);
        assert!((p.z + 5.0).abs() < 1e-3);
        let n = gbuffer.normal.get(16, 16).truncate();
        assert!((n - Vec3::Z).length() < 1e-4);
        assert_eq!(gbuffer.albedo.get(16, 16), Vec4::new(0.95, 0.95, 0.95, 1.0));
    }

    #[test]
    fn test_invert_normals_negates() {
        let camera = CameraState::default();
        let transforms = camera.transforms(1.0);
        let (mesh, model) = facing_quad(5.0);
        let mut gbuffer = GBufferImage::new(8, 8);
        let draw = DrawCall { mesh: &mesh, model, invert_normals: true, albedo: 0.5 };
        geometry_pass(&mut gbuffer, &[draw], &transforms);
        let n = gbuffer.normal.get(4, 4).truncate();
        assert!((n + Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let camera = CameraState::default();
        let transforms = camera.transforms(1.0);
        let (far_mesh, far_model) = facing_quad(8.0);
        let (near_mesh, near_model) = facing_quad(3.0);
        let mut gbuffer = GBufferImage::new(8, 8);
        // Near first, then far: the far quad must lose the depth test.
        let draws = [
            DrawCall { mesh: &near_mesh, model: near_model, invert_normals: false, albedo: 0.2 },
            DrawCall { mesh: &far_mesh, model: far_model, invert_normals: false, albedo: 0.9 },
        ];
        geometry_pass(&mut gbuffer, &draws, &transforms);
        assert!((gbuffer.position.get(4, 4).z + 3.0).abs() < 1e-3);
        assert_eq!(gbuffer.albedo.get(4, 4).x, 0.2);
    }

    #[test]
    fn test_geometry_behind_camera_is_clipped() {
        let camera = CameraState::default();
        let transforms = camera.transforms(1.0);
        let (mesh, model) = facing_quad(-3.0);
        let mut gbuffer = GBufferImage::new(8, 8);
        let draw = DrawCall { mesh: &mesh, model, invert_normals: false, albedo: 1.0 };
        geometry_pass(&mut gbuffer, &[draw], &transforms);
        assert!(gbuffer.position.data().iter().all(|p| p.w == 0.0));
    }

    #[test]
    fn test_enclosing_box_covers_every_pixel() {
        let camera = CameraState::default();
        let transforms = camera.transforms(4.0 / 3.0);
        let cube = MeshData::cube(Vec3::new(0.0, 1.5, 2.0), Vec3::new(3.0, 2.5, 4.0));
        let mut gbuffer = GBufferImage::new(40, 30);
        let draw = DrawCall { mesh: &cube, model: Mat4::IDENTITY, invert_normals: true, albedo: 0.95 };
        geometry_pass(&mut gbuffer, &[draw], &transforms);
        for y in 0..30 {
            for x in 0..40 {
                assert!(gbuffer.is_covered(x, y), "pixel ({x}, {y}) not covered");
            }
        }
        // The far wall faces the camera once its outward normal is inverted.
        let n = gbuffer.normal.get(20, 15).truncate();
        assert!(n.z > 0.9);
    }
}
