//! Scene assembly: the enclosing box plus one model.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec2, Vec3};
use ssao_core::passes::DrawCall;
use ssao_core::{MeshData, SceneConfig, Vertex};
use ssao_render::RenderEngine;

use crate::error::{Result, ViewerError};

/// Where the model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneSource {
    /// A Wavefront OBJ file, scaled and offset by the scene config.
    Obj(PathBuf),
    /// Built-in boxes and a sphere resting on the floor.
    Demo,
}

/// One mesh with its placement.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub label: String,
    pub mesh: MeshData,
    pub model: Mat4,
    pub invert_normals: bool,
    pub albedo: f32,
}

/// Everything the geometry pass draws.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<SceneMesh>,
}

impl Scene {
    /// Builds the scene for `source`.
    pub fn load(source: &SceneSource, config: &SceneConfig) -> Result<Self> {
        let mut meshes = Vec::new();
        if config.show_box {
            meshes.push(SceneMesh {
                label: "box".to_string(),
                mesh: MeshData::cube(config.box_center, config.box_half_extents),
                model: Mat4::IDENTITY,
                // Seen from inside.
                invert_normals: true,
                albedo: config.albedo,
            });
        }

        let model = match source {
            SceneSource::Obj(path) => SceneMesh {
                label: path.display().to_string(),
                mesh: load_obj(path)?,
                model: config.mesh_transform(),
                invert_normals: false,
                albedo: config.albedo,
            },
            SceneSource::Demo => SceneMesh {
                label: "demo".to_string(),
                mesh: demo_mesh(config),
                model: Mat4::IDENTITY,
                invert_normals: false,
                albedo: config.albedo,
            },
        };
        log::info!(
            "scene model '{}' has {} triangles",
            model.label,
            model.mesh.triangle_count()
        );
        meshes.push(model);

        Ok(Self { meshes })
    }

    /// Uploads every mesh to the engine.
    pub fn add_to(&self, engine: &mut RenderEngine) {
        for mesh in &self.meshes {
            engine.add_mesh(&mesh.label, &mesh.mesh, mesh.model, mesh.invert_normals, mesh.albedo);
        }
    }

    /// Draw calls for the CPU pipeline.
    #[must_use]
    pub fn draw_calls(&self) -> Vec<DrawCall<'_>> {
        self.meshes
            .iter()
            .map(|mesh| DrawCall {
                mesh: &mesh.mesh,
                model: mesh.model,
                invert_normals: mesh.invert_normals,
                albedo: mesh.albedo,
            })
            .collect()
    }
}

/// Loads every model in an OBJ file into one mesh.
///
/// Missing normals are replaced by area-weighted vertex normals; missing
/// texture coordinates are zero.
pub fn load_obj(path: &Path) -> Result<MeshData> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| ViewerError::ObjLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let mut combined = MeshData::default();
    for model in models {
        let mesh = model.mesh;
        let vertex_count = mesh.positions.len() / 3;
        let positions: Vec<Vec3> = mesh.positions.chunks_exact(3).map(Vec3::from_slice).collect();

        let normals: Vec<Vec3> = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.chunks_exact(3).map(Vec3::from_slice).collect()
        } else {
            vertex_normals(&positions, &mesh.indices)
        };
        let tex_coords: Vec<Vec2> = if mesh.texcoords.len() == vertex_count * 2 {
            mesh.texcoords.chunks_exact(2).map(Vec2::from_slice).collect()
        } else {
            vec![Vec2::ZERO; vertex_count]
        };

        let vertices = positions
            .iter()
            .zip(&normals)
            .zip(&tex_coords)
            .map(|((&position, &normal), &uv)| Vertex::new(position, uv, normal))
            .collect();
        let part = MeshData::new(&model.name, vertices, mesh.indices)?;
        combined.append(&part, Mat4::IDENTITY);
    }

    if combined.triangle_count() == 0 {
        return Err(ViewerError::EmptyModel(path.to_path_buf()));
    }
    Ok(combined)
}

/// Area-weighted vertex normals.
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}

/// Boxes and a sphere resting on the floor in front of the camera.
#[must_use]
pub fn demo_mesh(config: &SceneConfig) -> MeshData {
    let floor = config.floor_height();
    let center_z = config.box_center.z;
    let parts = [
        MeshData::cube(Vec3::new(-1.2, floor + 0.5, center_z), Vec3::splat(0.5)),
        MeshData::cube(Vec3::new(0.9, floor + 0.75, center_z + 1.0), Vec3::new(0.5, 0.75, 0.5)),
        MeshData::cube(Vec3::new(-0.2, floor + 0.25, center_z - 1.0), Vec3::new(1.0, 0.25, 0.4)),
        MeshData::uv_sphere(Vec3::new(0.0, floor + 0.6, center_z + 0.2), 0.6, 32, 16),
    ];
    MeshData::merge(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_demo_scene_has_box_and_model() {
        let config = SceneConfig::default();
        let scene = Scene::load(&SceneSource::Demo, &config).unwrap();
        assert_eq!(scene.meshes.len(), 2);
        assert!(scene.meshes[0].invert_normals);
        assert!(!scene.meshes[1].invert_normals);
        assert_eq!(scene.draw_calls().len(), 2);
    }

    #[test]
    fn test_box_can_be_hidden() {
        let config = SceneConfig {
            show_box: false,
            ..SceneConfig::default()
        };
        let scene = Scene::load(&SceneSource::Demo, &config).unwrap();
        assert_eq!(scene.meshes.len(), 1);
    }

    #[test]
    fn test_demo_mesh_sits_inside_box() {
        let config = SceneConfig::default();
        let (lo, hi) = demo_mesh(&config).bounds().unwrap();
        let box_lo = config.box_center - config.box_half_extents;
        let box_hi = config.box_center + config.box_half_extents;
        assert!(lo.cmpge(box_lo).all() && hi.cmple(box_hi).all());
        assert!((lo.y - config.floor_height()).abs() < 1e-4);
    }

    #[test]
    fn test_load_obj_computes_missing_normals() {
        let path = write_temp(
            "ssao_viewer_triangle.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );
        let mesh = load_obj(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        for vertex in &mesh.vertices {
            assert!((vertex.normal() - Vec3::Z).length() < 1e-6);
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_obj_quad_is_triangulated() {
        let path = write_temp(
            "ssao_viewer_quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1\n",
        );
        let mesh = load_obj(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_obj_is_an_error() {
        let err = load_obj(Path::new("/nonexistent/model.obj")).unwrap_err();
        assert!(matches!(err, ViewerError::ObjLoad { .. }));
    }

    #[test]
    fn test_obj_without_faces_is_empty() {
        let path = write_temp("ssao_viewer_points.obj", "v 0 0 0\nv 1 0 0\n");
        let err = load_obj(&path).unwrap_err();
        assert!(matches!(err, ViewerError::EmptyModel(_)));
        let _ = std::fs::remove_file(&path);
    }

    proptest! {
        #[test]
        fn prop_vertex_normals_are_unit_or_zero(
            coords in prop::collection::vec(-10.0f32..10.0, 9..30),
            raw in prop::collection::vec(0u32..12, 3..30),
        ) {
            let positions: Vec<Vec3> = coords.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2])).collect();
            let normals = vertex_normals(&positions, &raw);
            prop_assert_eq!(normals.len(), positions.len());
            for n in normals {
                let len = n.length();
                prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-3);
            }
        }
    }
}
