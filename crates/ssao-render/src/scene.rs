//! Scene renderables consumed by the geometry pass.

use ssao_core::mesh::{MeshData, Vertex};

use crate::buffer::{create_index_buffer, create_vertex_buffer};
use crate::shader::ShaderProgram;

/// Shader locations of the five vertex inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributes {
    pub position: u32,
    pub tex_coord: u32,
    pub normal: u32,
    pub bone_index: u32,
    pub bone_weight: u32,
}

impl VertexAttributes {
    /// Locations used by the geometry shader.
    pub const STANDARD: Self = Self {
        position: 0,
        tex_coord: 1,
        normal: 2,
        bone_index: 3,
        bone_weight: 4,
    };

    /// Vertex attributes for a [`Vertex`] buffer at these locations.
    #[must_use]
    pub fn attributes(&self) -> [wgpu::VertexAttribute; 5] {
        let offset = |bytes: usize| bytes as wgpu::BufferAddress;
        [
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: offset(std::mem::offset_of!(Vertex, position)),
                shader_location: self.position,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: offset(std::mem::offset_of!(Vertex, tex_coord)),
                shader_location: self.tex_coord,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: offset(std::mem::offset_of!(Vertex, normal)),
                shader_location: self.normal,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Sint32x4,
                offset: offset(std::mem::offset_of!(Vertex, bone_index)),
                shader_location: self.bone_index,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: offset(std::mem::offset_of!(Vertex, bone_weight)),
                shader_location: self.bone_weight,
            },
        ]
    }
}

/// Stride of one [`Vertex`].
pub const VERTEX_STRIDE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as wgpu::BufferAddress;

/// Something the geometry pass can draw.
pub trait SceneRenderable {
    /// Associates the renderable's vertex streams with the program's input locations.
    fn bind_shader_attributes(&mut self, program: &ShaderProgram, attributes: &VertexAttributes);

    /// Records draw commands. The pass pipeline and per-object bind group are already set.
    fn render(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// An indexed mesh uploaded once.
pub struct StaticMesh {
    label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    attributes: Option<VertexAttributes>,
}

impl StaticMesh {
    /// Uploads `mesh` to the GPU.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        Self {
            label: label.to_string(),
            vertex_buffer: create_vertex_buffer(device, &mesh.vertices, Some(label)),
            index_buffer: create_index_buffer(device, &mesh.indices, Some(label)),
            index_count: mesh.indices.len() as u32,
            attributes: None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl SceneRenderable for StaticMesh {
    fn bind_shader_attributes(&mut self, program: &ShaderProgram, attributes: &VertexAttributes) {
        if *attributes != VertexAttributes::STANDARD {
            log::warn!(
                "mesh '{}' bound to '{}' with non-standard locations {attributes:?}",
                self.label,
                program.label()
            );
        }
        log::debug!("mesh '{}' bound to '{}'", self.label, program.label());
        self.attributes = Some(*attributes);
    }

    fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.attributes.is_none() || self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_attribute_offsets() {
        let attributes = VertexAttributes::STANDARD.attributes();
        let offsets: Vec<_> = attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20, 32, 48]);
        let locations: Vec<_> = attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2, 3, 4]);
        assert_eq!(VERTEX_STRIDE, 64);
    }
}
