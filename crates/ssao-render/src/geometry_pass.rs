//! Geometry pass: fills the G-buffer from the scene renderables.

use glam::Mat4;
use ssao_core::passes::normal_matrix;
use ssao_core::targets::UNIFORM_BINDING;

use crate::buffer::{create_uniform_buffer, uniform_entry, update_uniform};
use crate::scene::{SceneRenderable, VertexAttributes, VERTEX_STRIDE};
use crate::shader::{self, ShaderProgram};
use crate::targets::GBuffer;

/// Per-object uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct ObjectUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub albedo: [f32; 4],
    pub invert_normals: u32,
    pub _padding: [u32; 3],
}

impl ObjectUniforms {
    /// Builds the uniforms for one object this frame.
    #[must_use]
    pub fn new(model: Mat4, view: Mat4, projection: Mat4, albedo: f32, invert_normals: bool) -> Self {
        let model_view = view * model;
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal_matrix(model_view)).to_cols_array_2d(),
            albedo: [albedo, albedo, albedo, 1.0],
            invert_normals: u32::from(invert_normals),
            _padding: [0; 3],
        }
    }
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, 0.95, false)
    }
}

/// A renderable plus its placement and uniform block.
pub struct SceneObject {
    pub renderable: Box<dyn SceneRenderable>,
    pub model: Mat4,
    pub invert_normals: bool,
    pub albedo: f32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SceneObject {
    /// Writes this frame's uniforms.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, view: Mat4, projection: Mat4) {
        let uniforms = ObjectUniforms::new(self.model, view, projection, self.albedo, self.invert_normals);
        update_uniform(queue, &self.uniform_buffer, &uniforms);
    }
}

/// A color attachment cleared to zero, so uncovered texels have `w == 0`.
fn cleared(view: &wgpu::TextureView) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}

/// Geometry pass resources.
pub struct GeometryPass {
    program: Option<ShaderProgram>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GeometryPass {
    /// Creates the pass for G-buffer targets with the given color formats.
    #[must_use]
    pub fn new(device: &wgpu::Device, color_formats: [wgpu::TextureFormat; 3]) -> Self {
        let source = include_str!("shaders/geometry.wgsl");
        let program = shader::compile(device, "Geometry Shader", source, source);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Geometry Bind Group Layout"),
            entries: &[uniform_entry(
                UNIFORM_BINDING,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let pipeline = program.as_ref().and_then(|program| {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Geometry Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
            let attributes = VertexAttributes::STANDARD.attributes();
            let targets = color_formats.map(|format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            });

            let created = shader::validated(device, || {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Geometry Pipeline"),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: program.module(),
                        entry_point: Some(program.vertex_entry()),
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: VERTEX_STRIDE,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &attributes,
                        }],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: program.module(),
                        entry_point: Some(program.fragment_entry()),
                        targets: &targets,
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: wgpu::TextureFormat::Depth32Float,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            });
            created
                .map_err(|message| log::error!("geometry pipeline creation failed: {message}"))
                .ok()
        });

        Self {
            program,
            pipeline,
            bind_group_layout,
        }
    }

    /// Returns whether the pass can draw.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Wraps a renderable into a scene object with its own uniform block.
    pub fn create_object(
        &self,
        device: &wgpu::Device,
        mut renderable: Box<dyn SceneRenderable>,
        model: Mat4,
        invert_normals: bool,
        albedo: f32,
    ) -> SceneObject {
        if let Some(program) = &self.program {
            renderable.bind_shader_attributes(program, &VertexAttributes::STANDARD);
        }
        let uniform_buffer = create_uniform_buffer(device, &ObjectUniforms::default(), Some("Object Uniforms"));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: UNIFORM_BINDING,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        SceneObject {
            renderable,
            model,
            invert_normals,
            albedo,
            uniform_buffer,
            bind_group,
        }
    }

    /// Clears the G-buffer and draws every object into it.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, gbuffer: &GBuffer, objects: &[SceneObject]) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &[
                cleared(&gbuffer.position.view),
                cleared(&gbuffer.normal.view),
                cleared(&gbuffer.albedo.view),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        let Some(pipeline) = &self.pipeline else {
            return;
        };
        render_pass.set_pipeline(pipeline);
        for object in objects {
            render_pass.set_bind_group(0, &object.bind_group, &[]);
            object.renderable.render(&mut render_pass);
        }
    }
}
