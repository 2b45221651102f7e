//! Shared plumbing for the full-screen passes.

use crate::shader::{self, ShaderProgram};

/// Creates a full-screen triangle pipeline writing one color target.
///
/// Returns `None` after logging if wgpu rejects the pipeline.
pub(crate) fn fullscreen_pipeline(
    device: &wgpu::Device,
    name: &str,
    program: &ShaderProgram,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> Option<wgpu::RenderPipeline> {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{name} Pipeline Layout")),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });
    let label = format!("{name} Pipeline");

    let created = shader::validated(device, || {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: Some(program.vertex_entry()),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: program.module(),
                entry_point: Some(program.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    });

    match created {
        Ok(pipeline) => Some(pipeline),
        Err(message) => {
            log::error!("{label} creation failed: {message}");
            None
        }
    }
}

/// Clears `output` to `clear` and draws the full-screen triangle if `pipeline` exists.
///
/// A missing pipeline leaves the cleared target as the pass result.
pub(crate) fn run_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    output: &wgpu::TextureView,
    clear: wgpu::Color,
    pipeline: Option<&wgpu::RenderPipeline>,
    bind_group: &wgpu::BindGroup,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: output,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        ..Default::default()
    });

    if let Some(pipeline) = pipeline {
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
