//! Blur pass: 4×4 box filter over the raw occlusion.

use ssao_core::targets::{BindingSlot, UNIFORM_BINDING};

use crate::buffer::{create_uniform_buffer, texture_entry, uniform_entry, update_uniform};
use crate::fullscreen::{fullscreen_pipeline, run_fullscreen};
use crate::shader::{self, FULLSCREEN_WGSL};
use crate::targets::{SingleChannelTarget, OCCLUSION_FORMAT};

/// GPU representation of the blur toggle.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct BlurUniforms {
    pub enabled: u32,
    pub _padding: [u32; 3],
}

impl BlurUniforms {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: u32::from(enabled),
            _padding: [0; 3],
        }
    }
}

/// Blur pass resources.
pub struct BlurPass {
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
}

impl BlurPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blur Bind Group Layout"),
            entries: &[
                texture_entry(BindingSlot::Occlusion.index()),
                uniform_entry(UNIFORM_BINDING, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let program = shader::compile(device, "Blur Shader", FULLSCREEN_WGSL, include_str!("shaders/blur.wgsl"));
        let pipeline = program
            .as_ref()
            .and_then(|program| fullscreen_pipeline(device, "Blur", program, &bind_group_layout, OCCLUSION_FORMAT));

        let uniform_buffer = create_uniform_buffer(device, &BlurUniforms::new(true), Some("Blur Uniforms"));

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, enabled: bool) {
        update_uniform(queue, &self.uniform_buffer, &BlurUniforms::new(enabled));
    }

    /// Binds the raw occlusion target as input.
    #[must_use]
    pub fn create_bind_group(&self, device: &wgpu::Device, input: &SingleChannelTarget) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blur Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: BindingSlot::Occlusion.index(),
                    resource: wgpu::BindingResource::TextureView(input.view()),
                },
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Writes the filtered occlusion into `output`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView, bind_group: &wgpu::BindGroup) {
        run_fullscreen(
            encoder,
            "Blur Pass",
            output,
            wgpu::Color::WHITE,
            self.pipeline.as_ref(),
            bind_group,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_uniforms_size() {
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 16);
        assert_eq!(BlurUniforms::new(false).enabled, 0);
        assert_eq!(BlurUniforms::new(true).enabled, 1);
    }
}
