//! Lighting pass: composes the final color from the G-buffer and blurred occlusion.

use glam::{Mat4, Vec3};
use ssao_core::light::PointLight;
use ssao_core::options::RenderSettings;
use ssao_core::passes::LightingParams;
use ssao_core::targets::{BindingSlot, SAMPLER_BINDING, UNIFORM_BINDING};

use crate::buffer::{create_uniform_buffer, nearest_sampler, sampler_entry, texture_entry, uniform_entry, update_uniform};
use crate::fullscreen::{fullscreen_pipeline, run_fullscreen};
use crate::shader::{self, FULLSCREEN_WGSL};
use crate::targets::{GBuffer, SingleChannelTarget};

/// GPU representation of the light and composition toggles.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct LightingUniforms {
    /// View space.
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
    pub background: [f32; 4],
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
    pub lighting_enabled: u32,
    pub _padding: u32,
}

impl LightingUniforms {
    #[must_use]
    pub fn new(params: &LightingParams, background: Vec3) -> Self {
        Self {
            light_position: params.light_position.extend(1.0).to_array(),
            light_color: params.light_color.extend(1.0).to_array(),
            background: background.extend(1.0).to_array(),
            attenuation_linear: params.linear,
            attenuation_quadratic: params.quadratic,
            ambient_strength: params.ambient_strength,
            diffuse_strength: params.diffuse_strength,
            specular_strength: params.specular_strength,
            shininess: params.shininess,
            lighting_enabled: u32::from(params.lighting_enabled),
            _padding: 0,
        }
    }
}

/// Lighting pass resources.
pub struct LightingPass {
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    background: wgpu::Color,
}

impl LightingPass {
    /// Creates the pass writing to targets of `output_format`.
    #[must_use]
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Bind Group Layout"),
            entries: &[
                texture_entry(BindingSlot::Position.index()),
                texture_entry(BindingSlot::Normal.index()),
                texture_entry(BindingSlot::Albedo.index()),
                texture_entry(BindingSlot::Occlusion.index()),
                sampler_entry(SAMPLER_BINDING),
                uniform_entry(UNIFORM_BINDING, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let program = shader::compile(
            device,
            "Lighting Shader",
            FULLSCREEN_WGSL,
            include_str!("shaders/lighting.wgsl"),
        );
        let pipeline = program
            .as_ref()
            .and_then(|program| fullscreen_pipeline(device, "Lighting", program, &bind_group_layout, output_format));

        let params = LightingParams::from_light(&PointLight::default(), Mat4::IDENTITY, &RenderSettings::default());
        let uniforms = LightingUniforms::new(&params, Vec3::ZERO);
        let uniform_buffer = create_uniform_buffer(device, &uniforms, Some("Lighting Uniforms"));

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            sampler: nearest_sampler(device, "Lighting Sampler", wgpu::AddressMode::ClampToEdge),
            background: wgpu::Color::BLACK,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Writes this frame's light and remembers the background for the clear.
    pub fn update_uniforms(&mut self, queue: &wgpu::Queue, params: &LightingParams, background: Vec3) {
        self.background = wgpu::Color {
            r: f64::from(background.x),
            g: f64::from(background.y),
            b: f64::from(background.z),
            a: 1.0,
        };
        update_uniform(queue, &self.uniform_buffer, &LightingUniforms::new(params, background));
    }

    /// Binds the G-buffer and the blurred occlusion.
    #[must_use]
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        gbuffer: &GBuffer,
        occlusion: &SingleChannelTarget,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: BindingSlot::Position.index(),
                    resource: wgpu::BindingResource::TextureView(&gbuffer.position.view),
                },
                wgpu::BindGroupEntry {
                    binding: BindingSlot::Normal.index(),
                    resource: wgpu::BindingResource::TextureView(&gbuffer.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: BindingSlot::Albedo.index(),
                    resource: wgpu::BindingResource::TextureView(&gbuffer.albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: BindingSlot::Occlusion.index(),
                    resource: wgpu::BindingResource::TextureView(occlusion.view()),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Writes the final color into `output`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView, bind_group: &wgpu::BindGroup) {
        run_fullscreen(
            encoder,
            "Lighting Pass",
            output,
            self.background,
            self.pipeline.as_ref(),
            bind_group,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighting_uniforms_size() {
        assert_eq!(std::mem::size_of::<LightingUniforms>(), 80);
    }

    #[test]
    fn test_lighting_uniforms_from_params() {
        let light = PointLight {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..PointLight::default()
        };
        let settings = RenderSettings {
            lighting_enabled: false,
            ..RenderSettings::default()
        };
        let params = LightingParams::from_light(&light, Mat4::IDENTITY, &settings);
        let uniforms = LightingUniforms::new(&params, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(uniforms.light_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniforms.background, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniforms.attenuation_linear, light.linear);
        assert_eq!(uniforms.lighting_enabled, 0);
        assert_eq!(uniforms.shininess, settings.shininess);
    }
}
