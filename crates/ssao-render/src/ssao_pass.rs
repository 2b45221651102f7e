//! SSAO pass: estimates ambient occlusion from the G-buffer.

use glam::{Mat4, Vec2};
use ssao_core::kernel::{NoiseTile, SsaoKernel, KERNEL_SIZE, NOISE_DIM};
use ssao_core::options::RenderSettings;
use ssao_core::passes::{noise_scale, SsaoParams};
use ssao_core::targets::{BindingSlot, NOISE_BINDING, NOISE_SAMPLER_BINDING, SAMPLER_BINDING, UNIFORM_BINDING};

use crate::buffer::{create_uniform_buffer, nearest_sampler, sampler_entry, texture_entry, uniform_entry, update_uniform};
use crate::fullscreen::{fullscreen_pipeline, run_fullscreen};
use crate::shader::{self, FULLSCREEN_WGSL};
use crate::targets::{GBuffer, OCCLUSION_FORMAT};

/// GPU representation of the SSAO parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct SsaoUniforms {
    pub projection: [[f32; 4]; 4],
    pub kernel: [[f32; 4]; KERNEL_SIZE],
    pub noise_scale: [f32; 2],
    pub radius: f32,
    pub bias: f32,
    pub enabled: u32,
    pub _padding: [u32; 3],
}

impl SsaoUniforms {
    #[must_use]
    pub fn new(kernel: &SsaoKernel, projection: Mat4, noise_scale: Vec2, params: &SsaoParams) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            kernel: kernel.as_uniform_array(),
            noise_scale: noise_scale.to_array(),
            radius: params.radius,
            bias: params.bias,
            enabled: u32::from(params.enabled),
            _padding: [0; 3],
        }
    }
}

/// Uploads the noise tile as a 4×4 `Rgba16Float` texture.
fn create_noise_texture(device: &wgpu::Device, queue: &wgpu::Queue, noise: &NoiseTile) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: NOISE_DIM,
        height: NOISE_DIM,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("SSAO Noise Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let texels: Vec<u16> = noise
        .to_rgba()
        .iter()
        .flatten()
        .map(|&v| half::f16::from_f32(v).to_bits())
        .collect();

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(&texels),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            // 4 channels × 2 bytes per texel
            bytes_per_row: Some(NOISE_DIM * 8),
            rows_per_image: Some(NOISE_DIM),
        },
        size,
    );

    texture
}

/// SSAO pass resources.
pub struct SsaoPass {
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    noise_view: wgpu::TextureView,
    gbuffer_sampler: wgpu::Sampler,
    noise_sampler: wgpu::Sampler,
    kernel: SsaoKernel,
}

impl SsaoPass {
    /// Creates the pass and uploads `noise`.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, kernel: SsaoKernel, noise: &NoiseTile) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Bind Group Layout"),
            entries: &[
                texture_entry(BindingSlot::Position.index()),
                texture_entry(BindingSlot::Normal.index()),
                texture_entry(NOISE_BINDING),
                sampler_entry(SAMPLER_BINDING),
                sampler_entry(NOISE_SAMPLER_BINDING),
                uniform_entry(UNIFORM_BINDING, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let program = shader::compile(device, "SSAO Shader", FULLSCREEN_WGSL, include_str!("shaders/ssao.wgsl"));
        let pipeline = program
            .as_ref()
            .and_then(|program| fullscreen_pipeline(device, "SSAO", program, &bind_group_layout, OCCLUSION_FORMAT));

        let noise_texture = create_noise_texture(device, queue, noise);
        let noise_view = noise_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let params = SsaoParams::from(&RenderSettings::default());
        let uniforms = SsaoUniforms::new(&kernel, Mat4::IDENTITY, Vec2::ONE, &params);
        let uniform_buffer = create_uniform_buffer(device, &uniforms, Some("SSAO Uniforms"));

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            noise_view,
            gbuffer_sampler: nearest_sampler(device, "SSAO G-Buffer Sampler", wgpu::AddressMode::ClampToEdge),
            noise_sampler: nearest_sampler(device, "SSAO Noise Sampler", wgpu::AddressMode::Repeat),
            kernel,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Writes this frame's projection, toggles and noise scale.
    pub fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        projection: Mat4,
        params: &SsaoParams,
        width: u32,
        height: u32,
    ) {
        let uniforms = SsaoUniforms::new(&self.kernel, projection, noise_scale(width, height), params);
        update_uniform(queue, &self.uniform_buffer, &uniforms);
    }

    /// Binds the G-buffer position and normal targets.
    #[must_use]
    pub fn create_bind_group(&self, device: &wgpu::Device, gbuffer: &GBuffer) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Bind Group"),
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
                    binding: NOISE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&self.noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.gbuffer_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: NOISE_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.noise_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Renders raw occlusion into `output`. The target is cleared to 1 first.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView, bind_group: &wgpu::BindGroup) {
        run_fullscreen(
            encoder,
            "SSAO Pass",
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
    fn test_ssao_uniforms_size() {
        // 64 (mat4) + 64 × 16 (kernel) + 32 (noise scale, radius, bias, flag, padding)
        assert_eq!(std::mem::size_of::<SsaoUniforms>(), 1120);
        assert_eq!(std::mem::size_of::<SsaoUniforms>() % 16, 0);
    }

    #[test]
    fn test_ssao_uniforms_pack_kernel() {
        let kernel = SsaoKernel::generate(7);
        let params = SsaoParams {
            radius: 0.75,
            bias: 0.01,
            enabled: false,
        };
        let uniforms = SsaoUniforms::new(&kernel, Mat4::IDENTITY, noise_scale(800, 600), &params);
        assert_eq!(uniforms.kernel[10][..3], kernel.samples()[10].to_array());
        assert_eq!(uniforms.noise_scale, [200.0, 150.0]);
        assert_eq!(uniforms.enabled, 0);
        assert_eq!(uniforms.radius, 0.75);
    }
}
