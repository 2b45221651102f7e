//! SSAO estimation: hemisphere sampling against the position buffer.

use glam::{Mat3, Mat4, Vec2, Vec3};

use super::geometry::GBufferImage;
use super::smoothstep;
use crate::image::{pixel_center_uv, Image};
use crate::kernel::{NoiseTile, SsaoKernel, KERNEL_SIZE, NOISE_DIM};
use crate::options::RenderSettings;

/// Parameters read by the SSAO pass each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsaoParams {
    pub radius: f32,
    pub bias: f32,
    pub enabled: bool,
}

impl From<&RenderSettings> for SsaoParams {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            radius: settings.radius,
            bias: settings.bias,
            enabled: settings.ssao_enabled,
        }
    }
}

/// Scale that tiles the 4×4 noise texture once per 4×4 pixel block.
#[must_use]
pub fn noise_scale(width: u32, height: u32) -> Vec2 {
    Vec2::new(width as f32, height as f32) / NOISE_DIM as f32
}

/// Occlusion factor at `uv`, in `[0, 1]` with 1 meaning unoccluded.
#[must_use]
pub fn occlusion_at(
    gbuffer: &GBufferImage,
    uv: Vec2,
    kernel: &SsaoKernel,
    noise: &NoiseTile,
    projection: Mat4,
    params: &SsaoParams,
) -> f32 {
    if !params.enabled {
        return 1.0;
    }
    let texel = gbuffer.position.sample_nearest_clamp(uv);
    if texel.w == 0.0 {
        return 1.0;
    }
    let frag_pos = texel.truncate();
    let normal = gbuffer.normal.sample_nearest_clamp(uv).truncate().normalize();
    let random = noise.sample_repeat(uv * noise_scale(gbuffer.width(), gbuffer.height()));

    let tbn = tangent_basis(normal, random);

    let mut occlusion = 0.0;
    for sample in kernel.samples() {
        let sample_pos = frag_pos + tbn * *sample * params.radius;

        let offset = projection * sample_pos.extend(1.0);
        let ndc = offset.truncate() / offset.w;
        let sample_uv = Vec2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);

        let scene = gbuffer.position.sample_nearest_clamp(sample_uv);
        if scene.w == 0.0 {
            continue;
        }
        let range_check = smoothstep(0.0, 1.0, params.radius / (frag_pos.z - scene.z).abs());
        if scene.z >= sample_pos.z + params.bias {
            occlusion += range_check;
        }
    }
    1.0 - occlusion / KERNEL_SIZE as f32
}

/// Runs the SSAO pass over the whole G-buffer.
#[must_use]
pub fn ssao_pass(
    gbuffer: &GBufferImage,
    kernel: &SsaoKernel,
    noise: &NoiseTile,
    projection: Mat4,
    params: &SsaoParams,
) -> Image<f32> {
    let (width, height) = (gbuffer.width(), gbuffer.height());
    Image::from_fn(width, height, |x, y| {
        occlusion_at(gbuffer, pixel_center_uv(x, y, width, height), kernel, noise, projection, params)
    })
}

/// Gram-Schmidt basis with the normal as its z axis, rotated by `random`.
#[must_use]
pub fn tangent_basis(normal: Vec3, random: Vec3) -> Mat3 {
    let tangent = (random - normal * random.dot(normal)).normalize();
    Mat3::from_cols(tangent, normal.cross(tangent), normal)
}
