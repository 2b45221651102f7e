//! CPU implementations of the four render passes.
//!
//! Each function computes exactly what the matching WGSL shader computes for
//! one pixel, so frames can be checked without a GPU.

pub mod blur;
pub mod geometry;
pub mod lighting;
pub mod ssao;

use glam::Vec3;

pub use blur::{blur_at, blur_pass, BLUR_OFFSETS};
pub use geometry::{geometry_pass, normal_matrix, DrawCall, GBufferImage};
pub use lighting::{compose, lighting_pass, shade, LightingParams, ShadingTerms};
pub use ssao::{noise_scale, occlusion_at, ssao_pass, tangent_basis, SsaoParams};

/// Hermite interpolation, as WGSL `smoothstep`.
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Reflects `incident` about `normal`, as WGSL `reflect`.
#[must_use]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}
