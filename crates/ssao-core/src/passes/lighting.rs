//! Lighting composition: one point light plus occlusion-weighted ambient.

use glam::{Mat4, Vec3};

use super::geometry::GBufferImage;
use super::reflect;
use crate::image::{pixel_center_uv, Image};
use crate::light::PointLight;
use crate::options::RenderSettings;

/// Light and toggle state for one frame, with the light already in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub linear: f32,
    pub quadratic: f32,
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
    pub lighting_enabled: bool,
}

impl LightingParams {
    /// Moves the light into view space and gathers this frame's settings.
    #[must_use]
    pub fn from_light(light: &PointLight, view: Mat4, settings: &RenderSettings) -> Self {
        Self {
            light_position: view.transform_point3(light.position),
            light_color: light.color,
            linear: light.linear,
            quadratic: light.quadratic,
            ambient_strength: light.ambient_strength,
            diffuse_strength: light.diffuse_strength,
            specular_strength: light.specular_strength,
            shininess: settings.shininess,
            lighting_enabled: settings.lighting_enabled,
        }
    }
}

/// Per-fragment lighting terms before strength scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingTerms {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Distance falloff. Computed but not applied to the output.
    pub attenuation: f32,
}

/// Evaluates the lighting terms for one view-space fragment.
#[must_use]
pub fn shade(frag_pos: Vec3, normal: Vec3, albedo: Vec3, occlusion: f32, params: &LightingParams) -> ShadingTerms {
    let ambient = albedo * occlusion;

    let to_light = params.light_position - frag_pos;
    let light_dir = to_light.normalize();
    let diffuse = normal.dot(light_dir).max(0.0) * albedo * params.light_color;

    let view_dir = (-frag_pos).normalize();
    let reflected = reflect(-light_dir, normal);
    let specular = view_dir.dot(reflected).max(0.0).powf(params.shininess) * params.light_color;

    let distance = to_light.length();
    let attenuation = 1.0 / (1.0 + params.linear * distance + params.quadratic * distance * distance);

    ShadingTerms {
        ambient,
        diffuse,
        specular,
        attenuation,
    }
}

/// Combines the terms into the output color.
#[must_use]
pub fn compose(terms: &ShadingTerms, params: &LightingParams) -> Vec3 {
    if !params.lighting_enabled {
        return terms.ambient;
    }
    terms.ambient * params.ambient_strength
        + terms.diffuse * params.diffuse_strength
        + terms.specular * params.specular_strength
}

/// Runs the lighting pass. Pixels without geometry get `background`.
#[must_use]
pub fn lighting_pass(
    gbuffer: &GBufferImage,
    occlusion: &Image<f32>,
    params: &LightingParams,
    background: Vec3,
) -> Image<Vec3> {
    let (width, height) = (gbuffer.width(), gbuffer.height());
    Image::from_fn(width, height, |x, y| {
        let uv = pixel_center_uv(x, y, width, height);
        let position = gbuffer.position.sample_nearest_clamp(uv);
        if position.w == 0.0 {
            return background;
        }
        let normal = gbuffer.normal.sample_nearest_clamp(uv).truncate().normalize();
        let albedo = gbuffer.albedo.sample_nearest_clamp(uv).truncate();
        let ao = occlusion.sample_nearest_clamp(uv);
        compose(&shade(position.truncate(), normal, albedo, ao, params), params)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LightingParams {
        LightingParams::from_light(&PointLight::default(), Mat4::IDENTITY, &RenderSettings::default())
    }

    #[test]
    fn test_disabled_outputs_occlusion_times_albedo() {
        let mut params = params();
        params.lighting_enabled = false;
        let albedo = Vec3::splat(0.95);
        let terms = shade(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, albedo, 0.4, &params);
        assert_eq!(compose(&terms, &params), albedo * 0.4);
    }

    #[test]
    fn test_head_on_light_gives_full_diffuse() {
        let mut params = params();
        params.light_position = Vec3::ZERO;
        let terms = shade(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, Vec3::ONE, 1.0, &params);
        assert!((terms.diffuse - Vec3::ONE).length() < 1e-6);
        // Light, eye and reflection are aligned.
        assert!((terms.specular - Vec3::ONE).length() < 1e-5);
        let expected_atten = 1.0 / (1.0 + 0.09 * 2.0 + 0.032 * 4.0);
        assert!((terms.attenuation - expected_atten).abs() < 1e-6);
    }

    #[test]
    fn test_attenuation_is_not_applied() {
        let mut near = params();
        near.light_position = Vec3::new(0.0, 1.0, 0.0);
        let mut steep = near;
        steep.linear = 10.0;
        steep.quadratic = 10.0;
        let frag = Vec3::new(0.0, 0.0, -2.0);
        let a = compose(&shade(frag, Vec3::Z, Vec3::ONE, 0.7, &near), &near);
        let b = compose(&shade(frag, Vec3::Z, Vec3::ONE, 0.7, &steep), &steep);
        assert_eq!(a, b);
    }

    #[test]
    fn test_light_behind_surface_has_no_diffuse() {
        let mut params = params();
        params.light_position = Vec3::new(0.0, 0.0, -10.0);
        let terms = shade(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, Vec3::ONE, 1.0, &params);
        assert_eq!(terms.diffuse, Vec3::ZERO);
        assert_eq!(terms.specular, Vec3::ZERO);
    }

    #[test]
    fn test_light_moves_into_view_space() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 0.0), Vec3::Y);
        let params = LightingParams::from_light(&PointLight::default(), view, &RenderSettings::default());
        assert!((params.light_position - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn test_background_pixels_use_background_color() {
        let gbuffer = GBufferImage::new(3, 3);
        let occlusion = Image::new(3, 3, 1.0);
        let out = lighting_pass(&gbuffer, &occlusion, &params(), Vec3::new(0.1, 0.2, 0.3));
        assert!(out.data().iter().all(|&c| c == Vec3::new(0.1, 0.2, 0.3)));
    }
}
