//! The single point light.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

/// A point light with per-term intensity multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    /// Position in world space.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Linear attenuation coefficient.
    pub linear: f32,
    /// Quadratic attenuation coefficient.
    pub quadratic: f32,
    /// Multiplier for the occlusion-weighted ambient term.
    pub ambient_strength: f32,
    /// Multiplier for the diffuse term.
    pub diffuse_strength: f32,
    /// Multiplier for the specular term.
    pub specular_strength: f32,
    /// When set, the light is moved to the camera position every frame.
    pub follows_camera: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            color: Vec3::ONE,
            linear: 0.09,
            quadratic: 0.032,
            ambient_strength: 0.3,
            diffuse_strength: 1.0,
            specular_strength: 0.5,
            follows_camera: false,
        }
    }
}

impl PointLight {
    /// Distance falloff `1 / (1 + linear·d + quadratic·d²)`.
    #[must_use]
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (1.0 + self.linear * distance + self.quadratic * distance * distance)
    }

    /// Returns the light after applying this frame's follow toggle.
    #[must_use]
    pub fn tracked(mut self, camera: &CameraState, toggle_follow: bool) -> Self {
        if toggle_follow {
            self.follows_camera = !self.follows_camera;
        }
        if self.follows_camera {
            self.position = camera.position;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_is_one_at_source() {
        let light = PointLight::default();
        assert_eq!(light.attenuation(0.0), 1.0);
        assert!(light.attenuation(10.0) < light.attenuation(1.0));
    }

    #[test]
    fn test_follow_toggle_moves_light_to_camera() {
        let mut camera = CameraState::default();
        camera.position = Vec3::new(1.0, 2.0, 3.0);

        let light = PointLight::default().tracked(&camera, false);
        assert_eq!(light.position, Vec3::new(0.0, 0.0, 3.0));

        let light = light.tracked(&camera, true);
        assert!(light.follows_camera);
        assert_eq!(light.position, camera.position);

        // Toggling off leaves the light where it was last placed.
        camera.position = Vec3::ZERO;
        let light = light.tracked(&camera, true);
        assert!(!light.follows_camera);
        assert_eq!(light.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
