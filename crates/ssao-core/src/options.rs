//! Configuration options for the renderer and viewer.

use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::error::Result;
use crate::kernel::DEFAULT_SEED;
use crate::light::PointLight;

/// Top-level options, loadable from a JSON file.
///
/// Every field has a default, so a file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Initial viewport width in pixels.
    pub width: u32,

    /// Initial viewport height in pixels.
    pub height: u32,

    /// Window title.
    pub title: String,

    /// Color written where no geometry was rasterized.
    pub background_color: Vec3,

    /// Camera defaults.
    pub camera: CameraConfig,

    /// The point light.
    pub light: PointLight,

    /// Parameters read once per frame by the SSAO, blur and lighting passes.
    pub render: RenderSettings,

    /// Static scene transforms.
    pub scene: SceneConfig,

    /// Seed for the sample kernel and noise tile.
    pub seed: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "SSAO".to_string(),
            background_color: Vec3::ZERO,
            camera: CameraConfig::default(),
            light: PointLight::default(),
            render: RenderSettings::default(),
            scene: SceneConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl Options {
    /// Reads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let options = serde_json::from_str(&text)?;
        log::info!("loaded options from {}", path.as_ref().display());
        Ok(options)
    }

    /// Writes options to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// The runtime configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Hemisphere radius in view-space units.
    pub radius: f32,
    /// Depth bias against self-occlusion.
    pub bias: f32,
    /// Specular exponent.
    pub shininess: f32,
    /// When false the SSAO pass writes 1.0 everywhere.
    pub ssao_enabled: bool,
    /// When false the blur pass copies its input.
    pub ssao_blur_enabled: bool,
    /// When false the lighting pass writes only the ambient term.
    pub lighting_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            radius: 0.5,
            bias: 0.025,
            shininess: 32.0,
            ssao_enabled: true,
            ssao_blur_enabled: true,
            lighting_enabled: true,
        }
    }
}

/// One runtime adjustment to [`RenderSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsChange {
    ToggleSsao,
    ToggleBlur,
    ToggleLighting,
    IncreaseRadius,
    DecreaseRadius,
    IncreaseBias,
    DecreaseBias,
    IncreaseShininess,
    DecreaseShininess,
}

/// Step sizes for the increase/decrease changes.
pub const RADIUS_STEP: f32 = 0.05;
pub const BIAS_STEP: f32 = 0.005;
pub const SHININESS_STEP: f32 = 4.0;

const MIN_RADIUS: f32 = RADIUS_STEP;
const MIN_SHININESS: f32 = 1.0;

impl RenderSettings {
    /// Applies one change. Radius and shininess stay positive, bias non-negative.
    pub fn apply(&mut self, change: SettingsChange) {
        match change {
            SettingsChange::ToggleSsao => self.ssao_enabled = !self.ssao_enabled,
            SettingsChange::ToggleBlur => self.ssao_blur_enabled = !self.ssao_blur_enabled,
            SettingsChange::ToggleLighting => self.lighting_enabled = !self.lighting_enabled,
            SettingsChange::IncreaseRadius => self.radius += RADIUS_STEP,
            SettingsChange::DecreaseRadius => self.radius = (self.radius - RADIUS_STEP).max(MIN_RADIUS),
            SettingsChange::IncreaseBias => self.bias += BIAS_STEP,
            SettingsChange::DecreaseBias => self.bias = (self.bias - BIAS_STEP).max(0.0),
            SettingsChange::IncreaseShininess => self.shininess += SHININESS_STEP,
            SettingsChange::DecreaseShininess => {
                self.shininess = (self.shininess - SHININESS_STEP).max(MIN_SHININESS);
            }
        }
    }
}

/// The fixed mesh placement and the enclosing box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Uniform scale applied to meshes loaded from file.
    pub mesh_scale: f32,
    /// Translation applied to meshes loaded from file, after scaling.
    pub mesh_offset: Vec3,
    /// Grey level written to the albedo buffer.
    pub albedo: f32,
    /// Whether the enclosing box is drawn.
    pub show_box: bool,
    /// Center of the enclosing box.
    pub box_center: Vec3,
    /// Half extents of the enclosing box.
    pub box_half_extents: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh_scale: 0.03,
            mesh_offset: Vec3::ZERO,
            albedo: 0.95,
            show_box: true,
            box_center: Vec3::new(0.0, 1.5, 2.0),
            box_half_extents: Vec3::new(3.0, 2.5, 4.0),
        }
    }
}

impl SceneConfig {
    /// Model matrix for a mesh loaded from file.
    #[must_use]
    pub fn mesh_transform(&self) -> Mat4 {
        Mat4::from_translation(self.mesh_offset) * Mat4::from_scale(Vec3::splat(self.mesh_scale))
    }

    /// Floor height of the enclosing box.
    #[must_use]
    pub fn floor_height(&self) -> f32 {
        self.box_center.y - self.box_half_extents.y
    }
}
