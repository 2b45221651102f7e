//! Per-frame parameters shared by the CPU and GPU pipelines.

use glam::Vec3;

use crate::camera::{CameraState, FrameTransforms};
use crate::light::PointLight;
use crate::options::RenderSettings;
use crate::passes::{LightingParams, SsaoParams};

/// Everything the passes read for one frame, snapshotted after the input step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub transforms: FrameTransforms,
    pub light: PointLight,
    pub settings: RenderSettings,
    pub background: Vec3,
}

impl FrameParams {
    /// Derives the transforms from the camera and viewport size.
    #[must_use]
    pub fn new(
        camera: &CameraState,
        width: u32,
        height: u32,
        light: PointLight,
        settings: RenderSettings,
        background: Vec3,
    ) -> Self {
        Self {
            transforms: camera.transforms(crate::camera::aspect_ratio(width, height)),
            light,
            settings,
            background,
        }
    }

    /// SSAO pass parameters.
    #[must_use]
    pub fn ssao(&self) -> SsaoParams {
        SsaoParams::from(&self.settings)
    }

    /// Lighting pass parameters, light in view space.
    #[must_use]
    pub fn lighting(&self) -> LightingParams {
        LightingParams::from_light(&self.light, self.transforms.view, &self.settings)
    }
}
