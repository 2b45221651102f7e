//! The whole frame on the CPU: geometry → SSAO → blur → lighting.

use glam::Vec3;

use crate::frame::FrameParams;
use crate::image::Image;
use crate::kernel::{NoiseTile, SsaoKernel};
use crate::passes::{blur_pass, geometry_pass, lighting_pass, ssao_pass, DrawCall, GBufferImage};

/// Every intermediate target of one CPU frame.
#[derive(Debug, Clone)]
pub struct ReferenceFrame {
    pub gbuffer: GBufferImage,
    pub raw_occlusion: Image<f32>,
    pub occlusion: Image<f32>,
    pub color: Image<Vec3>,
}

/// Runs the four passes in order over CPU images.
#[derive(Debug, Clone)]
pub struct ReferencePipeline {
    width: u32,
    height: u32,
    kernel: SsaoKernel,
    noise: NoiseTile,
}

impl ReferencePipeline {
    /// Creates a pipeline with its own kernel and noise tile.
    #[must_use]
    pub fn new(width: u32, height: u32, kernel: SsaoKernel, noise: NoiseTile) -> Self {
        Self {
            width,
            height,
            kernel,
            noise,
        }
    }

    /// Creates a pipeline whose kernel and noise come from `seed`.
    #[must_use]
    pub fn with_seed(width: u32, height: u32, seed: u64) -> Self {
        Self::new(width, height, SsaoKernel::generate(seed), NoiseTile::generate(seed))
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Renders one frame.
    #[must_use]
    pub fn render(&self, draws: &[DrawCall<'_>], frame: &FrameParams) -> ReferenceFrame {
        let mut gbuffer = GBufferImage::new(self.width, self.height);
        geometry_pass(&mut gbuffer, draws, &frame.transforms);

        let raw_occlusion = ssao_pass(
            &gbuffer,
            &self.kernel,
            &self.noise,
            frame.transforms.projection,
            &frame.ssao(),
        );
        let occlusion = blur_pass(&raw_occlusion, frame.settings.ssao_blur_enabled);
        let color = lighting_pass(&gbuffer, &occlusion, &frame.lighting(), frame.background);

        ReferenceFrame {
            gbuffer,
            raw_occlusion,
            occlusion,
            color,
        }
    }
}
