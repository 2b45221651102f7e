//! Headless rendering API.
//!
//! Renders one frame of a scene without opening a window. Useful for
//! integration tests, batch processing and automated screenshots.

use std::path::Path;

use pollster::FutureExt;
use ssao_core::{CameraState, FrameParams, Options};
use ssao_render::screenshot::to_rgba;
use ssao_render::{save_image, PixelLayout, RenderEngine};

use crate::error::Result;
use crate::scene::Scene;

/// Renders `scene` to a raw RGBA pixel buffer.
///
/// Creates a headless GPU context at the size given by `options`, renders one
/// frame from the configured initial camera, and returns `width * height * 4`
/// bytes ordered row-by-row from the top-left.
pub fn render_to_image(options: &Options, scene: &Scene) -> Result<Vec<u8>> {
    let mut engine = RenderEngine::new_headless(options.width, options.height, options).block_on()?;
    scene.add_to(&mut engine);

    let camera = CameraState::new(&options.camera);
    let light = options.light.tracked(&camera, false);
    let (width, height) = engine.dimensions();
    let frame = FrameParams::new(
        &camera,
        width,
        height,
        light,
        options.render,
        options.background_color,
    );

    let (pixels, layout) = engine.capture_frame(&frame)?;
    Ok(to_rgba(&pixels, layout))
}

/// Renders `scene` and saves it as PNG or JPEG depending on the extension.
pub fn render_to_file(path: impl AsRef<Path>, options: &Options, scene: &Scene) -> Result<()> {
    let pixels = render_to_image(options, scene)?;
    save_image(
        path,
        &pixels,
        PixelLayout::Rgba,
        options.width.max(1),
        options.height.max(1),
    )?;
    Ok(())
}
