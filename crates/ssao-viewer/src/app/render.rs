use ssao_core::{update_camera, FrameParams};
use ssao_render::save_image;

use super::App;

impl App {
    /// Runs one frame: input, camera and light update, close check, then the passes.
    pub(super) fn render(&mut self) {
        let now = std::time::Instant::now();
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame_time = Some(now);

        let input = self.input.take_frame_input();
        self.camera = update_camera(&self.camera, &input, dt);
        self.light = self.light.tracked(&self.camera, input.toggle_light_follow);
        if input.toggle_light_follow {
            log::info!("light follows camera: {}", self.light.follows_camera);
        }
        for change in &input.settings_changes {
            self.options.render.apply(*change);
        }
        if !input.settings_changes.is_empty() {
            log::info!("render settings: {:?}", self.options.render);
        }

        if self.input.close_requested() {
            self.close_requested = true;
            return;
        }

        let Some(engine) = &mut self.engine else {
            return;
        };
        let (width, height) = engine.dimensions();
        let frame = FrameParams::new(
            &self.camera,
            width,
            height,
            self.light,
            self.options.render,
            self.options.background_color,
        );

        if let Err(err) = engine.render_frame(&frame) {
            log::error!("frame failed: {err}");
            self.close_requested = true;
            return;
        }

        if self.input.take_capture_request() {
            let filename = self.next_screenshot_name();
            self.capture(&filename, &frame);
        }
    }

    /// Renders `frame` again offscreen and writes it to `filename`.
    fn capture(&mut self, filename: &str, frame: &FrameParams) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let (width, height) = engine.dimensions();
        let result = engine
            .capture_frame(frame)
            .map_err(ssao_render::ScreenshotError::from)
            .and_then(|(pixels, layout)| save_image(filename, &pixels, layout, width, height));
        if let Err(err) = result {
            log::warn!("screenshot '{filename}' failed: {err}");
        }
    }
}
