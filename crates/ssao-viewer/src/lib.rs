//! Interactive and headless viewer for ssao-rs.
//!
//! The viewer opens a window, grabs the cursor for mouse look and renders the
//! enclosing box plus one model with the deferred SSAO pipeline.
//!
//! # Controls
//! - Mouse: look around
//! - W/A/S/D: move, Space/LeftShift: up/down
//! - Space press: toggle the light following the camera
//! - 1/2/3: toggle SSAO, blur, lighting
//! - `[`/`]`: sample radius, `-`/`=`: depth bias, `,`/`.`: shininess
//! - F12: save `screenshot_NNNN.png`
//! - Escape: quit

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod app;
pub mod cli;
pub mod error;
pub mod headless;
pub mod scene;

pub use app::{run_app, App};
pub use cli::Cli;
pub use error::{Result, ViewerError};
pub use headless::{render_to_file, render_to_image};
pub use scene::{demo_mesh, load_obj, Scene, SceneMesh, SceneSource};

/// Runs the viewer as described by `cli`.
pub fn run(cli: &Cli) -> Result<()> {
    let options = cli.options()?;
    let scene = Scene::load(&cli.scene_source(), &options.scene)?;

    if let Some(out) = &cli.headless {
        log::info!("rendering {}x{} frame to {}", options.width, options.height, out.display());
        return render_to_file(out, &options, &scene);
    }

    run_app(options, scene)
}
