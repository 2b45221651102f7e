//! Viewer error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The event loop could not be created or failed while running.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// GPU setup or submission failed.
    #[error(transparent)]
    Render(#[from] ssao_render::RenderError),

    /// Writing a captured frame failed.
    #[error(transparent)]
    Screenshot(#[from] ssao_render::ScreenshotError),

    /// Configuration or mesh data was rejected.
    #[error(transparent)]
    Core(#[from] ssao_core::SsaoError),

    /// The OBJ file could not be parsed.
    #[error("failed to load OBJ '{}': {source}", path.display())]
    ObjLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// The OBJ file parsed but has no triangles.
    #[error("OBJ '{}' contains no triangles", .0.display())]
    EmptyModel(PathBuf),
}

/// A specialized Result type for viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;
