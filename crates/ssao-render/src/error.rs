//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while setting up or driving the GPU pipeline.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter matched the request.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reported no usable format.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// Shader validation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Frames of this color format cannot be captured as 8-bit pixels.
    #[error("cannot capture frames of format {0:?}")]
    UnsupportedCaptureFormat(wgpu::TextureFormat),

    /// Reading a target back to the CPU failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
