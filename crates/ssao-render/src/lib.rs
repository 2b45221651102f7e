//! Rendering backend for ssao-rs.
//!
//! This crate provides the wgpu-based deferred pipeline:
//! - G-buffer and occlusion targets allocated from the core framebuffer layouts
//! - Geometry, SSAO, blur and lighting passes (WGSL)
//! - Headless and windowed engines, plus readback and screenshot helpers

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Texture sizes and byte offsets convert between u32/usize/u64 freely
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_arguments)]

pub mod blur_pass;
pub mod buffer;
pub mod deferred;
pub mod engine;
pub mod error;
mod fullscreen;
pub mod geometry_pass;
pub mod lighting_pass;
pub mod readback;
pub mod scene;
pub mod screenshot;
pub mod shader;
pub mod ssao_pass;
pub mod targets;

pub use blur_pass::{BlurPass, BlurUniforms};
pub use deferred::DeferredRenderer;
pub use engine::{OcclusionStage, RenderEngine, HEADLESS_FORMAT};
pub use error::{RenderError, RenderResult};
pub use geometry_pass::{GeometryPass, ObjectUniforms, SceneObject};
pub use lighting_pass::{LightingPass, LightingUniforms};
pub use scene::{SceneRenderable, StaticMesh, VertexAttributes};
pub use screenshot::{save_image, PixelLayout, ScreenshotError};
pub use shader::{ShaderBuilder, ShaderProgram};
pub use ssao_pass::{SsaoPass, SsaoUniforms};
pub use targets::{GBuffer, SingleChannelTarget, TargetTexture};
