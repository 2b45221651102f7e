//! Core data and math for ssao-rs.
//!
//! This crate has no GPU dependency. It provides:
//! - [`CameraState`] and the pure [`update_camera`] input integrator
//! - The SSAO sample kernel and rotation noise tile
//! - Framebuffer layouts and the binding-slot convention the GPU passes follow
//! - [`Options`] loaded from JSON
//! - CPU versions of the geometry, SSAO, blur and lighting passes, chained by
//!   [`ReferencePipeline`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Render settings legitimately have several toggle flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
// Pixel and index math converts between integer and float freely
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]

pub mod camera;
pub mod error;
pub mod frame;
pub mod image;
pub mod input;
pub mod kernel;
pub mod light;
pub mod mesh;
pub mod options;
pub mod passes;
pub mod reference;
pub mod targets;

pub use camera::{aspect_ratio, CameraConfig, CameraState, FrameTransforms, PITCH_LIMIT};
pub use error::{Result, SsaoError};
pub use frame::FrameParams;
pub use image::Image;
pub use input::{update_camera, FrameInput, InputEvent, InputState, Key};
pub use kernel::{NoiseTile, SsaoKernel, DEFAULT_SEED, KERNEL_SIZE, NOISE_DIM};
pub use light::PointLight;
pub use mesh::{MeshData, Vertex};
pub use options::{Options, RenderSettings, SceneConfig, SettingsChange};
pub use reference::{ReferenceFrame, ReferencePipeline};
pub use targets::{
    AttachmentFormat, BindingSlot, ClampMode, FilterMode, FramebufferKind, FramebufferLayout,
};

// Re-export glam types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
