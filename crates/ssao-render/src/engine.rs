//! The render engine: device setup, surface management and frame submission.

use std::sync::Arc;

use ssao_core::{FrameParams, Options};

use crate::deferred::DeferredRenderer;
use crate::error::{RenderError, RenderResult};
use crate::readback;
use crate::screenshot::PixelLayout;

/// Format of the headless color target.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Which occlusion target to read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcclusionStage {
    /// SSAO output before the blur.
    Raw,
    /// Blur output consumed by the lighting pass.
    Blurred,
}

/// An offscreen color target the lighting pass can write into.
struct ColorTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl ColorTarget {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("color target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// The main render engine.
pub struct RenderEngine {
    /// wgpu instance.
    pub instance: wgpu::Instance,
    /// wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// wgpu device.
    pub device: wgpu::Device,
    /// wgpu queue.
    pub queue: wgpu::Queue,
    /// Window surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
    renderer: DeferredRenderer,
    /// Offscreen target used in headless mode.
    headless_target: Option<ColorTarget>,
}

impl RenderEngine {
    /// Creates a new windowed render engine.
    pub async fn new_windowed(window: Arc<winit::window::Window>, options: &Options) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "ssao device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        // Lighting writes display values directly; an sRGB target would re-encode them.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb() && PixelLayout::of(**f).is_some())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!("surface configured as {surface_format:?} at {width}x{height}");

        let renderer = DeferredRenderer::new(&device, &queue, width, height, surface_format, options.seed);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface: Some(surface),
            surface_config,
            width,
            height,
            renderer,
            headless_target: None,
        })
    }

    /// Creates a new headless render engine.
    pub async fn new_headless(width: u32, height: u32, options: &Options) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "ssao device (headless)").await?;

        let width = width.max(1);
        let height = height.max(1);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: HEADLESS_FORMAT,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let renderer = DeferredRenderer::new(&device, &queue, width, height, HEADLESS_FORMAT, options.seed);
        let headless_target = ColorTarget::new(&device, HEADLESS_FORMAT, width, height);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface: None,
            surface_config,
            width,
            height,
            renderer,
            headless_target: Some(headless_target),
        })
    }

    async fn request_device(adapter: &wgpu::Adapter, label: &str) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;
        Ok((device, queue))
    }

    /// The deferred pipeline.
    #[must_use]
    pub fn renderer(&self) -> &DeferredRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut DeferredRenderer {
        &mut self.renderer
    }

    /// Adds a mesh to the scene.
    pub fn add_mesh(
        &mut self,
        label: &str,
        mesh: &ssao_core::MeshData,
        model: glam::Mat4,
        invert_normals: bool,
        albedo: f32,
    ) -> usize {
        self.renderer
            .add_mesh(&self.device, label, mesh, model, invert_normals, albedo)
    }

    /// Resizes the surface and every render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
        if self.headless_target.is_some() {
            self.headless_target = Some(ColorTarget::new(&self.device, self.surface_config.format, width, height));
        }

        self.renderer.resize(&self.device, width, height);
    }

    /// Renders one frame to the window surface, or to the offscreen target when headless.
    ///
    /// A lost or outdated surface is reconfigured and the frame is dropped.
    pub fn render_frame(&mut self, frame: &FrameParams) -> RenderResult<()> {
        self.renderer.prepare(&self.queue, frame);

        let Some(surface) = &self.surface else {
            if let Some(target) = &self.headless_target {
                self.submit(&target.view);
            }
            return Ok(());
        };

        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout");
                return Ok(());
            }
            Err(wgpu::SurfaceError::Other) => {
                log::warn!("Surface error: other");
                return Ok(());
            }
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.submit(&view);
        output.present();
        Ok(())
    }

    fn submit(&self, output: &wgpu::TextureView) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
        self.renderer.encode(&mut encoder, output);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Renders `frame` offscreen and returns its pixels with their channel order.
    ///
    /// Works in both modes; a windowed engine renders into a temporary texture
    /// of the surface format.
    pub fn capture_frame(&mut self, frame: &FrameParams) -> RenderResult<(Vec<u8>, PixelLayout)> {
        let format = self.surface_config.format;
        let layout = PixelLayout::of(format).ok_or(RenderError::UnsupportedCaptureFormat(format))?;

        self.renderer.prepare(&self.queue, frame);
        let temporary;
        let target = if let Some(target) = &self.headless_target {
            target
        } else {
            temporary = ColorTarget::new(&self.device, format, self.width, self.height);
            &temporary
        };
        self.submit(&target.view);

        let pixels = readback::read_rgba8(&self.device, &self.queue, &target.texture)?;
        Ok((pixels, layout))
    }

    /// Reads back an occlusion target from the last submitted frame.
    pub fn read_occlusion(&self, stage: OcclusionStage) -> RenderResult<Vec<f32>> {
        let target = match stage {
            OcclusionStage::Raw => self.renderer.raw_occlusion(),
            OcclusionStage::Blurred => self.renderer.occlusion(),
        };
        readback::read_r16float(&self.device, &self.queue, &target.target.texture)
    }

    /// Returns the current viewport dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether this engine presents to a window.
    #[must_use]
    pub fn is_windowed(&self) -> bool {
        self.surface.is_some()
    }
}
