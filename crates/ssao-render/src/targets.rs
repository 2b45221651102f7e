//! Offscreen render targets: the G-buffer and the two occlusion buffers.

use ssao_core::targets::{AttachmentFormat, FramebufferLayout};

/// Maps a layout format to its wgpu texture format.
#[must_use]
pub fn texture_format(format: AttachmentFormat) -> wgpu::TextureFormat {
    match format {
        AttachmentFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        AttachmentFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        AttachmentFormat::R16Float => wgpu::TextureFormat::R16Float,
        AttachmentFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
    }
}

/// One allocated attachment.
pub struct TargetTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl TargetTexture {
    fn new(device: &wgpu::Device, label: &str, format: AttachmentFormat, width: u32, height: u32) -> Self {
        let format = texture_format(format);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view, format }
    }
}

/// Logs a diagnostic if `layout` is incomplete. Allocation proceeds regardless.
fn check_layout(layout: &FramebufferLayout) {
    if let Err(err) = layout.check_complete() {
        log::error!("{err}");
    }
}

/// The geometry buffer.
pub struct GBuffer {
    pub position: TargetTexture,
    pub normal: TargetTexture,
    pub albedo: TargetTexture,
    pub depth: TargetTexture,
    layout: FramebufferLayout,
}

impl GBuffer {
    /// Allocates a G-buffer of the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let layout = FramebufferLayout::gbuffer(width, height);
        check_layout(&layout);
        let [position, normal, albedo, depth] = [0, 1, 2, 3].map(|i| {
            let attachment = &layout.attachments[i];
            TargetTexture::new(device, &attachment.label, attachment.format, width.max(1), height.max(1))
        });
        Self {
            position,
            normal,
            albedo,
            depth,
            layout,
        }
    }

    /// The layout this buffer was allocated from.
    #[must_use]
    pub fn layout(&self) -> &FramebufferLayout {
        &self.layout
    }

    /// Color target formats in location order.
    #[must_use]
    pub fn color_formats(&self) -> [wgpu::TextureFormat; 3] {
        [self.position.format, self.normal.format, self.albedo.format]
    }
}

/// A single-channel occlusion target.
pub struct SingleChannelTarget {
    pub target: TargetTexture,
    layout: FramebufferLayout,
}

impl SingleChannelTarget {
    /// Allocates an occlusion target of the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let layout = FramebufferLayout::single_channel(label, width, height);
        check_layout(&layout);
        let attachment = &layout.attachments[0];
        let target = TargetTexture::new(device, label, attachment.format, width.max(1), height.max(1));
        Self { target, layout }
    }

    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.target.view
    }

    #[must_use]
    pub fn layout(&self) -> &FramebufferLayout {
        &self.layout
    }
}

/// Format of the occlusion targets.
pub const OCCLUSION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Float;
