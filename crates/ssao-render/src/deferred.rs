//! The four-pass deferred pipeline: geometry → SSAO → blur → lighting.
//!
//! The renderer owns every offscreen target and the per-pass bind groups that
//! reference them. Targets are reallocated on resize; the passes themselves
//! (pipelines, samplers, kernel, noise texture) are created once.

use glam::Mat4;
use ssao_core::kernel;
use ssao_core::mesh::MeshData;
use ssao_core::targets::{FramebufferLayout, GBUFFER_INPUTS, OCCLUSION_INPUTS};
use ssao_core::FrameParams;

use crate::blur_pass::BlurPass;
use crate::geometry_pass::{GeometryPass, SceneObject};
use crate::lighting_pass::LightingPass;
use crate::scene::{SceneRenderable, StaticMesh};
use crate::ssao_pass::SsaoPass;
use crate::targets::{GBuffer, SingleChannelTarget};

/// Bind groups referencing the current targets.
struct PassBindings {
    ssao: wgpu::BindGroup,
    blur: wgpu::BindGroup,
    lighting: wgpu::BindGroup,
}

/// Logs if `layout` does not supply what its consumer reads.
fn check_inputs(layout: &FramebufferLayout, expected: &[ssao_core::BindingSlot]) {
    if let Err(err) = layout.check_inputs(expected) {
        log::error!("{err}");
    }
}

/// Deferred SSAO renderer.
pub struct DeferredRenderer {
    width: u32,
    height: u32,
    gbuffer: GBuffer,
    ssao_target: SingleChannelTarget,
    blur_target: SingleChannelTarget,
    geometry: GeometryPass,
    ssao: SsaoPass,
    blur: BlurPass,
    lighting: LightingPass,
    bindings: PassBindings,
    objects: Vec<SceneObject>,
}

impl DeferredRenderer {
    /// Creates the passes and allocates targets of the given size.
    ///
    /// The sample kernel is the process-wide one, generated from `seed` on first
    /// use. The noise tile always uses the seed that kernel was generated from.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        output_format: wgpu::TextureFormat,
        seed: u64,
    ) -> Self {
        let (kernel, noise) = kernel::seeded_sampling(seed);
        let kernel = kernel.clone();

        let gbuffer = GBuffer::new(device, width, height);
        let ssao_target = SingleChannelTarget::new(device, "SSAO", width, height);
        let blur_target = SingleChannelTarget::new(device, "SSAO Blur", width, height);

        let geometry = GeometryPass::new(device, gbuffer.color_formats());
        let ssao = SsaoPass::new(device, queue, kernel, &noise);
        let blur = BlurPass::new(device);
        let lighting = LightingPass::new(device, output_format);

        let bindings = Self::create_bindings(device, &ssao, &blur, &lighting, &gbuffer, &ssao_target, &blur_target);

        log::info!(
            "deferred renderer ready at {width}x{height} (geometry: {}, ssao: {}, blur: {}, lighting: {})",
            geometry.is_ready(),
            ssao.is_ready(),
            blur.is_ready(),
            lighting.is_ready()
        );

        Self {
            width,
            height,
            gbuffer,
            ssao_target,
            blur_target,
            geometry,
            ssao,
            blur,
            lighting,
            bindings,
            objects: Vec::new(),
        }
    }

    fn create_bindings(
        device: &wgpu::Device,
        ssao: &SsaoPass,
        blur: &BlurPass,
        lighting: &LightingPass,
        gbuffer: &GBuffer,
        ssao_target: &SingleChannelTarget,
        blur_target: &SingleChannelTarget,
    ) -> PassBindings {
        check_inputs(gbuffer.layout(), &GBUFFER_INPUTS);
        check_inputs(ssao_target.layout(), &OCCLUSION_INPUTS);
        check_inputs(blur_target.layout(), &OCCLUSION_INPUTS);

        PassBindings {
            ssao: ssao.create_bind_group(device, gbuffer),
            blur: blur.create_bind_group(device, ssao_target),
            lighting: lighting.create_bind_group(device, gbuffer, blur_target),
        }
    }

    /// Adds a renderable, binding its attributes to the geometry program.
    ///
    /// Returns the object index.
    pub fn add_renderable(
        &mut self,
        device: &wgpu::Device,
        renderable: Box<dyn SceneRenderable>,
        model: Mat4,
        invert_normals: bool,
        albedo: f32,
    ) -> usize {
        let object = self
            .geometry
            .create_object(device, renderable, model, invert_normals, albedo);
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Uploads `mesh` and adds it to the scene.
    pub fn add_mesh(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        mesh: &MeshData,
        model: Mat4,
        invert_normals: bool,
        albedo: f32,
    ) -> usize {
        let renderable = Box::new(StaticMesh::new(device, label, mesh));
        self.add_renderable(device, renderable, model, invert_normals, albedo)
    }

    /// Scene objects in draw order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Mutable access for changing placements between frames.
    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    /// Reallocates every target at the new size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("resizing deferred targets to {width}x{height}");
        self.width = width;
        self.height = height;
        self.gbuffer = GBuffer::new(device, width, height);
        self.ssao_target = SingleChannelTarget::new(device, "SSAO", width, height);
        self.blur_target = SingleChannelTarget::new(device, "SSAO Blur", width, height);
        self.bindings = Self::create_bindings(
            device,
            &self.ssao,
            &self.blur,
            &self.lighting,
            &self.gbuffer,
            &self.ssao_target,
            &self.blur_target,
        );
    }

    /// Uploads this frame's uniforms for every pass.
    pub fn prepare(&mut self, queue: &wgpu::Queue, frame: &FrameParams) {
        let transforms = &frame.transforms;
        for object in &self.objects {
            object.update_uniforms(queue, transforms.view, transforms.projection);
        }
        self.ssao
            .update_uniforms(queue, transforms.projection, &frame.ssao(), self.width, self.height);
        self.blur.update_uniforms(queue, frame.settings.ssao_blur_enabled);
        self.lighting.update_uniforms(queue, &frame.lighting(), frame.background);
    }

    /// Records the four passes, writing the final color to `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        self.geometry.render(encoder, &self.gbuffer, &self.objects);
        self.ssao.render(encoder, self.ssao_target.view(), &self.bindings.ssao);
        self.blur.render(encoder, self.blur_target.view(), &self.bindings.blur);
        self.lighting.render(encoder, output, &self.bindings.lighting);
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    /// Unblurred SSAO output.
    #[must_use]
    pub fn raw_occlusion(&self) -> &SingleChannelTarget {
        &self.ssao_target
    }

    /// Blurred occlusion read by the lighting pass.
    #[must_use]
    pub fn occlusion(&self) -> &SingleChannelTarget {
        &self.blur_target
    }
}
