//! Offscreen framebuffer layouts and the binding-slot convention.
//!
//! These types describe what the GPU backend must allocate. The completeness
//! check runs before first use and mirrors what a driver would reject:
//! zero-sized attachments, mismatched sizes, missing color attachments.

use crate::error::{Result, SsaoError};

/// Pixel format of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentFormat {
    /// Four 16-bit floats (position, normal).
    Rgba16Float,
    /// Four 8-bit normalized channels (albedo).
    Rgba8Unorm,
    /// One 16-bit float (occlusion).
    R16Float,
    /// 32-bit float depth.
    Depth32Float,
}

impl AttachmentFormat {
    /// Returns whether this is a depth format.
    #[must_use]
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth32Float)
    }

    /// Bytes per texel.
    #[must_use]
    pub fn bytes_per_texel(self) -> u32 {
        match self {
            Self::Rgba16Float => 8,
            Self::Rgba8Unorm | Self::Depth32Float => 4,
            Self::R16Float => 2,
        }
    }
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClampMode {
    ClampToEdge,
    Repeat,
}

/// Fixed texture slots shared by every pass that reads offscreen targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingSlot {
    Position = 0,
    Normal = 1,
    Albedo = 2,
    Occlusion = 3,
}

impl BindingSlot {
    /// The binding index used in shaders.
    #[must_use]
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Binding index of the nearest/clamp sampler.
pub const SAMPLER_BINDING: u32 = 4;
/// Binding index of the nearest/repeat sampler used for the noise tile.
pub const NOISE_SAMPLER_BINDING: u32 = 5;
/// Binding index of a pass's uniform block.
pub const UNIFORM_BINDING: u32 = 6;
/// Binding index of the noise tile texture. Shares the albedo slot, which the
/// SSAO pass does not read.
pub const NOISE_BINDING: u32 = 2;

/// One attachment of a framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub label: String,
    pub format: AttachmentFormat,
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
    pub clamp: ClampMode,
    /// Slot this attachment is read from by later passes. `None` for depth.
    pub slot: Option<BindingSlot>,
}

impl Attachment {
    fn color(label: &str, format: AttachmentFormat, width: u32, height: u32, slot: BindingSlot) -> Self {
        Self {
            label: label.to_string(),
            format,
            width,
            height,
            filter: FilterMode::Nearest,
            clamp: ClampMode::ClampToEdge,
            slot: Some(slot),
        }
    }

    fn depth(label: &str, width: u32, height: u32) -> Self {
        Self {
            label: label.to_string(),
            format: AttachmentFormat::Depth32Float,
            width,
            height,
            filter: FilterMode::Nearest,
            clamp: ClampMode::ClampToEdge,
            slot: None,
        }
    }
}

/// Which pass-facing role a layout plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferKind {
    /// Position, normal, albedo and depth.
    GBuffer,
    /// One occlusion channel.
    SingleChannel,
}

/// A framebuffer description: its attachments and declared draw targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferLayout {
    pub label: String,
    pub kind: FramebufferKind,
    pub attachments: Vec<Attachment>,
    /// Slots the framebuffer's fragment outputs are routed to, in location order.
    pub draw_targets: Vec<BindingSlot>,
}

impl FramebufferLayout {
    /// The geometry buffer: RGBA16F position and normal, RGBA8 albedo, depth.
    #[must_use]
    pub fn gbuffer(width: u32, height: u32) -> Self {
        Self {
            label: "G-Buffer".to_string(),
            kind: FramebufferKind::GBuffer,
            attachments: vec![
                Attachment::color("G-Buffer Position", AttachmentFormat::Rgba16Float, width, height, BindingSlot::Position),
                Attachment::color("G-Buffer Normal", AttachmentFormat::Rgba16Float, width, height, BindingSlot::Normal),
                Attachment::color("G-Buffer Albedo", AttachmentFormat::Rgba8Unorm, width, height, BindingSlot::Albedo),
                Attachment::depth("G-Buffer Depth", width, height),
            ],
            draw_targets: vec![BindingSlot::Position, BindingSlot::Normal, BindingSlot::Albedo],
        }
    }

    /// A single-channel occlusion target.
    #[must_use]
    pub fn single_channel(label: &str, width: u32, height: u32) -> Self {
        Self {
            label: label.to_string(),
            kind: FramebufferKind::SingleChannel,
            attachments: vec![Attachment::color(
                label,
                AttachmentFormat::R16Float,
                width,
                height,
                BindingSlot::Occlusion,
            )],
            draw_targets: vec![BindingSlot::Occlusion],
        }
    }

    /// Color attachments in declaration order.
    pub fn color_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| !a.format.is_depth())
    }

    /// The depth attachment, if any.
    #[must_use]
    pub fn depth_attachment(&self) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.format.is_depth())
    }

    /// Validates the layout the way a driver would before first use.
    pub fn check_complete(&self) -> Result<()> {
        let incomplete = |reason: String| SsaoError::IncompleteFramebuffer {
            label: self.label.clone(),
            reason,
        };

        let Some(first) = self.attachments.first() else {
            return Err(incomplete("no attachments".to_string()));
        };
        for attachment in &self.attachments {
            if attachment.width == 0 || attachment.height == 0 {
                return Err(incomplete(format!("attachment '{}' has zero size", attachment.label)));
            }
            if (attachment.width, attachment.height) != (first.width, first.height) {
                return Err(incomplete(format!(
                    "attachment '{}' is {}x{}, expected {}x{}",
                    attachment.label, attachment.width, attachment.height, first.width, first.height
                )));
            }
        }
        if self.attachments.iter().filter(|a| a.format.is_depth()).count() > 1 {
            return Err(incomplete("more than one depth attachment".to_string()));
        }

        let color_slots: Vec<BindingSlot> = self.color_attachments().filter_map(|a| a.slot).collect();
        if color_slots.is_empty() {
            return Err(incomplete("no color attachment".to_string()));
        }
        if color_slots != self.draw_targets {
            return Err(incomplete(format!(
                "draw targets {:?} do not match color attachments {:?}",
                self.draw_targets, color_slots
            )));
        }
        Ok(())
    }

    /// Checks that this framebuffer provides exactly the slots a pass reads.
    pub fn check_inputs(&self, expected: &[BindingSlot]) -> Result<()> {
        if self.draw_targets == expected {
            return Ok(());
        }
        Err(SsaoError::InputMismatch {
            label: self.label.clone(),
            expected: expected.iter().map(|s| s.index()).collect(),
            actual: self.draw_targets.iter().map(|s| s.index()).collect(),
        })
    }

    /// Size shared by all attachments.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.attachments.first().map_or((0, 0), |a| (a.width, a.height))
    }
}

/// G-buffer slots read by the lighting pass.
pub const GBUFFER_INPUTS: [BindingSlot; 3] = [BindingSlot::Position, BindingSlot::Normal, BindingSlot::Albedo];

/// Occlusion slot read by the blur and lighting passes.
pub const OCCLUSION_INPUTS: [BindingSlot; 1] = [BindingSlot::Occlusion];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbuffer_layout_is_complete() {
        let layout = FramebufferLayout::gbuffer(800, 600);
        layout.check_complete().unwrap();
        layout.check_inputs(&GBUFFER_INPUTS).unwrap();
        assert_eq!(layout.color_attachments().count(), 3);
        assert_eq!(layout.depth_attachment().map(|a| a.format), Some(AttachmentFormat::Depth32Float));
        for attachment in &layout.attachments {
            assert_eq!(attachment.filter, FilterMode::Nearest);
            assert_eq!(attachment.clamp, ClampMode::ClampToEdge);
        }
    }

    #[test]
    fn test_gbuffer_formats() {
        let layout = FramebufferLayout::gbuffer(4, 4);
        let formats: Vec<_> = layout.attachments.iter().map(|a| a.format).collect();
        assert_eq!(
            formats,
            vec![
                AttachmentFormat::Rgba16Float,
                AttachmentFormat::Rgba16Float,
                AttachmentFormat::Rgba8Unorm,
                AttachmentFormat::Depth32Float,
            ]
        );
    }

    #[test]
    fn test_single_channel_layout() {
        let layout = FramebufferLayout::single_channel("SSAO Raw", 640, 480);
        layout.check_complete().unwrap();
        layout.check_inputs(&OCCLUSION_INPUTS).unwrap();
        assert!(layout.check_inputs(&GBUFFER_INPUTS).is_err());
        assert_eq!(layout.size(), (640, 480));
    }

    #[test]
    fn test_zero_size_is_incomplete() {
        let err = FramebufferLayout::gbuffer(0, 600).check_complete().unwrap_err();
        assert!(matches!(err, SsaoError::IncompleteFramebuffer { .. }));
    }

    #[test]
    fn test_mismatched_draw_targets_are_incomplete() {
        let mut layout = FramebufferLayout::gbuffer(8, 8);
        layout.draw_targets.pop();
        assert!(layout.check_complete().is_err());

        let mut layout = FramebufferLayout::gbuffer(8, 8);
        layout.attachments[1].width = 4;
        assert!(layout.check_complete().is_err());
    }

    #[test]
    fn test_input_mismatch_reports_slots() {
        let layout = FramebufferLayout::single_channel("SSAO Blur", 8, 8);
        match layout.check_inputs(&GBUFFER_INPUTS) {
            Err(SsaoError::InputMismatch { expected, actual, .. }) => {
                assert_eq!(expected, vec![0, 1, 2]);
                assert_eq!(actual, vec![3]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
