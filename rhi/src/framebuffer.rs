//! Framebuffer descriptors.

use crate::format::Format;
use crate::handle::Handle;

#[derive(Debug)]
pub struct FramebufferTag;
pub type FramebufferHandle = Handle<FramebufferTag>;

/// Declares the shape a concrete framebuffer must match: attachment count,
/// size and sample count. Concrete attachment textures are supplied separately
/// to `create_framebuffer`.
#[derive(Clone, Debug)]
pub struct FramebufferDescriptor {
    pub color_attachment_formats: Vec<Format>,
    pub depth_stencil_format: Option<Format>,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
}
