//! Render pass declarations: attachments and their load/store behavior.

use crate::format::Format;
use crate::handle::Handle;
use crate::image::TextureHandle;

#[derive(Debug)]
pub struct RenderPassTag;
pub type RenderPassHandle = Handle<RenderPassTag>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LoadOp {
    Load,
    Clear,
    Discard,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StoreOp {
    Store,
    Discard,
    Resolve,
}

#[derive(Copy, Clone, Debug)]
pub struct ClearColor(pub [f32; 4]);

/// A single color attachment slot in a render pass declaration.
#[derive(Copy, Clone, Debug)]
pub struct ColorAttachmentDescriptor {
    pub format: Format,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ClearColor,
    /// Required iff `store_op == StoreOp::Resolve`.
    pub resolve_target: Option<TextureHandle>,
}

/// Depth and stencil components carry independent load/store state, mirroring
/// the separate `depth_load_op`/`stencil_load_op` pair the command-queue policy
/// in spec.md §4.4.5/4.4.6 distinguishes.
#[derive(Copy, Clone, Debug)]
pub struct DepthStencilAttachmentDescriptor {
    pub format: Format,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub depth_clear_value: f32,
    pub depth_resolve_target: Option<TextureHandle>,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub stencil_clear_value: u8,
    pub stencil_resolve_target: Option<TextureHandle>,
}

#[derive(Clone, Debug, Default)]
pub struct RenderPassDescriptor {
    pub color_attachments: Vec<ColorAttachmentDescriptor>,
    pub depth_stencil_attachment: Option<DepthStencilAttachmentDescriptor>,
}
