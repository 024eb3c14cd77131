//! Value types shared by every `CommandQueue` implementation, plus the
//! `CommandQueue` trait itself (the state machine described in spec.md §4.4).

use crate::buffer::BufferHandle;
use crate::fence::FenceHandle;
use crate::framebuffer::FramebufferHandle;
use crate::image::TextureHandle;
use crate::pipeline::{PipelineHandle, Scissor, Viewport};
use crate::renderpass::RenderPassHandle;
use crate::binding::ShaderBindingHandle;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IndexFormat {
    U16,
    U32,
}

/// One entry of `bind_vertex_buffers`: a buffer and the base byte offset into it.
#[derive(Copy, Clone, Debug)]
pub struct VertexBufferBinding {
    pub buffer: BufferHandle,
    pub base_offset: usize,
}

/// Region for `copy_buffer_to_texture` / `copy_texture_to_buffer`.
#[derive(Copy, Clone, Debug)]
pub struct TextureCopyRegion {
    pub buffer_offset: usize,
    pub buffer_row_length_in_pixels: u32,
    pub mip_level: u32,
    pub layer_index: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub z_offset: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// The observable state of a command queue. Not exposed as an enum the caller
/// inspects directly; kept here for documentation and for backend unit tests
/// that assert on transition behavior.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueueState {
    Idle,
    Recording,
    InRenderPass,
}

/// Records and (immediately) executes draw and transfer work against a
/// [`crate::device::Device`]. A queue is a single-threaded, immediate-mode
/// state machine: there is no deferred command buffer, no sort key, no replay
/// step. Every validation failure is logged and the offending call is dropped;
/// the queue is never left in an undefined state (spec.md §7, §9).
pub trait CommandQueue {
    fn state(&self) -> QueueState;

    fn begin(&mut self);
    fn end(&mut self);

    fn begin_render_pass(&mut self, render_pass: RenderPassHandle, framebuffer: FramebufferHandle);
    fn end_render_pass(&mut self);

    fn bind_pipeline(&mut self, pipeline: PipelineHandle);
    fn bind_vertex_buffers(&mut self, binds: &[VertexBufferBinding]);
    fn bind_index_buffer(&mut self, buffer: BufferHandle, format: IndexFormat);
    fn bind_shader_binding(&mut self, binding: ShaderBindingHandle);

    fn set_viewport(&mut self, viewport: Viewport);
    fn set_scissor(&mut self, scissor: Scissor);

    fn draw(&mut self, vertex_count: u32, first_vertex: u32, instance_count: u32, first_instance: u32);
    fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
        instance_count: u32,
        first_instance: u32,
    );

    fn copy_buffer(&mut self, src: BufferHandle, dst: BufferHandle, size: usize, src_offset: usize, dst_offset: usize);
    fn copy_buffer_to_texture(&mut self, src: BufferHandle, dst: TextureHandle, region: &TextureCopyRegion);
    fn copy_texture_to_buffer(&mut self, src: TextureHandle, dst: BufferHandle, region: &TextureCopyRegion);

    fn signal_fence(&mut self, fence: FenceHandle);
    fn wait_for_fence(&mut self, fence: FenceHandle);
}
