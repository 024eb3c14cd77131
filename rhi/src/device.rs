//! The `Device` trait: one `create_X`/`destroy_X` pair per resource kind
//! (spec.md §4.2), plus construction of command queues and the default
//! framebuffer.
//!
//! A single concrete implementation (`rhi_gl::GlDevice`) exists today, but the
//! contract is factored out as a trait so a second backend could be added
//! without touching callers (spec.md §1: "shaped so a second backend could be
//! added").

use crate::binding::{ShaderBindingDescriptor, ShaderBindingHandle};
use crate::buffer::{BufferDescriptor, BufferHandle};
use crate::command::CommandQueue;
use crate::format::Format;
use crate::framebuffer::{FramebufferDescriptor, FramebufferHandle};
use crate::image::{SamplerDescriptor, SamplerHandle, TextureDescriptor, TextureHandle};
use crate::pipeline::{PipelineDescriptor, PipelineHandle};
use crate::renderpass::{RenderPassDescriptor, RenderPassHandle};
use crate::fence::FenceHandle;

pub trait Device {
    type Queue: CommandQueue;

    fn create_buffer(&mut self, desc: &BufferDescriptor, initial_bytes: Option<&[u8]>) -> BufferHandle;
    fn destroy_buffer(&mut self, handle: BufferHandle);

    fn create_texture(&mut self, desc: &TextureDescriptor, pixels: Option<&[u8]>, stride: u32) -> TextureHandle;
    fn destroy_texture(&mut self, handle: TextureHandle);

    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> SamplerHandle;
    fn destroy_sampler(&mut self, handle: SamplerHandle);

    fn create_pipeline(&mut self, desc: &PipelineDescriptor<'_>) -> PipelineHandle;
    fn destroy_pipeline(&mut self, handle: PipelineHandle);

    fn create_render_pass(&mut self, desc: &RenderPassDescriptor) -> RenderPassHandle;
    fn destroy_render_pass(&mut self, handle: RenderPassHandle);

    fn create_framebuffer(
        &mut self,
        desc: &FramebufferDescriptor,
        color_attachments: &[TextureHandle],
        depth_stencil_attachment: Option<TextureHandle>,
    ) -> FramebufferHandle;
    fn create_framebuffer_default(
        &mut self,
        backbuffer_color_format: Format,
        backbuffer_depth_stencil_format: Option<Format>,
    ) -> FramebufferHandle;
    fn destroy_framebuffer(&mut self, handle: FramebufferHandle);

    fn create_shader_binding(&mut self, desc: &ShaderBindingDescriptor) -> ShaderBindingHandle;
    fn destroy_shader_binding(&mut self, handle: ShaderBindingHandle);

    fn create_fence(&mut self) -> FenceHandle;
    fn destroy_fence(&mut self, handle: FenceHandle);

    fn create_command_queue(&mut self) -> Self::Queue;
}
