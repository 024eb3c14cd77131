//! `GlDevice`: the sole owner of every backend resource, implementing
//! `rhi::Device` over a single OpenGL 4.5 core context.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::Gl;
use crate::buffer::{self, GlBuffer};
use crate::command::GlCommandQueue;
use crate::framebuffer::{self, GlFramebuffer};
use crate::image::{self, GlTexture};
use crate::pipeline::{self, GlPipeline};
use crate::sampler::{self, GlSampler};
use crate::sync;
use crate::sync::GlFence;
use rhi::handle::Pool;
use rhi::{
    BufferDescriptor, BufferHandle, Device, FenceHandle, Format, FramebufferDescriptor, FramebufferHandle,
    PipelineDescriptor, PipelineHandle, RenderPassDescriptor, RenderPassHandle, SamplerDescriptor, SamplerHandle,
    ShaderBindingDescriptor, ShaderBindingHandle, TextureDescriptor, TextureHandle,
};

/// Resource pools shared between a `GlDevice` and every `GlCommandQueue` it
/// hands out. `Rc<RefCell<_>>` is the idiomatic single-threaded-interior-
/// mutability answer here: spec.md §5 rules out cross-thread sharing, so this
/// never needs atomics or a real lock.
#[derive(Default)]
pub(crate) struct SharedState {
    pub(crate) buffers: Pool<GlBuffer>,
    pub(crate) textures: Pool<GlTexture>,
    pub(crate) samplers: Pool<GlSampler>,
    pub(crate) pipelines: Pool<GlPipeline>,
    pub(crate) render_passes: Pool<RenderPassDescriptor>,
    pub(crate) framebuffers: Pool<GlFramebuffer>,
    pub(crate) shader_bindings: Pool<ShaderBindingDescriptor>,
    pub(crate) fences: Pool<GlFence>,
}

pub struct GlDevice {
    gl: Rc<Gl>,
    shared: Rc<RefCell<SharedState>>,
}

impl GlDevice {
    /// `gl` must already be current on the calling thread; this is guaranteed
    /// by constructing a `GlDevice` only from a `GlSwapchain`'s context.
    pub(crate) fn new(gl: Rc<Gl>) -> GlDevice {
        GlDevice {
            gl,
            shared: Rc::new(RefCell::new(SharedState::default())),
        }
    }
}

impl Device for GlDevice {
    type Queue = GlCommandQueue;

    fn create_buffer(&mut self, desc: &BufferDescriptor, initial_bytes: Option<&[u8]>) -> BufferHandle {
        match buffer::create_buffer(&self.gl, desc, initial_bytes) {
            Some(buf) => self.shared.borrow_mut().buffers.insert(buf),
            None => BufferHandle::NULL,
        }
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        match self.shared.borrow_mut().buffers.remove(handle) {
            Some(buf) => buffer::destroy_buffer(&self.gl, buf),
            None => log::error!("destroy_buffer: unknown or already-destroyed handle"),
        }
    }

    fn create_texture(&mut self, desc: &TextureDescriptor, pixels: Option<&[u8]>, stride: u32) -> TextureHandle {
        match image::create_texture(&self.gl, desc, pixels, stride) {
            Some(tex) => self.shared.borrow_mut().textures.insert(tex),
            None => TextureHandle::NULL,
        }
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        match self.shared.borrow_mut().textures.remove(handle) {
            Some(tex) => image::destroy_texture(&self.gl, tex),
            None => log::error!("destroy_texture: unknown or already-destroyed handle"),
        }
    }

    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> SamplerHandle {
        let sampler = sampler::create_sampler(&self.gl, desc);
        self.shared.borrow_mut().samplers.insert(sampler)
    }

    fn destroy_sampler(&mut self, handle: SamplerHandle) {
        match self.shared.borrow_mut().samplers.remove(handle) {
            Some(s) => sampler::destroy_sampler(&self.gl, s),
            None => log::error!("destroy_sampler: unknown or already-destroyed handle"),
        }
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor<'_>) -> PipelineHandle {
        match pipeline::create_pipeline(&self.gl, desc) {
            Some(p) => self.shared.borrow_mut().pipelines.insert(p),
            None => PipelineHandle::NULL,
        }
    }

    fn destroy_pipeline(&mut self, handle: PipelineHandle) {
        match self.shared.borrow_mut().pipelines.remove(handle) {
            Some(p) => pipeline::destroy_pipeline(&self.gl, p),
            None => log::error!("destroy_pipeline: unknown or already-destroyed handle"),
        }
    }

    fn create_render_pass(&mut self, desc: &RenderPassDescriptor) -> RenderPassHandle {
        if desc.color_attachments.is_empty() && desc.depth_stencil_attachment.is_none() {
            log::error!("create_render_pass: descriptor has no attachments at all");
            return RenderPassHandle::NULL;
        }
        for attachment in &desc.color_attachments {
            if attachment.store_op == rhi::StoreOp::Resolve && attachment.resolve_target.is_none() {
                log::error!("create_render_pass: store_op = Resolve requires a resolve_target");
                return RenderPassHandle::NULL;
            }
        }
        self.shared.borrow_mut().render_passes.insert(desc.clone())
    }

    fn destroy_render_pass(&mut self, handle: RenderPassHandle) {
        if self.shared.borrow_mut().render_passes.remove(handle).is_none() {
            log::error!("destroy_render_pass: unknown or already-destroyed handle");
        }
    }

    fn create_framebuffer(
        &mut self,
        desc: &FramebufferDescriptor,
        color_attachments: &[TextureHandle],
        depth_stencil_attachment: Option<TextureHandle>,
    ) -> FramebufferHandle {
        let fb = {
            let shared = self.shared.borrow();
            framebuffer::create_framebuffer(&self.gl, desc, color_attachments, depth_stencil_attachment, &shared.textures)
        };
        match fb {
            Some(fb) => self.shared.borrow_mut().framebuffers.insert(fb),
            None => FramebufferHandle::NULL,
        }
    }

    fn create_framebuffer_default(&mut self, backbuffer_color_format: Format, backbuffer_depth_stencil_format: Option<Format>) -> FramebufferHandle {
        // The default framebuffer's size tracks the swapchain; callers that
        // need the live size should query the swapchain, not this handle's
        // descriptor. The size recorded here is only used to size the
        // viewport/scissor applied at `begin_render_pass` time and is kept in
        // sync by re-creating this handle if the window is resized (out of
        // scope: this backend targets a fixed-size offscreen or non-resizable
        // window, per spec.md's Non-goals).
        let fb = framebuffer::create_framebuffer_default(backbuffer_color_format, backbuffer_depth_stencil_format, 0, 0);
        self.shared.borrow_mut().framebuffers.insert(fb)
    }

    fn destroy_framebuffer(&mut self, handle: FramebufferHandle) {
        match self.shared.borrow_mut().framebuffers.remove(handle) {
            Some(fb) => framebuffer::destroy_framebuffer(&self.gl, fb),
            None => log::error!("destroy_framebuffer: unknown or already-destroyed handle"),
        }
    }

    fn create_shader_binding(&mut self, desc: &ShaderBindingDescriptor) -> ShaderBindingHandle {
        self.shared.borrow_mut().shader_bindings.insert(desc.clone())
    }

    fn destroy_shader_binding(&mut self, handle: ShaderBindingHandle) {
        if self.shared.borrow_mut().shader_bindings.remove(handle).is_none() {
            log::error!("destroy_shader_binding: unknown or already-destroyed handle");
        }
    }

    fn create_fence(&mut self) -> FenceHandle {
        self.shared.borrow_mut().fences.insert(sync::create_fence())
    }

    fn destroy_fence(&mut self, handle: FenceHandle) {
        match self.shared.borrow_mut().fences.remove(handle) {
            Some(f) => sync::destroy_fence(&self.gl, f),
            None => log::error!("destroy_fence: unknown or already-destroyed handle"),
        }
    }

    fn create_command_queue(&mut self) -> GlCommandQueue {
        GlCommandQueue::new(Rc::clone(&self.gl), Rc::clone(&self.shared))
    }
}

/// Tears down every outstanding resource in the dependency order spec.md
/// §4.2 prescribes: samplers, then textures, pipelines, framebuffers,
/// buffers, shader bindings, render passes and fences (no backend objects,
/// dropped in whatever order), leaving the swapchain's context — owned by
/// the `GlSwapchain`, not this device — to outlive everything here.
impl Drop for GlDevice {
    fn drop(&mut self) {
        let mut shared = self.shared.borrow_mut();
        for sampler in shared.samplers.drain() {
            sampler::destroy_sampler(&self.gl, sampler);
        }
        for texture in shared.textures.drain() {
            image::destroy_texture(&self.gl, texture);
        }
        for pipeline in shared.pipelines.drain() {
            pipeline::destroy_pipeline(&self.gl, pipeline);
        }
        for framebuffer in shared.framebuffers.drain() {
            framebuffer::destroy_framebuffer(&self.gl, framebuffer);
        }
        for buffer in shared.buffers.drain() {
            buffer::destroy_buffer(&self.gl, buffer);
        }
        // Shader bindings and render passes carry no backend object; draining
        // just releases the pool's descriptor copies.
        shared.shader_bindings.drain().for_each(drop);
        shared.render_passes.drain().for_each(drop);
        for fence in shared.fences.drain() {
            sync::destroy_fence(&self.gl, fence);
        }
    }
}
