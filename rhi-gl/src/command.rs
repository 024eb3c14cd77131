//! `GlCommandQueue`: the single-threaded, immediate-execution state machine
//! from spec.md §4.4. Every validation failure is logged and the offending
//! call is dropped; the queue is never left with partially-applied state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use crate::backend::SharedState;
use crate::pipeline::topology_to_gl;
use crate::state::StateCache;
use crate::sync;
use rhi::format::format_info;
use rhi::{
    BufferAccess, BufferHandle, BufferUsage, CommandQueue, FenceHandle, FramebufferHandle, IndexFormat, LoadOp,
    PipelineHandle, RenderPassHandle, Scissor, ShaderBindingHandle, StoreOp, TextureCopyRegion, TextureHandle,
    TextureType, TextureUsage, VertexBufferBinding, Viewport,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum QueueState {
    Idle,
    Recording,
    InRenderPass,
}

impl From<QueueState> for rhi::QueueState {
    fn from(s: QueueState) -> Self {
        match s {
            QueueState::Idle => rhi::QueueState::Idle,
            QueueState::Recording => rhi::QueueState::Recording,
            QueueState::InRenderPass => rhi::QueueState::InRenderPass,
        }
    }
}

#[derive(Copy, Clone)]
struct BoundIndexBuffer {
    gl_type: GLenum,
    index_size: usize,
}

pub struct GlCommandQueue {
    pub(crate) gl: Rc<Gl>,
    pub(crate) shared: Rc<RefCell<SharedState>>,
    state: QueueState,
    cache: StateCache,
    resolve_fbo: crate::framebuffer::ResolveFbo,
    current_pass: Option<(RenderPassHandle, FramebufferHandle)>,
    bound_pipeline: Option<PipelineHandle>,
    bound_index_buffer: Option<BoundIndexBuffer>,
}

impl GlCommandQueue {
    pub(crate) fn new(gl: Rc<Gl>, shared: Rc<RefCell<SharedState>>) -> GlCommandQueue {
        GlCommandQueue {
            gl,
            shared,
            state: QueueState::Idle,
            cache: StateCache::new(),
            resolve_fbo: Default::default(),
            current_pass: None,
            bound_pipeline: None,
            bound_index_buffer: None,
        }
    }
}

impl Drop for GlCommandQueue {
    fn drop(&mut self) {
        self.resolve_fbo.destroy(&self.gl);
    }
}

fn unbind_pipeline_state(gl: &Gl, cache: &mut StateCache) {
    cache.invalidate_pipeline_state();
    unsafe {
        gl.UseProgram(0);
        gl.BindVertexArray(0);
    }
}

impl CommandQueue for GlCommandQueue {
    fn state(&self) -> rhi::QueueState {
        self.state.into()
    }

    fn begin(&mut self) {
        if self.state != QueueState::Idle {
            log::error!("begin: queue is not idle");
            return;
        }
        self.state = QueueState::Recording;
    }

    fn end(&mut self) {
        if self.state != QueueState::Recording {
            log::error!("end: queue is not recording (or a render pass is still open)");
            return;
        }
        self.state = QueueState::Idle;
        self.bound_pipeline = None;
        self.bound_index_buffer = None;
    }

    fn begin_render_pass(&mut self, render_pass: RenderPassHandle, framebuffer: FramebufferHandle) {
        if self.state != QueueState::Recording {
            log::error!("begin_render_pass: queue is not recording");
            return;
        }

        let shared = self.shared.borrow();
        let pass = match shared.render_passes.try_get(render_pass) {
            Some(p) => p,
            None => {
                log::error!("begin_render_pass: unknown render pass handle");
                return;
            }
        };
        let fb = match shared.framebuffers.try_get(framebuffer) {
            Some(fb) => fb,
            None => {
                log::error!("begin_render_pass: unknown framebuffer handle");
                return;
            }
        };

        if pass.color_attachments.len() != fb.render_target_count() {
            log::error!(
                "begin_render_pass: render pass declares {} color attachments, framebuffer has {}",
                pass.color_attachments.len(),
                fb.render_target_count()
            );
            return;
        }
        for (i, attachment) in pass.color_attachments.iter().enumerate() {
            if Some(attachment.format) != fb.render_target_format(i) {
                log::error!("begin_render_pass: color attachment {} format mismatch with framebuffer", i);
                return;
            }
            if attachment.store_op == StoreOp::Resolve {
                if fb.is_default() {
                    log::error!("begin_render_pass: store_op = Resolve is forbidden on the default framebuffer");
                    return;
                }
                let target = attachment.resolve_target.expect("create_render_pass requires resolve_target for Resolve");
                if fb.resolve_destination_attachment_point(target).is_none() {
                    log::error!(
                        "begin_render_pass: color attachment {}'s resolve_target is not one of the framebuffer's resolve-destination attachments",
                        i
                    );
                    return;
                }
            }
        }
        if let Some(ds) = &pass.depth_stencil_attachment {
            if Some(ds.format) != fb.depth_stencil_format {
                log::error!("begin_render_pass: depth-stencil format mismatch with framebuffer");
                return;
            }
        }

        let fbo_obj = fb.obj.unwrap_or(0);
        self.cache.bind_framebuffer(&self.gl, gl::DRAW_FRAMEBUFFER, fbo_obj);
        unsafe {
            self.cache.set_scissor_enable(&self.gl, false);
            self.gl.Viewport(0, 0, fb.width as GLsizei, fb.height as GLsizei);

            for (i, attachment) in pass.color_attachments.iter().enumerate() {
                if attachment.load_op == LoadOp::Clear {
                    let point = fb.render_attachment_point(i).expect("validated above");
                    let draw_buffer_index = (point - gl::COLOR_ATTACHMENT0) as GLint;
                    self.gl
                        .ClearNamedFramebufferfv(fbo_obj, gl::COLOR, draw_buffer_index, attachment.clear_value.0.as_ptr());
                }
            }
            if let Some(ds) = &pass.depth_stencil_attachment {
                if ds.depth_load_op == LoadOp::Clear {
                    self.gl.ClearNamedFramebufferfv(fbo_obj, gl::DEPTH, 0, &ds.depth_clear_value);
                }
                if ds.stencil_load_op == LoadOp::Clear {
                    let value = ds.stencil_clear_value as GLint;
                    self.gl.ClearNamedFramebufferiv(fbo_obj, gl::STENCIL, 0, &value);
                }
            }
        }

        drop(shared);
        self.state = QueueState::InRenderPass;
        self.current_pass = Some((render_pass, framebuffer));
    }

    fn end_render_pass(&mut self) {
        if self.state != QueueState::InRenderPass {
            log::error!("end_render_pass: no render pass is open");
            return;
        }
        let (render_pass, framebuffer) = self.current_pass.take().expect("state says InRenderPass");

        let shared = self.shared.borrow();
        let pass = shared.render_passes.try_get(render_pass).expect("resource outlived the pass");
        let fb = shared.framebuffers.try_get(framebuffer).expect("resource outlived the pass");
        let fbo_obj = fb.obj.unwrap_or(0);

        let mut invalidate_points: Vec<GLenum> = Vec::new();

        for (i, attachment) in pass.color_attachments.iter().enumerate() {
            let point = fb.render_attachment_point(i).expect("validated at begin_render_pass");
            match attachment.store_op {
                StoreOp::Store => {}
                StoreOp::Discard => invalidate_points.push(point),
                StoreOp::Resolve => {
                    let target = attachment.resolve_target.expect("store_op = Resolve requires resolve_target");
                    match shared.textures.try_get(target) {
                        Some(tex) => {
                            self.resolve_fbo
                                .resolve_color(&self.gl, fbo_obj, point, tex.obj, fb.width, fb.height);
                        }
                        None => log::error!("end_render_pass: color resolve_target is not a live texture"),
                    }
                }
            }
        }

        if let Some(ds) = &pass.depth_stencil_attachment {
            let info = format_info(ds.format);
            let class = info.depth_stencil_class.expect("validated at begin_render_pass");
            let attachment_point = match class {
                rhi::format::DepthStencilClass::Depth => gl::DEPTH_ATTACHMENT,
                rhi::format::DepthStencilClass::Stencil => gl::STENCIL_ATTACHMENT,
                rhi::format::DepthStencilClass::DepthStencil => gl::DEPTH_STENCIL_ATTACHMENT,
            };

            if ds.depth_store_op == StoreOp::Discard || ds.stencil_store_op == StoreOp::Discard {
                invalidate_points.push(attachment_point);
            }
            if ds.depth_store_op == StoreOp::Resolve {
                if let Some(target) = ds.depth_resolve_target {
                    if let Some(tex) = shared.textures.try_get(target) {
                        self.resolve_fbo.resolve_depth_stencil(
                            &self.gl,
                            fbo_obj,
                            tex.obj,
                            gl::DEPTH_ATTACHMENT,
                            gl::DEPTH_BUFFER_BIT,
                            fb.width,
                            fb.height,
                        );
                    }
                }
            }
            if ds.stencil_store_op == StoreOp::Resolve {
                if let Some(target) = ds.stencil_resolve_target {
                    if let Some(tex) = shared.textures.try_get(target) {
                        self.resolve_fbo.resolve_depth_stencil(
                            &self.gl,
                            fbo_obj,
                            tex.obj,
                            gl::STENCIL_ATTACHMENT,
                            gl::STENCIL_BUFFER_BIT,
                            fb.width,
                            fb.height,
                        );
                    }
                }
            }
        }

        if !invalidate_points.is_empty() && fb.obj.is_some() {
            unsafe {
                self.gl
                    .InvalidateNamedFramebufferData(fbo_obj, invalidate_points.len() as GLsizei, invalidate_points.as_ptr());
            }
        }

        drop(shared);
        self.state = QueueState::Recording;
        self.bound_pipeline = None;
    }

    fn bind_pipeline(&mut self, pipeline: PipelineHandle) {
        if self.state != QueueState::InRenderPass {
            log::error!("bind_pipeline: queue is not inside a render pass");
            return;
        }
        let (_, framebuffer) = self.current_pass.expect("state says InRenderPass");

        let shared = self.shared.borrow();
        let p = match shared.pipelines.try_get(pipeline) {
            Some(p) => p,
            None => {
                log::error!("bind_pipeline: unknown pipeline handle");
                unbind_pipeline_state(&self.gl, &mut self.cache);
                self.bound_pipeline = None;
                return;
            }
        };
        let fb = shared.framebuffers.try_get(framebuffer).expect("resource outlived the pass");

        if p.blend_states.len() != fb.render_target_count() {
            log::error!(
                "bind_pipeline: pipeline declares {} blend states, active framebuffer has {} render targets",
                p.blend_states.len(),
                fb.render_target_count()
            );
            unbind_pipeline_state(&self.gl, &mut self.cache);
            self.bound_pipeline = None;
            return;
        }

        self.cache.bind_program(&self.gl, p.program);
        self.cache.bind_vertex_array(&self.gl, p.vao);

        self.cache.set_cull_mode(&self.gl, p.rasterizer.cull_mode);
        self.cache.set_front_face(&self.gl, p.rasterizer.front_face);
        self.cache.set_polygon_mode(&self.gl, p.rasterizer.polygon_mode);
        self.cache.set_scissor_enable(&self.gl, p.rasterizer.scissor_enable);

        self.cache.set_depth_test_enable(&self.gl, p.depth_stencil.depth_test_enable);
        self.cache.set_depth_write_enable(&self.gl, p.depth_stencil.depth_write_enable);
        self.cache.set_depth_func(&self.gl, p.depth_stencil.depth_compare);
        self.cache.set_stencil_test_enable(&self.gl, p.depth_stencil.stencil_test_enable);

        unsafe {
            if p.depth_stencil.stencil_test_enable {
                apply_stencil_face(&self.gl, gl::FRONT, &p.depth_stencil.stencil_front);
                apply_stencil_face(&self.gl, gl::BACK, &p.depth_stencil.stencil_back);
            }
            if p.rasterizer.depth_clamp_enable {
                self.gl.Enable(gl::DEPTH_CLAMP);
                self.gl
                    .DepthRangef(p.rasterizer.depth_clamp_near.into_inner(), p.rasterizer.depth_clamp_far.into_inner());
            } else {
                self.gl.Disable(gl::DEPTH_CLAMP);
            }

            let offset_cap = match p.rasterizer.polygon_mode {
                rhi::PolygonMode::Fill => gl::POLYGON_OFFSET_FILL,
                rhi::PolygonMode::Line => gl::POLYGON_OFFSET_LINE,
                rhi::PolygonMode::Point => gl::POLYGON_OFFSET_POINT,
            };
            if let Some(offset) = p.rasterizer.polygon_offset {
                self.gl.Enable(offset_cap);
                self.gl.PolygonOffset(offset.factor.into_inner(), offset.units.into_inner());
            } else {
                self.gl.Disable(offset_cap);
            }

            let any_blend_enabled = p.blend_states.iter().any(|b| b.enabled);
            if any_blend_enabled {
                self.gl.Enable(gl::BLEND);
            } else {
                self.gl.Disable(gl::BLEND);
            }

            for (i, blend) in p.blend_states.iter().enumerate() {
                let i = i as GLuint;
                if blend.enabled {
                    self.gl.Enablei(gl::BLEND, i);
                    self.gl.BlendFuncSeparatei(
                        i,
                        crate::state::blend_factor_to_gl(blend.src_color_blend_factor),
                        crate::state::blend_factor_to_gl(blend.dst_color_blend_factor),
                        crate::state::blend_factor_to_gl(blend.src_alpha_blend_factor),
                        crate::state::blend_factor_to_gl(blend.dst_alpha_blend_factor),
                    );
                    self.gl.BlendEquationSeparatei(
                        i,
                        crate::state::blend_op_to_gl(blend.color_blend_op),
                        crate::state::blend_op_to_gl(blend.alpha_blend_op),
                    );
                    // Attachment 0 also drives the non-indexed blend state, which is
                    // what actually applies when this pipeline is later bound against
                    // the default framebuffer (GL_COLOR_ATTACHMENT0 has no indexed
                    // counterpart there).
                    if i == 0 {
                        self.gl.BlendFuncSeparate(
                            crate::state::blend_factor_to_gl(blend.src_color_blend_factor),
                            crate::state::blend_factor_to_gl(blend.dst_color_blend_factor),
                            crate::state::blend_factor_to_gl(blend.src_alpha_blend_factor),
                            crate::state::blend_factor_to_gl(blend.dst_alpha_blend_factor),
                        );
                        self.gl.BlendEquationSeparate(
                            crate::state::blend_op_to_gl(blend.color_blend_op),
                            crate::state::blend_op_to_gl(blend.alpha_blend_op),
                        );
                    }
                } else {
                    self.gl.Disablei(gl::BLEND, i);
                    self.gl.BlendFuncSeparatei(i, gl::ONE, gl::ZERO, gl::ONE, gl::ZERO);
                    self.gl.BlendEquationSeparatei(i, gl::FUNC_ADD, gl::FUNC_ADD);
                }
                self.gl.ColorMaski(
                    i,
                    blend.write_mask.contains(rhi::ColorWriteMask::R) as GLboolean,
                    blend.write_mask.contains(rhi::ColorWriteMask::G) as GLboolean,
                    blend.write_mask.contains(rhi::ColorWriteMask::B) as GLboolean,
                    blend.write_mask.contains(rhi::ColorWriteMask::A) as GLboolean,
                );
                if i == 0 {
                    self.gl.ColorMask(
                        blend.write_mask.contains(rhi::ColorWriteMask::R) as GLboolean,
                        blend.write_mask.contains(rhi::ColorWriteMask::G) as GLboolean,
                        blend.write_mask.contains(rhi::ColorWriteMask::B) as GLboolean,
                        blend.write_mask.contains(rhi::ColorWriteMask::A) as GLboolean,
                    );
                }
            }

            if p.multisample.sample_shading_enable {
                self.gl.Enable(gl::SAMPLE_SHADING);
                self.gl.MinSampleShading(p.multisample.min_sample_shading);
            } else {
                self.gl.Disable(gl::SAMPLE_SHADING);
            }
        }

        drop(shared);
        self.bound_pipeline = Some(pipeline);
    }

    fn bind_vertex_buffers(&mut self, binds: &[VertexBufferBinding]) {
        if self.state != QueueState::InRenderPass {
            log::error!("bind_vertex_buffers: queue is not inside a render pass");
            return;
        }
        let pipeline = match self.bound_pipeline {
            Some(p) => p,
            None => {
                log::error!("bind_vertex_buffers: no pipeline is bound");
                return;
            }
        };

        let shared = self.shared.borrow();
        let p = shared.pipelines.try_get(pipeline).expect("bound pipeline handle must be live");
        if binds.len() != p.vertex_bindings.len() {
            log::error!(
                "bind_vertex_buffers: got {} bindings, pipeline declares {}",
                binds.len(),
                p.vertex_bindings.len()
            );
            return;
        }
        let vao = p.vao;
        for (i, bind) in binds.iter().enumerate() {
            match shared.buffers.try_get(bind.buffer) {
                Some(buf) => {
                    if buf.desc.usage != BufferUsage::Vertex {
                        log::error!("bind_vertex_buffers: binding {} is not a vertex buffer", i);
                        continue;
                    }
                    let stride = p.vertex_bindings[i].stride;
                    unsafe {
                        self.gl
                            .VertexArrayVertexBuffer(vao, i as GLuint, buf.obj, bind.base_offset as GLintptr, stride as GLsizei);
                    }
                }
                None => log::error!("bind_vertex_buffers: binding {} is not a live buffer", i),
            }
        }
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle, format: IndexFormat) {
        if self.state != QueueState::InRenderPass {
            log::error!("bind_index_buffer: queue is not inside a render pass");
            return;
        }
        let pipeline = match self.bound_pipeline {
            Some(p) => p,
            None => {
                log::error!("bind_index_buffer: no pipeline is bound");
                return;
            }
        };
        let shared = self.shared.borrow();
        let p = shared.pipelines.try_get(pipeline).expect("bound pipeline handle must be live");
        let buf = match shared.buffers.try_get(buffer) {
            Some(buf) => buf,
            None => {
                log::error!("bind_index_buffer: unknown buffer handle");
                return;
            }
        };
        if buf.desc.usage != BufferUsage::Index {
            log::error!("bind_index_buffer: buffer does not have usage = index");
            return;
        }
        unsafe {
            self.gl.VertexArrayElementBuffer(p.vao, buf.obj);
        }
        self.bound_index_buffer = Some(match format {
            IndexFormat::U16 => BoundIndexBuffer {
                gl_type: gl::UNSIGNED_SHORT,
                index_size: 2,
            },
            IndexFormat::U32 => BoundIndexBuffer {
                gl_type: gl::UNSIGNED_INT,
                index_size: 4,
            },
        });
    }

    fn bind_shader_binding(&mut self, binding: ShaderBindingHandle) {
        if self.state != QueueState::InRenderPass {
            log::error!("bind_shader_binding: queue is not inside a render pass");
            return;
        }
        let shared = self.shared.borrow();
        let desc = match shared.shader_bindings.try_get(binding) {
            Some(desc) => desc,
            None => {
                log::error!("bind_shader_binding: unknown shader binding handle");
                return;
            }
        };
        for tb in &desc.textures {
            let tex = match shared.textures.try_get(tb.texture) {
                Some(t) => t,
                None => {
                    log::error!("bind_shader_binding: texture at binding {} is not live", tb.binding_index);
                    continue;
                }
            };
            let sampler = match shared.samplers.try_get(tb.sampler) {
                Some(s) => s,
                None => {
                    log::error!("bind_shader_binding: sampler at binding {} is not live", tb.binding_index);
                    continue;
                }
            };
            unsafe {
                self.gl.BindTextureUnit(tb.binding_index, tex.obj);
                self.gl.BindSampler(tb.binding_index, sampler.obj);
            }
        }
        for bb in &desc.buffers {
            let buf = match shared.buffers.try_get(bb.buffer) {
                Some(b) => b,
                None => {
                    log::error!("bind_shader_binding: buffer at binding {} is not live", bb.binding_index);
                    continue;
                }
            };
            let target = match buf.desc.usage {
                BufferUsage::Uniform => gl::UNIFORM_BUFFER,
                BufferUsage::Storage => gl::SHADER_STORAGE_BUFFER,
                _ => {
                    log::error!("bind_shader_binding: buffer at binding {} is not a uniform or storage buffer", bb.binding_index);
                    continue;
                }
            };
            unsafe {
                if bb.size == 0 {
                    self.gl.BindBufferBase(target, bb.binding_index, buf.obj);
                } else {
                    self.gl
                        .BindBufferRange(target, bb.binding_index, buf.obj, bb.offset as GLintptr, bb.size as GLsizeiptr);
                }
            }
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl.Viewport(
                viewport.x as GLint,
                viewport.y as GLint,
                viewport.width as GLsizei,
                viewport.height as GLsizei,
            );
            self.gl.DepthRangef(viewport.min_depth, viewport.max_depth);
        }
    }

    fn set_scissor(&mut self, scissor: Scissor) {
        match scissor {
            Scissor::Disabled => self.cache.set_scissor_enable(&self.gl, false),
            Scissor::Rect { x, y, width, height } => {
                self.cache.set_scissor_enable(&self.gl, true);
                unsafe {
                    self.gl.Scissor(x, y, width as GLsizei, height as GLsizei);
                }
            }
        }
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32, instance_count: u32, first_instance: u32) {
        if self.state != QueueState::InRenderPass || self.bound_pipeline.is_none() {
            log::error!("draw: queue is not inside a render pass with a bound pipeline");
            return;
        }
        if vertex_count == 0 || instance_count == 0 {
            return;
        }
        let mode = self.pipeline_topology();
        unsafe {
            if instance_count == 1 && first_instance == 0 {
                self.gl.DrawArrays(mode, first_vertex as GLint, vertex_count as GLsizei);
            } else {
                self.gl.DrawArraysInstancedBaseInstance(
                    mode,
                    first_vertex as GLint,
                    vertex_count as GLsizei,
                    instance_count as GLsizei,
                    first_instance,
                );
            }
        }
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32, instance_count: u32, first_instance: u32) {
        if self.state != QueueState::InRenderPass || self.bound_pipeline.is_none() {
            log::error!("draw_indexed: queue is not inside a render pass with a bound pipeline");
            return;
        }
        let index_buffer = match self.bound_index_buffer {
            Some(ib) => ib,
            None => {
                log::error!("draw_indexed: no index buffer is bound");
                return;
            }
        };
        if index_count == 0 || instance_count == 0 {
            return;
        }
        let mode = self.pipeline_topology();
        let offset = (first_index as usize * index_buffer.index_size) as *const GLvoid;
        unsafe {
            if instance_count == 1 && first_instance == 0 {
                if vertex_offset == 0 {
                    self.gl.DrawElements(mode, index_count as GLsizei, index_buffer.gl_type, offset);
                } else {
                    self.gl
                        .DrawElementsBaseVertex(mode, index_count as GLsizei, index_buffer.gl_type, offset, vertex_offset);
                }
            } else if first_instance == 0 {
                self.gl.DrawElementsInstancedBaseVertex(
                    mode,
                    index_count as GLsizei,
                    index_buffer.gl_type,
                    offset,
                    instance_count as GLsizei,
                    vertex_offset,
                );
            } else {
                self.gl.DrawElementsInstancedBaseVertexBaseInstance(
                    mode,
                    index_count as GLsizei,
                    index_buffer.gl_type,
                    offset,
                    instance_count as GLsizei,
                    vertex_offset,
                    first_instance,
                );
            }
        }
    }

    fn copy_buffer(&mut self, src: BufferHandle, dst: BufferHandle, size: usize, src_offset: usize, dst_offset: usize) {
        let shared = self.shared.borrow();
        let src_buf = match shared.buffers.try_get(src) {
            Some(b) => b,
            None => {
                log::error!("copy_buffer: unknown source buffer");
                return;
            }
        };
        let dst_buf = match shared.buffers.try_get(dst) {
            Some(b) => b,
            None => {
                log::error!("copy_buffer: unknown destination buffer");
                return;
            }
        };
        if src_buf.desc.access == BufferAccess::GpuToCpu {
            log::error!("copy_buffer: source buffer must have cpu_to_gpu or gpu_only access");
            return;
        }
        if dst_buf.desc.access != BufferAccess::GpuOnly {
            log::error!("copy_buffer: destination buffer must have gpu_only access");
            return;
        }
        if src_offset + size > src_buf.desc.size || dst_offset + size > dst_buf.desc.size {
            log::error!("copy_buffer: region out of bounds");
            return;
        }
        unsafe {
            self.gl
                .CopyNamedBufferSubData(src_buf.obj, dst_buf.obj, src_offset as GLintptr, dst_offset as GLintptr, size as GLsizeiptr);
        }
    }

    fn copy_buffer_to_texture(&mut self, src: BufferHandle, dst: TextureHandle, region: &TextureCopyRegion) {
        let shared = self.shared.borrow();
        let src_buf = match shared.buffers.try_get(src) {
            Some(b) => b,
            None => {
                log::error!("copy_buffer_to_texture: unknown source buffer");
                return;
            }
        };
        let dst_tex = match shared.textures.try_get(dst) {
            Some(t) => t,
            None => {
                log::error!("copy_buffer_to_texture: unknown destination texture");
                return;
            }
        };
        if src_buf.desc.usage != BufferUsage::Stage || src_buf.desc.access != BufferAccess::CpuToGpu {
            log::error!("copy_buffer_to_texture: source buffer must be a stage buffer with cpu_to_gpu access");
            return;
        }
        if dst_tex.desc.sample_count > 1 {
            log::error!("copy_buffer_to_texture: destination texture must not be multisample");
            return;
        }
        if !dst_tex.desc.usage.contains(TextureUsage::TRANSFER_DESTINATION) {
            log::error!("copy_buffer_to_texture: destination texture lacks transfer_destination usage");
            return;
        }
        if !format_info(dst_tex.desc.format).is_color {
            log::error!("copy_buffer_to_texture: destination texture format must be a color format");
            return;
        }
        if region.mip_level >= dst_tex.desc.mip_levels {
            log::error!("copy_buffer_to_texture: mip level out of bounds");
            return;
        }
        let (mip_w, mip_h, mip_d) = dst_tex.desc.mip_extent(region.mip_level);
        if region.x_offset + region.width > mip_w || region.y_offset + region.height > mip_h {
            log::error!("copy_buffer_to_texture: region exceeds mip level extent");
            return;
        }
        if dst_tex.desc.ty == TextureType::Texture3D {
            if region.depth == 0 || region.z_offset + region.depth > mip_d {
                log::error!("copy_buffer_to_texture: region exceeds mip level depth");
                return;
            }
        } else if region.depth != 1 || region.z_offset != 0 {
            log::error!("copy_buffer_to_texture: 2d/cube destination requires depth = 1 and z_offset = 0");
            return;
        }

        let info = format_info(dst_tex.desc.format);
        let row_length = if region.buffer_row_length_in_pixels != 0 {
            region.buffer_row_length_in_pixels
        } else {
            region.width
        };
        let real_row_bytes = region.width * info.bytes_per_pixel;
        let row_pitch = row_length * info.bytes_per_pixel;
        let depth = region.depth.max(1);
        let required = (row_pitch * region.height * depth).saturating_sub(row_pitch - real_row_bytes) as usize;
        if src_buf.desc.size < region.buffer_offset + required {
            log::error!("copy_buffer_to_texture: source buffer too small for region");
            return;
        }

        unsafe {
            self.gl.BindBuffer(gl::PIXEL_UNPACK_BUFFER, src_buf.obj);
            self.gl.PixelStorei(gl::UNPACK_ROW_LENGTH, row_length as GLint);
            self.gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            let offset = region.buffer_offset as *const GLvoid;

            match dst_tex.desc.ty {
                TextureType::Texture2D if dst_tex.desc.array_layers <= 1 => {
                    self.gl.TextureSubImage2D(
                        dst_tex.obj,
                        region.mip_level as GLint,
                        region.x_offset as GLint,
                        region.y_offset as GLint,
                        region.width as GLsizei,
                        region.height as GLsizei,
                        info.data_format,
                        info.data_type,
                        offset,
                    );
                }
                TextureType::Texture3D | TextureType::Texture2D => {
                    self.gl.TextureSubImage3D(
                        dst_tex.obj,
                        region.mip_level as GLint,
                        region.x_offset as GLint,
                        region.y_offset as GLint,
                        region.z_offset as GLint,
                        region.width as GLsizei,
                        region.height as GLsizei,
                        region.depth as GLsizei,
                        info.data_format,
                        info.data_type,
                        offset,
                    );
                }
                TextureType::TextureCube => {
                    self.gl.TextureSubImage3D(
                        dst_tex.obj,
                        region.mip_level as GLint,
                        region.x_offset as GLint,
                        region.y_offset as GLint,
                        (region.layer_index % 6) as GLint,
                        region.width as GLsizei,
                        region.height as GLsizei,
                        1,
                        info.data_format,
                        info.data_type,
                        offset,
                    );
                }
            }

            self.gl.PixelStorei(gl::UNPACK_ALIGNMENT, 4);
            self.gl.PixelStorei(gl::UNPACK_ROW_LENGTH, 0);
            self.gl.BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
        }
    }

    fn copy_texture_to_buffer(&mut self, src: TextureHandle, dst: BufferHandle, region: &TextureCopyRegion) {
        let shared = self.shared.borrow();
        let src_tex = match shared.textures.try_get(src) {
            Some(t) => t,
            None => {
                log::error!("copy_texture_to_buffer: unknown source texture");
                return;
            }
        };
        let dst_buf = match shared.buffers.try_get(dst) {
            Some(b) => b,
            None => {
                log::error!("copy_texture_to_buffer: unknown destination buffer");
                return;
            }
        };
        if !src_tex.desc.usage.contains(TextureUsage::TRANSFER_SOURCE) {
            log::error!("copy_texture_to_buffer: source texture lacks transfer_source usage");
            return;
        }
        if dst_buf.desc.usage != BufferUsage::Stage || dst_buf.desc.access != BufferAccess::GpuToCpu {
            log::error!("copy_texture_to_buffer: destination buffer must be a stage buffer with gpu_to_cpu access");
            return;
        }
        if region.mip_level >= src_tex.desc.mip_levels {
            log::error!("copy_texture_to_buffer: mip level out of bounds");
            return;
        }
        let (mip_w, mip_h, mip_d) = src_tex.desc.mip_extent(region.mip_level);
        if region.x_offset + region.width > mip_w || region.y_offset + region.height > mip_h {
            log::error!("copy_texture_to_buffer: region exceeds mip level extent");
            return;
        }
        if src_tex.desc.ty == TextureType::Texture3D {
            if region.depth == 0 || region.z_offset + region.depth > mip_d {
                log::error!("copy_texture_to_buffer: region exceeds mip level depth");
                return;
            }
        } else if region.depth != 1 || region.z_offset != 0 {
            log::error!("copy_texture_to_buffer: 2d/cube source requires depth = 1 and z_offset = 0");
            return;
        }

        let info = format_info(src_tex.desc.format);
        let row_length = if region.buffer_row_length_in_pixels != 0 {
            region.buffer_row_length_in_pixels
        } else {
            region.width
        };
        let real_row_bytes = region.width * info.bytes_per_pixel;
        let row_pitch = row_length * info.bytes_per_pixel;
        let depth = region.depth.max(1);
        let required = (row_pitch * region.height * depth).saturating_sub(row_pitch - real_row_bytes) as usize;
        if dst_buf.desc.size < region.buffer_offset + required {
            log::error!("copy_texture_to_buffer: destination buffer too small for region");
            return;
        }
        let buf_size = required as GLsizei;

        let z_offset = if src_tex.desc.ty == TextureType::TextureCube {
            region.layer_index % 6
        } else {
            region.z_offset
        };
        let depth = if src_tex.desc.ty == TextureType::Texture3D { region.depth } else { 1 };

        unsafe {
            self.gl.BindBuffer(gl::PIXEL_PACK_BUFFER, dst_buf.obj);
            self.gl.PixelStorei(gl::PACK_ROW_LENGTH, row_length as GLint);
            self.gl.PixelStorei(gl::PACK_ALIGNMENT, 1);
            self.gl.GetTextureSubImage(
                src_tex.obj,
                region.mip_level as GLint,
                region.x_offset as GLint,
                region.y_offset as GLint,
                z_offset as GLint,
                region.width as GLsizei,
                region.height as GLsizei,
                depth as GLsizei,
                info.data_format,
                info.data_type,
                buf_size,
                region.buffer_offset as *mut GLvoid,
            );
            self.gl.PixelStorei(gl::PACK_ALIGNMENT, 4);
            self.gl.PixelStorei(gl::PACK_ROW_LENGTH, 0);
            self.gl.BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
        }
    }

    fn signal_fence(&mut self, fence: FenceHandle) {
        let mut shared = self.shared.borrow_mut();
        match shared.fences.try_get_mut(fence) {
            Some(f) => sync::signal(&self.gl, f),
            None => log::error!("signal_fence: unknown fence handle"),
        }
    }

    fn wait_for_fence(&mut self, fence: FenceHandle) {
        let shared = self.shared.borrow();
        match shared.fences.try_get(fence) {
            Some(f) => sync::wait(&self.gl, f),
            None => log::error!("wait_for_fence: unknown fence handle"),
        }
    }
}

impl GlCommandQueue {
    fn pipeline_topology(&self) -> GLenum {
        let shared = self.shared.borrow();
        let p = shared
            .pipelines
            .try_get(self.bound_pipeline.expect("checked by caller"))
            .expect("bound pipeline handle must be live");
        topology_to_gl(p.topology)
    }
}

fn apply_stencil_face(gl: &Gl, face: GLenum, state: &rhi::StencilOpState) {
    unsafe {
        gl.StencilFuncSeparate(face, crate::state::compare_func_to_gl(state.compare), state.reference as GLint, state.read_mask);
        gl.StencilMaskSeparate(face, state.write_mask);
        gl.StencilOpSeparate(
            face,
            crate::state::stencil_op_to_gl(state.fail_op),
            crate::state::stencil_op_to_gl(state.depth_fail_op),
            crate::state::stencil_op_to_gl(state.pass_op),
        );
    }
}
