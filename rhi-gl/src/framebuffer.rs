//! Framebuffer objects: the render-pass/framebuffer composer from spec.md §4.2's
//! `create_framebuffer` contract, plus the private resolve FBO used by
//! `end_render_pass` to implement `StoreOp::Resolve`.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use crate::error::GlError;
use crate::image::GlTexture;
use crate::util::ScopedRelease;
use rhi::format::{format_info, DepthStencilClass};
use rhi::handle::Pool;
use rhi::{FramebufferDescriptor, Format, TextureHandle, TextureUsage};

/// One entry of a framebuffer's flat color-attachment list. `is_render_target`
/// distinguishes the two shapes the quantified invariant in spec.md §8 allows
/// for a multisample framebuffer: attachments sharing the framebuffer's sample
/// count are drawn into, single-sample attachments are resolve destinations
/// only and never appear in the active draw-buffer list.
#[derive(Debug)]
struct ColorAttachmentSlot {
    texture: TextureHandle,
    format: Format,
    attachment_point: GLenum,
    is_render_target: bool,
}

#[derive(Debug)]
pub(crate) struct GlFramebuffer {
    /// `None` for the default (backbuffer) framebuffer, which is GL object 0
    /// and is never deleted by `destroy_framebuffer`.
    pub(crate) obj: Option<GLuint>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) sample_count: u32,
    color_slots: Vec<ColorAttachmentSlot>,
    pub(crate) depth_stencil_format: Option<Format>,
}

impl GlFramebuffer {
    pub(crate) fn is_default(&self) -> bool {
        self.obj.is_none()
    }

    /// Number of attachments a bound pipeline's `blend_states` and a render
    /// pass's `color_attachments` must match (spec.md §8: the `∀ pipeline p
    /// bound...` invariant).
    pub(crate) fn render_target_count(&self) -> usize {
        self.color_slots.iter().filter(|s| s.is_render_target).count()
    }

    /// The attachment point a render pass's logical color slot `index` (in
    /// `render_target`-only order) actually draws into.
    pub(crate) fn render_attachment_point(&self, index: usize) -> Option<GLenum> {
        self.color_slots.iter().filter(|s| s.is_render_target).nth(index).map(|s| s.attachment_point)
    }

    /// The format of the render-target-only slot at logical index `index`,
    /// for validating a render pass's declared color attachment formats.
    pub(crate) fn render_target_format(&self, index: usize) -> Option<Format> {
        self.color_slots.iter().filter(|s| s.is_render_target).nth(index).map(|s| s.format)
    }

    /// `Some(attachment_point)` if `texture` is one of this framebuffer's
    /// declared (non-render) resolve-destination slots.
    pub(crate) fn resolve_destination_attachment_point(&self, texture: TextureHandle) -> Option<GLenum> {
        self.color_slots
            .iter()
            .find(|s| !s.is_render_target && s.texture == texture)
            .map(|s| s.attachment_point)
    }
}

fn depth_stencil_attachment_point(class: DepthStencilClass) -> GLenum {
    match class {
        DepthStencilClass::Depth => gl::DEPTH_ATTACHMENT,
        DepthStencilClass::Stencil => gl::STENCIL_ATTACHMENT,
        DepthStencilClass::DepthStencil => gl::DEPTH_STENCIL_ATTACHMENT,
    }
}

fn check_framebuffer_complete(gl: &Gl, obj: GLuint) -> Result<(), GlError> {
    let status = unsafe { gl.CheckNamedFramebufferStatus(obj, gl::FRAMEBUFFER) };
    if status != gl::FRAMEBUFFER_COMPLETE {
        return Err(GlError::FramebufferIncomplete { status });
    }
    Ok(())
}

/// Composes a device-owned framebuffer over caller-supplied attachment
/// textures. Each entry of `color_attachments` must either share
/// `desc.sample_count` and carry `render_target` usage (it is drawn into), or
/// have `sample_count = 1` and carry `resolve_destination` usage (it receives
/// an `end_render_pass` resolve blit but is never itself rendered to). This is
/// the composer's validation, per spec.md §8's multisample-framebuffer
/// invariant.
pub(crate) fn create_framebuffer(
    gl: &Gl,
    desc: &FramebufferDescriptor,
    color_attachments: &[TextureHandle],
    depth_stencil_attachment: Option<TextureHandle>,
    textures: &Pool<GlTexture>,
) -> Option<GlFramebuffer> {
    if color_attachments.len() != desc.color_attachment_formats.len() {
        log::error!(
            "create_framebuffer: got {} color attachments, descriptor declares {}",
            color_attachments.len(),
            desc.color_attachment_formats.len()
        );
        return None;
    }
    if desc.width == 0 || desc.height == 0 {
        log::error!("create_framebuffer: width and height must be > 0");
        return None;
    }
    if desc.color_attachment_formats.is_empty() && desc.depth_stencil_format.is_none() {
        log::error!("create_framebuffer: descriptor has no attachments at all");
        return None;
    }

    struct Resolved<'a> {
        tex: &'a GlTexture,
        is_render_target: bool,
    }

    let mut resolved_color = Vec::with_capacity(color_attachments.len());
    for (i, handle) in color_attachments.iter().enumerate() {
        let tex = match textures.try_get(*handle) {
            Some(tex) => tex,
            None => {
                log::error!("create_framebuffer: color attachment {} is not a live texture", i);
                return None;
            }
        };
        if tex.desc.format != desc.color_attachment_formats[i] {
            log::error!("create_framebuffer: color attachment {} format mismatch", i);
            return None;
        }
        if tex.desc.width != desc.width || tex.desc.height != desc.height {
            log::error!("create_framebuffer: color attachment {} size mismatch", i);
            return None;
        }

        let is_render_target = if tex.desc.sample_count == desc.sample_count {
            if !tex.desc.usage.contains(TextureUsage::RENDER_TARGET) {
                log::error!("create_framebuffer: color attachment {} lacks render_target usage", i);
                return None;
            }
            true
        } else if tex.desc.sample_count == 1 {
            if !tex.desc.usage.contains(TextureUsage::RESOLVE_DESTINATION) {
                log::error!(
                    "create_framebuffer: color attachment {} is single-sample but lacks resolve_destination usage",
                    i
                );
                return None;
            }
            false
        } else {
            log::error!("create_framebuffer: color attachment {} sample count mismatch", i);
            return None;
        };

        resolved_color.push(Resolved { tex, is_render_target });
    }

    let resolved_depth_stencil = match (depth_stencil_attachment, desc.depth_stencil_format) {
        (Some(handle), Some(format)) => {
            let tex = match textures.try_get(handle) {
                Some(tex) => tex,
                None => {
                    log::error!("create_framebuffer: depth-stencil attachment is not a live texture");
                    return None;
                }
            };
            if tex.desc.format != format || tex.desc.width != desc.width || tex.desc.height != desc.height {
                log::error!("create_framebuffer: depth-stencil attachment mismatch");
                return None;
            }
            if tex.desc.sample_count != desc.sample_count {
                log::error!("create_framebuffer: depth-stencil attachment sample count mismatch");
                return None;
            }
            Some(tex)
        }
        (None, None) => None,
        _ => {
            log::error!("create_framebuffer: depth-stencil attachment and descriptor format must agree");
            return None;
        }
    };

    let mut obj: GLuint = 0;
    unsafe {
        gl.CreateFramebuffers(1, &mut obj);
    }
    if obj == 0 {
        log::error!("create_framebuffer: glCreateFramebuffers returned 0");
        return None;
    }
    let guard = ScopedRelease::new(|| unsafe { gl.DeleteFramebuffers(1, &obj) });

    let mut slots = Vec::with_capacity(resolved_color.len());
    let mut draw_buffers = Vec::new();
    for (i, resolved) in resolved_color.iter().enumerate() {
        let attachment_point = gl::COLOR_ATTACHMENT0 + i as GLenum;
        unsafe {
            gl.NamedFramebufferTexture(obj, attachment_point, resolved.tex.obj, 0);
        }
        if resolved.is_render_target {
            draw_buffers.push(attachment_point);
        }
        slots.push(ColorAttachmentSlot {
            texture: color_attachments[i],
            format: resolved.tex.desc.format,
            attachment_point,
            is_render_target: resolved.is_render_target,
        });
    }
    unsafe {
        if draw_buffers.is_empty() {
            gl.NamedFramebufferDrawBuffer(obj, gl::NONE);
        } else {
            gl.NamedFramebufferDrawBuffers(obj, draw_buffers.len() as GLsizei, draw_buffers.as_ptr());
        }
    }

    if let Some(tex) = resolved_depth_stencil {
        let info = format_info(tex.desc.format);
        let attachment = depth_stencil_attachment_point(info.depth_stencil_class.expect("validated depth-stencil format"));
        unsafe {
            gl.NamedFramebufferTexture(obj, attachment, tex.obj, 0);
        }
    }

    if let Err(e) = check_framebuffer_complete(gl, obj) {
        log::error!("create_framebuffer: {}", e);
        return None;
    }

    guard.disarm();
    Some(GlFramebuffer {
        obj: Some(obj),
        width: desc.width,
        height: desc.height,
        sample_count: desc.sample_count,
        color_slots: slots,
        depth_stencil_format: desc.depth_stencil_format,
    })
}

pub(crate) fn create_framebuffer_default(
    backbuffer_color_format: Format,
    backbuffer_depth_stencil_format: Option<Format>,
    width: u32,
    height: u32,
) -> GlFramebuffer {
    GlFramebuffer {
        obj: None,
        width,
        height,
        sample_count: 1,
        color_slots: vec![ColorAttachmentSlot {
            texture: TextureHandle::NULL,
            format: backbuffer_color_format,
            attachment_point: gl::COLOR_ATTACHMENT0,
            is_render_target: true,
        }],
        depth_stencil_format: backbuffer_depth_stencil_format,
    }
}

pub(crate) fn destroy_framebuffer(gl: &Gl, framebuffer: GlFramebuffer) {
    if let Some(obj) = framebuffer.obj {
        unsafe {
            gl.DeleteFramebuffers(1, &obj);
        }
    }
}

/// A single lazily-allocated framebuffer object, re-attached and reused for
/// every `StoreOp::Resolve` blit destination in a queue's lifetime. This is
/// the "resolve framebuffer" spec.md's glossary describes: a private object
/// distinct from any framebuffer the caller created, used only as the blit's
/// draw target. One attachment point is bound at a time, immediately before
/// the blit that consumes it, since resolves within a render pass are never
/// concurrent.
#[derive(Debug, Default)]
pub(crate) struct ResolveFbo {
    obj: Option<GLuint>,
}

impl ResolveFbo {
    fn get_or_create(&mut self, gl: &Gl) -> GLuint {
        if let Some(obj) = self.obj {
            return obj;
        }
        let mut obj: GLuint = 0;
        unsafe {
            gl.CreateFramebuffers(1, &mut obj);
        }
        self.obj = Some(obj);
        obj
    }

    /// Blits `src_fbo`'s `src_attachment_index`'th color attachment into
    /// `dst_texture`, which must be a single-sample, same-format, same-size
    /// texture.
    pub(crate) fn resolve_color(
        &mut self,
        gl: &Gl,
        src_fbo: GLuint,
        src_attachment_point: GLenum,
        dst_texture: GLuint,
        width: u32,
        height: u32,
    ) {
        let fbo = self.get_or_create(gl);
        unsafe {
            gl.NamedFramebufferTexture(fbo, gl::COLOR_ATTACHMENT0, dst_texture, 0);
            gl.NamedFramebufferReadBuffer(src_fbo, src_attachment_point);
            gl.NamedFramebufferDrawBuffer(fbo, gl::COLOR_ATTACHMENT0);
            gl.BlitNamedFramebuffer(
                src_fbo,
                fbo,
                0,
                0,
                width as GLint,
                height as GLint,
                0,
                0,
                width as GLint,
                height as GLint,
                gl::COLOR_BUFFER_BIT,
                gl::NEAREST,
            );
            gl.NamedFramebufferTexture(fbo, gl::COLOR_ATTACHMENT0, 0, 0);
        }
    }

    pub(crate) fn resolve_depth_stencil(
        &mut self,
        gl: &Gl,
        src_fbo: GLuint,
        dst_texture: GLuint,
        attachment: GLenum,
        mask: GLbitfield,
        width: u32,
        height: u32,
    ) {
        let fbo = self.get_or_create(gl);
        unsafe {
            gl.NamedFramebufferTexture(fbo, attachment, dst_texture, 0);
            gl.BlitNamedFramebuffer(
                src_fbo,
                fbo,
                0,
                0,
                width as GLint,
                height as GLint,
                0,
                0,
                width as GLint,
                height as GLint,
                mask,
                gl::NEAREST,
            );
            gl.NamedFramebufferTexture(fbo, attachment, 0, 0);
        }
    }

    pub(crate) fn destroy(&mut self, gl: &Gl) {
        if let Some(obj) = self.obj.take() {
            unsafe {
                gl.DeleteFramebuffers(1, &obj);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhi::{TextureDescriptor, TextureType};

    // create_framebuffer's validation runs entirely before any GL call is
    // issued, so a loader that only ever hands back null function pointers is
    // fine here: these tests only exercise the rejection paths.
    fn null_gl() -> Gl {
        Gl::load_with(|_| std::ptr::null())
    }

    fn insert_texture(pool: &mut Pool<GlTexture>, format: Format, width: u32, height: u32, sample_count: u32, usage: TextureUsage) -> TextureHandle {
        pool.insert(GlTexture {
            obj: 1,
            target: gl::TEXTURE_2D,
            desc: TextureDescriptor {
                ty: TextureType::Texture2D,
                format,
                width,
                height,
                depth: 1,
                array_layers: 1,
                mip_levels: 1,
                sample_count,
                usage,
            },
        })
    }

    #[test]
    fn attachment_count_must_match_descriptor() {
        let gl = null_gl();
        let mut textures = Pool::new();
        let color = insert_texture(&mut textures, Format::Rgba8Unorm, 64, 64, 1, TextureUsage::RENDER_TARGET);
        let desc = FramebufferDescriptor {
            color_attachment_formats: vec![Format::Rgba8Unorm, Format::Rgba8Unorm],
            depth_stencil_format: None,
            width: 64,
            height: 64,
            sample_count: 1,
        };
        assert!(create_framebuffer(&gl, &desc, &[color], None, &textures).is_none());
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let gl = null_gl();
        let mut textures = Pool::new();
        let color = insert_texture(&mut textures, Format::Rgba8Unorm, 32, 32, 1, TextureUsage::RENDER_TARGET);
        let desc = FramebufferDescriptor {
            color_attachment_formats: vec![Format::Rgba8Unorm],
            depth_stencil_format: None,
            width: 64,
            height: 64,
            sample_count: 1,
        };
        assert!(create_framebuffer(&gl, &desc, &[color], None, &textures).is_none());
    }

    #[test]
    fn single_sample_color_attachment_must_be_render_target() {
        let gl = null_gl();
        let mut textures = Pool::new();
        let color = insert_texture(&mut textures, Format::Rgba8Unorm, 64, 64, 1, TextureUsage::SAMPLED);
        let desc = FramebufferDescriptor {
            color_attachment_formats: vec![Format::Rgba8Unorm],
            depth_stencil_format: None,
            width: 64,
            height: 64,
            sample_count: 1,
        };
        assert!(create_framebuffer(&gl, &desc, &[color], None, &textures).is_none());
    }

    #[test]
    fn multisample_framebuffer_rejects_a_sampled_resolve_target_without_resolve_destination_usage() {
        let gl = null_gl();
        let mut textures = Pool::new();
        let msaa = insert_texture(
            &mut textures,
            Format::Rgba8Unorm,
            64,
            64,
            4,
            TextureUsage::RENDER_TARGET | TextureUsage::RESOLVE_SOURCE,
        );
        let bad_resolve = insert_texture(&mut textures, Format::Rgba8Unorm, 64, 64, 1, TextureUsage::SAMPLED);
        let desc = FramebufferDescriptor {
            color_attachment_formats: vec![Format::Rgba8Unorm, Format::Rgba8Unorm],
            depth_stencil_format: None,
            width: 64,
            height: 64,
            sample_count: 4,
        };
        assert!(create_framebuffer(&gl, &desc, &[msaa, bad_resolve], None, &textures).is_none());
    }

    #[test]
    fn no_attachments_at_all_is_rejected() {
        let gl = null_gl();
        let textures = Pool::new();
        let desc = FramebufferDescriptor {
            color_attachment_formats: vec![],
            depth_stencil_format: None,
            width: 64,
            height: 64,
            sample_count: 1,
        };
        assert!(create_framebuffer(&gl, &desc, &[], None, &textures).is_none());
    }
}
