//! Texture resource factory.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use crate::util::ScopedRelease;
use rhi::format::format_info;
use rhi::{TextureDescriptor, TextureType, TextureUsage};

#[derive(Debug)]
pub(crate) struct GlTexture {
    pub(crate) obj: GLuint,
    pub(crate) target: GLenum,
    pub(crate) desc: TextureDescriptor,
}

fn base_target(desc: &TextureDescriptor) -> GLenum {
    match (desc.ty, desc.array_layers > 1, desc.sample_count > 1) {
        (TextureType::Texture2D, false, false) => gl::TEXTURE_2D,
        (TextureType::Texture2D, true, false) => gl::TEXTURE_2D_ARRAY,
        (TextureType::Texture2D, false, true) => gl::TEXTURE_2D_MULTISAMPLE,
        (TextureType::Texture2D, true, true) => gl::TEXTURE_2D_MULTISAMPLE_ARRAY,
        (TextureType::Texture3D, _, _) => gl::TEXTURE_3D,
        (TextureType::TextureCube, false, _) => gl::TEXTURE_CUBE_MAP,
        (TextureType::TextureCube, true, _) => gl::TEXTURE_CUBE_MAP_ARRAY,
    }
}

/// Validates the invariants spec.md §3 states for `Texture`. Returns `false`
/// (already logged) on the first violated invariant.
fn validate(desc: &TextureDescriptor, pixels: Option<&[u8]>) -> bool {
    if desc.width < 1 || desc.height < 1 || desc.depth < 1 || desc.mip_levels < 1 || desc.array_layers < 1 {
        log::error!("create_texture: dimensions, mip_levels and array_layers must all be >= 1");
        return false;
    }
    if desc.ty != TextureType::Texture3D && desc.depth != 1 {
        log::error!("create_texture: depth must be 1 for 2D/cube textures");
        return false;
    }
    if desc.sample_count > 1 {
        // `resolve_source` is deliberately not in this mask: create_framebuffer's
        // multisample-attachment contract requires every attachment sharing the
        // framebuffer's sample count to carry both `render_target` and
        // `resolve_source` (spec.md's §4.2 create_framebuffer contract and §8
        // quantified invariant), and Scenario 1 constructs exactly that texture.
        // `resolve_destination` is excluded here too, but never actually collides:
        // a resolve-destination attachment is single-sampled by the same
        // contract, so it never reaches this `sample_count > 1` branch anyway.
        let forbidden = TextureUsage::SAMPLED | TextureUsage::STORAGE;
        if desc.usage.intersects(forbidden) {
            log::error!("create_texture: multisample textures cannot have sampled/storage usages");
            return false;
        }
        if desc.mip_levels != 1 {
            log::error!("create_texture: multisample textures must have mip_levels == 1");
            return false;
        }
        if pixels.is_some() {
            log::error!("create_texture: multisample textures cannot have an initial pixel upload");
            return false;
        }
    }
    if desc.usage.contains(TextureUsage::RESOLVE_SOURCE) && !desc.usage.contains(TextureUsage::RENDER_TARGET) {
        log::error!("create_texture: resolve_source requires render_target");
        return false;
    }
    if desc.usage.contains(TextureUsage::DEPTH_STENCIL_TARGET) {
        if !format_info(desc.format).is_depth_stencil() {
            log::error!("create_texture: depth_stencil_target requires a depth-stencil format");
            return false;
        }
        if desc.usage.contains(TextureUsage::STORAGE) {
            log::error!("create_texture: depth_stencil_target forbids storage");
            return false;
        }
    }
    if let Some(pixels) = pixels {
        if !desc.usage.contains(TextureUsage::TRANSFER_DESTINATION) {
            log::error!("create_texture: initial pixels require transfer_destination usage");
            return false;
        }
        let _ = pixels;
    }
    true
}

pub(crate) fn create_texture(
    gl: &Gl,
    desc: &TextureDescriptor,
    pixels: Option<&[u8]>,
    stride: u32,
) -> Option<GlTexture> {
    if !validate(desc, pixels) {
        return None;
    }

    let target = base_target(desc);
    let info = format_info(desc.format);

    let mut obj: GLuint = 0;
    unsafe {
        gl.CreateTextures(target, 1, &mut obj);
    }
    if obj == 0 {
        log::error!("create_texture: glCreateTextures returned 0");
        return None;
    }
    let guard = ScopedRelease::new(|| unsafe { gl.DeleteTextures(1, &obj) });

    unsafe {
        match target {
            gl::TEXTURE_2D | gl::TEXTURE_CUBE_MAP => {
                gl.TextureStorage2D(
                    obj,
                    desc.mip_levels as GLsizei,
                    info.internal_format as GLenum,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                );
            }
            gl::TEXTURE_2D_ARRAY | gl::TEXTURE_CUBE_MAP_ARRAY => {
                gl.TextureStorage3D(
                    obj,
                    desc.mip_levels as GLsizei,
                    info.internal_format as GLenum,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    (desc.array_layers * if target == gl::TEXTURE_CUBE_MAP_ARRAY { 6 } else { 1 }) as GLsizei,
                );
            }
            gl::TEXTURE_3D => {
                gl.TextureStorage3D(
                    obj,
                    desc.mip_levels as GLsizei,
                    info.internal_format as GLenum,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    desc.depth as GLsizei,
                );
            }
            gl::TEXTURE_2D_MULTISAMPLE => {
                gl.TextureStorage2DMultisample(
                    obj,
                    desc.sample_count as GLsizei,
                    info.internal_format as GLenum,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    gl::TRUE,
                );
            }
            gl::TEXTURE_2D_MULTISAMPLE_ARRAY => {
                gl.TextureStorage3DMultisample(
                    obj,
                    desc.sample_count as GLsizei,
                    info.internal_format as GLenum,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    desc.array_layers as GLsizei,
                    gl::TRUE,
                );
            }
            _ => unreachable!("create_texture: unhandled GL texture target"),
        }
    }

    if let Some(pixels) = pixels {
        upload_base_level(gl, obj, target, desc, pixels, stride);
        if desc.mip_levels > 1 {
            unsafe {
                gl.GenerateTextureMipmap(obj);
            }
        }
    }

    guard.disarm();
    Some(GlTexture { obj, target, desc: *desc })
}

fn upload_base_level(gl: &Gl, obj: GLuint, target: GLenum, desc: &TextureDescriptor, pixels: &[u8], stride: u32) {
    let info = format_info(desc.format);
    let row_pitch = if stride != 0 {
        stride
    } else {
        desc.width * info.bytes_per_pixel
    };
    unsafe {
        gl.PixelStorei(gl::UNPACK_ROW_LENGTH, (row_pitch / info.bytes_per_pixel) as GLint);
        match target {
            gl::TEXTURE_2D => {
                gl.TextureSubImage2D(
                    obj,
                    0,
                    0,
                    0,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    info.data_format,
                    info.data_type,
                    pixels.as_ptr() as *const GLvoid,
                );
            }
            gl::TEXTURE_3D | gl::TEXTURE_2D_ARRAY => {
                gl.TextureSubImage3D(
                    obj,
                    0,
                    0,
                    0,
                    0,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    desc.depth.max(desc.array_layers) as GLsizei,
                    info.data_format,
                    info.data_type,
                    pixels.as_ptr() as *const GLvoid,
                );
            }
            gl::TEXTURE_CUBE_MAP => {
                gl.TextureSubImage3D(
                    obj,
                    0,
                    0,
                    0,
                    0,
                    desc.width as GLsizei,
                    desc.height as GLsizei,
                    6,
                    info.data_format,
                    info.data_type,
                    pixels.as_ptr() as *const GLvoid,
                );
            }
            _ => unreachable!("upload_base_level: unexpected target for initial upload"),
        }
        gl.PixelStorei(gl::UNPACK_ROW_LENGTH, 0);
    }
}

pub(crate) fn destroy_texture(gl: &Gl, texture: GlTexture) {
    unsafe {
        gl.DeleteTextures(1, &texture.obj);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhi::Format;

    fn base_desc() -> TextureDescriptor {
        TextureDescriptor {
            ty: TextureType::Texture2D,
            format: Format::Rgba8Unorm,
            width: 64,
            height: 64,
            depth: 1,
            array_layers: 1,
            mip_levels: 1,
            sample_count: 1,
            usage: TextureUsage::SAMPLED,
        }
    }

    #[test]
    fn zero_extent_is_rejected() {
        let mut desc = base_desc();
        desc.width = 0;
        assert!(!validate(&desc, None));
    }

    #[test]
    fn non_3d_texture_requires_depth_one() {
        let mut desc = base_desc();
        desc.depth = 2;
        assert!(!validate(&desc, None));
    }

    #[test]
    fn multisample_forbids_sampled_usage() {
        let mut desc = base_desc();
        desc.sample_count = 4;
        desc.usage = TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED;
        assert!(!validate(&desc, None));
    }

    #[test]
    fn multisample_forbids_mip_chain() {
        let mut desc = base_desc();
        desc.sample_count = 4;
        desc.mip_levels = 2;
        desc.usage = TextureUsage::RENDER_TARGET;
        assert!(!validate(&desc, None));
    }

    #[test]
    fn multisample_forbids_initial_pixels() {
        let mut desc = base_desc();
        desc.sample_count = 4;
        desc.usage = TextureUsage::RENDER_TARGET | TextureUsage::TRANSFER_DESTINATION;
        let pixels = [0u8; 4];
        assert!(!validate(&desc, Some(&pixels)));
    }

    #[test]
    fn valid_multisample_render_target_passes() {
        let mut desc = base_desc();
        desc.sample_count = 4;
        desc.usage = TextureUsage::RENDER_TARGET | TextureUsage::RESOLVE_SOURCE;
        assert!(validate(&desc, None));
    }

    #[test]
    fn resolve_source_requires_render_target() {
        let mut desc = base_desc();
        desc.usage = TextureUsage::RESOLVE_SOURCE;
        assert!(!validate(&desc, None));
    }

    #[test]
    fn depth_stencil_target_requires_depth_stencil_format() {
        let mut desc = base_desc();
        desc.usage = TextureUsage::DEPTH_STENCIL_TARGET;
        assert!(!validate(&desc, None));

        desc.format = Format::Depth32Sfloat;
        assert!(validate(&desc, None));
    }

    #[test]
    fn depth_stencil_target_forbids_storage() {
        let mut desc = base_desc();
        desc.format = Format::Depth24Stencil8;
        desc.usage = TextureUsage::DEPTH_STENCIL_TARGET | TextureUsage::STORAGE;
        assert!(!validate(&desc, None));
    }

    #[test]
    fn initial_pixels_require_transfer_destination_usage() {
        let mut desc = base_desc();
        desc.usage = TextureUsage::SAMPLED;
        let pixels = [0u8; 4];
        assert!(!validate(&desc, Some(&pixels)));
    }
}
