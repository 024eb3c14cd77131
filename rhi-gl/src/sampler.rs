//! Sampler resource factory.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use rhi::{CompareOp, FilterMode, MipmapMode, SamplerDescriptor, WrapMode};

#[derive(Debug)]
pub(crate) struct GlSampler {
    pub(crate) obj: GLuint,
}

fn min_filter_to_gl(min: FilterMode, mipmap: MipmapMode) -> GLenum {
    match (min, mipmap) {
        (FilterMode::Nearest, MipmapMode::Off) => gl::NEAREST,
        (FilterMode::Nearest, MipmapMode::Nearest) => gl::NEAREST_MIPMAP_NEAREST,
        (FilterMode::Nearest, MipmapMode::Linear) => gl::NEAREST_MIPMAP_LINEAR,
        (FilterMode::Linear, MipmapMode::Off) => gl::LINEAR,
        (FilterMode::Linear, MipmapMode::Nearest) => gl::LINEAR_MIPMAP_NEAREST,
        (FilterMode::Linear, MipmapMode::Linear) => gl::LINEAR_MIPMAP_LINEAR,
    }
}

fn mag_filter_to_gl(mag: FilterMode) -> GLenum {
    match mag {
        FilterMode::Nearest => gl::NEAREST,
        FilterMode::Linear => gl::LINEAR,
    }
}

fn wrap_to_gl(wrap: WrapMode) -> GLenum {
    match wrap {
        WrapMode::Repeat => gl::REPEAT,
        WrapMode::MirroredRepeat => gl::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => gl::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => gl::CLAMP_TO_BORDER,
    }
}

fn compare_to_gl(compare: CompareOp) -> GLenum {
    match compare {
        CompareOp::Off => gl::NEVER,
        CompareOp::Less => gl::LESS,
        CompareOp::Equal => gl::EQUAL,
        CompareOp::LessOrEqual => gl::LEQUAL,
        CompareOp::Greater => gl::GREATER,
        CompareOp::NotEqual => gl::NOTEQUAL,
        CompareOp::GreaterOrEqual => gl::GEQUAL,
        CompareOp::Always => gl::ALWAYS,
    }
}

pub(crate) fn create_sampler(gl: &Gl, desc: &SamplerDescriptor) -> GlSampler {
    let mut obj: GLuint = 0;
    unsafe {
        gl.CreateSamplers(1, &mut obj);
        gl.SamplerParameteri(obj, gl::TEXTURE_MIN_FILTER, min_filter_to_gl(desc.min_filter, desc.mipmap_mode) as GLint);
        gl.SamplerParameteri(obj, gl::TEXTURE_MAG_FILTER, mag_filter_to_gl(desc.mag_filter) as GLint);
        gl.SamplerParameteri(obj, gl::TEXTURE_WRAP_S, wrap_to_gl(desc.wrap_s) as GLint);
        gl.SamplerParameteri(obj, gl::TEXTURE_WRAP_T, wrap_to_gl(desc.wrap_t) as GLint);
        gl.SamplerParameteri(obj, gl::TEXTURE_WRAP_R, wrap_to_gl(desc.wrap_r) as GLint);
        gl.SamplerParameterf(obj, gl::TEXTURE_LOD_BIAS, desc.lod_bias);
        gl.SamplerParameterf(obj, gl::TEXTURE_MIN_LOD, desc.lod_min);
        gl.SamplerParameterf(obj, gl::TEXTURE_MAX_LOD, desc.lod_max);
        if desc.compare == CompareOp::Off {
            gl.SamplerParameteri(obj, gl::TEXTURE_COMPARE_MODE, gl::NONE as GLint);
        } else {
            gl.SamplerParameteri(obj, gl::TEXTURE_COMPARE_MODE, gl::COMPARE_REF_TO_TEXTURE as GLint);
            gl.SamplerParameteri(obj, gl::TEXTURE_COMPARE_FUNC, compare_to_gl(desc.compare) as GLint);
        }
    }
    GlSampler { obj }
}

pub(crate) fn destroy_sampler(gl: &Gl, sampler: GlSampler) {
    unsafe {
        gl.DeleteSamplers(1, &sampler.obj);
    }
}
