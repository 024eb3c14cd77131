//! Shadow of the driver's global state machine (spec.md §9: "Global driver
//! state → explicit state object"). Every apply-site goes through here so a
//! redundant transition (rebinding the program or VAO that is already bound)
//! is skipped instead of issued to the driver.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use rhi::{BlendFactor, BlendOp, CompareFunc, CullMode, FrontFace, PolygonMode, StencilOp};

trait CacheOptionExt<T: Eq> {
    fn update_cached<F: FnOnce()>(&mut self, new: T, f: F);
}

impl<T: Eq> CacheOptionExt<T> for Option<T> {
    fn update_cached<F: FnOnce()>(&mut self, new: T, f: F) {
        if self.as_ref().map_or(true, |v| *v != new) {
            self.replace(new);
            f();
        }
    }
}

pub(crate) fn compare_func_to_gl(f: CompareFunc) -> GLenum {
    match f {
        CompareFunc::Never => gl::NEVER,
        CompareFunc::Less => gl::LESS,
        CompareFunc::Equal => gl::EQUAL,
        CompareFunc::LessOrEqual => gl::LEQUAL,
        CompareFunc::Greater => gl::GREATER,
        CompareFunc::NotEqual => gl::NOTEQUAL,
        CompareFunc::GreaterOrEqual => gl::GEQUAL,
        CompareFunc::Always => gl::ALWAYS,
    }
}

fn cull_mode_to_gl(mode: CullMode) -> Option<GLenum> {
    if mode == CullMode::NONE {
        None
    } else if mode.contains(CullMode::FRONT_AND_BACK) {
        Some(gl::FRONT_AND_BACK)
    } else if mode.contains(CullMode::FRONT) {
        Some(gl::FRONT)
    } else {
        Some(gl::BACK)
    }
}

fn front_face_to_gl(face: FrontFace) -> GLenum {
    match face {
        FrontFace::Clockwise => gl::CW,
        FrontFace::CounterClockwise => gl::CCW,
    }
}

fn polygon_mode_to_gl(mode: PolygonMode) -> GLenum {
    match mode {
        PolygonMode::Fill => gl::FILL,
        PolygonMode::Line => gl::LINE,
        PolygonMode::Point => gl::POINT,
    }
}

pub(crate) fn blend_factor_to_gl(f: BlendFactor) -> GLenum {
    match f {
        BlendFactor::Zero => gl::ZERO,
        BlendFactor::One => gl::ONE,
        BlendFactor::SrcColor => gl::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => gl::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => gl::DST_COLOR,
        BlendFactor::OneMinusDstColor => gl::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => gl::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => gl::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => gl::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => gl::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => gl::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => gl::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
    }
}

pub(crate) fn blend_op_to_gl(op: BlendOp) -> GLenum {
    match op {
        BlendOp::Add => gl::FUNC_ADD,
        BlendOp::Subtract => gl::FUNC_SUBTRACT,
        BlendOp::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => gl::MIN,
        BlendOp::Max => gl::MAX,
    }
}

pub(crate) fn stencil_op_to_gl(op: StencilOp) -> GLenum {
    match op {
        StencilOp::Keep => gl::KEEP,
        StencilOp::Zero => gl::ZERO,
        StencilOp::Replace => gl::REPLACE,
        StencilOp::IncrementAndClamp => gl::INCR,
        StencilOp::DecrementAndClamp => gl::DECR,
        StencilOp::Invert => gl::INVERT,
        StencilOp::IncrementAndWrap => gl::INCR_WRAP,
        StencilOp::DecrementAndWrap => gl::DECR_WRAP,
    }
}

#[derive(Default)]
pub(crate) struct StateCache {
    program: Option<GLuint>,
    vertex_array: Option<GLuint>,
    framebuffer: Option<GLuint>,

    cull_face: Option<Option<GLenum>>,
    front_face: Option<GLenum>,
    polygon_mode: Option<GLenum>,
    scissor_enable: Option<bool>,

    depth_test_enabled: Option<bool>,
    depth_write_enabled: Option<bool>,
    depth_func: Option<GLenum>,
    stencil_test_enabled: Option<bool>,
}

impl StateCache {
    pub(crate) fn new() -> StateCache {
        StateCache::default()
    }

    pub(crate) fn bind_program(&mut self, gl: &Gl, program: GLuint) {
        self.program.update_cached(program, || unsafe {
            gl.UseProgram(program);
        });
    }

    pub(crate) fn bind_vertex_array(&mut self, gl: &Gl, vao: GLuint) {
        self.vertex_array.update_cached(vao, || unsafe {
            gl.BindVertexArray(vao);
        });
    }

    pub(crate) fn bind_framebuffer(&mut self, gl: &Gl, target: GLenum, fbo: GLuint) {
        self.framebuffer.update_cached(fbo, || unsafe {
            gl.BindFramebuffer(target, fbo);
        });
    }

    pub(crate) fn set_cull_mode(&mut self, gl: &Gl, mode: CullMode) {
        let face = cull_mode_to_gl(mode);
        self.cull_face.update_cached(face, || unsafe {
            match face {
                Some(f) => {
                    gl.Enable(gl::CULL_FACE);
                    gl.CullFace(f);
                }
                None => gl.Disable(gl::CULL_FACE),
            }
        });
    }

    pub(crate) fn set_front_face(&mut self, gl: &Gl, front_face: FrontFace) {
        let f = front_face_to_gl(front_face);
        self.front_face.update_cached(f, || unsafe {
            gl.FrontFace(f);
        });
    }

    pub(crate) fn set_polygon_mode(&mut self, gl: &Gl, mode: PolygonMode) {
        let m = polygon_mode_to_gl(mode);
        self.polygon_mode.update_cached(m, || unsafe {
            gl.PolygonMode(gl::FRONT_AND_BACK, m);
        });
    }

    pub(crate) fn set_scissor_enable(&mut self, gl: &Gl, enable: bool) {
        self.scissor_enable.update_cached(enable, || unsafe {
            if enable {
                gl.Enable(gl::SCISSOR_TEST);
            } else {
                gl.Disable(gl::SCISSOR_TEST);
            }
        });
    }

    pub(crate) fn set_depth_test_enable(&mut self, gl: &Gl, enable: bool) {
        self.depth_test_enabled.update_cached(enable, || unsafe {
            if enable {
                gl.Enable(gl::DEPTH_TEST);
            } else {
                gl.Disable(gl::DEPTH_TEST);
            }
        });
    }

    pub(crate) fn set_depth_write_enable(&mut self, gl: &Gl, enable: bool) {
        self.depth_write_enabled.update_cached(enable, || unsafe {
            gl.DepthMask(if enable { gl::TRUE } else { gl::FALSE });
        });
    }

    pub(crate) fn set_depth_func(&mut self, gl: &Gl, func: CompareFunc) {
        let f = compare_func_to_gl(func);
        self.depth_func.update_cached(f, || unsafe {
            gl.DepthFunc(f);
        });
    }

    pub(crate) fn set_stencil_test_enable(&mut self, gl: &Gl, enable: bool) {
        self.stencil_test_enabled.update_cached(enable, || unsafe {
            if enable {
                gl.Enable(gl::STENCIL_TEST);
            } else {
                gl.Disable(gl::STENCIL_TEST);
            }
        });
    }

    /// Invalidates the program/VAO shadow without touching the driver. Used
    /// when a validation failure unbinds state directly (spec.md §8 scenario
    /// 6: a failed `bind_pipeline` must not leave a stale shadow entry).
    pub(crate) fn invalidate_pipeline_state(&mut self) {
        self.program = None;
        self.vertex_array = None;
    }
}
