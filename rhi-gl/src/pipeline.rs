//! Pipeline (shader program + fixed-function state) resource factory.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use crate::error::{GlError, Result};
use crate::util::ScopedRelease;
use rhi::{ColorBlendAttachmentState, DepthStencilState, MultisampleState, PipelineDescriptor, PrimitiveTopology, RasterizerState, VertexInputBinding};

#[derive(Debug)]
pub(crate) struct GlPipeline {
    pub(crate) program: GLuint,
    pub(crate) vao: GLuint,
    pub(crate) topology: PrimitiveTopology,
    pub(crate) vertex_bindings: Vec<VertexInputBinding>,
    pub(crate) blend_states: Vec<ColorBlendAttachmentState>,
    pub(crate) depth_stencil: DepthStencilState,
    pub(crate) rasterizer: RasterizerState,
    pub(crate) multisample: MultisampleState,
}

pub(crate) fn topology_to_gl(topology: PrimitiveTopology) -> GLenum {
    match topology {
        PrimitiveTopology::TriangleList => gl::TRIANGLES,
        PrimitiveTopology::LineList => gl::LINES,
        PrimitiveTopology::PointList => gl::POINTS,
    }
}

fn compile_shader(gl: &Gl, stage: &'static str, ty: GLenum, source: &str) -> Result<GLuint> {
    let obj = unsafe { gl.CreateShader(ty) };
    if obj == 0 {
        return Err(GlError::ShaderCompile {
            stage,
            log: "glCreateShader returned 0".into(),
        });
    }
    let guard = ScopedRelease::new(|| unsafe { gl.DeleteShader(obj) });

    unsafe {
        let text = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        gl.ShaderSource(obj, 1, &text, &len);
        gl.CompileShader(obj);
    }

    let mut status = gl::FALSE as GLint;
    unsafe {
        gl.GetShaderiv(obj, gl::COMPILE_STATUS, &mut status);
    }
    if status == gl::FALSE as GLint {
        let log = read_info_log(gl, obj, true);
        return Err(GlError::ShaderCompile { stage, log });
    }

    guard.disarm();
    Ok(obj)
}

fn read_info_log(gl: &Gl, obj: GLuint, is_shader: bool) -> String {
    let mut len = 0;
    unsafe {
        if is_shader {
            gl.GetShaderiv(obj, gl::INFO_LOG_LENGTH, &mut len);
        } else {
            gl.GetProgramiv(obj, gl::INFO_LOG_LENGTH, &mut len);
        }
    }
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    unsafe {
        if is_shader {
            gl.GetShaderInfoLog(obj, len, std::ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
        } else {
            gl.GetProgramInfoLog(obj, len, std::ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
        }
    }
    buf.pop();
    String::from_utf8_lossy(&buf).into_owned()
}

fn link_program(gl: &Gl, vertex: GLuint, fragment: GLuint) -> Result<GLuint> {
    let program = unsafe { gl.CreateProgram() };
    if program == 0 {
        return Err(GlError::ProgramLink {
            log: "glCreateProgram returned 0".into(),
        });
    }
    let guard = ScopedRelease::new(|| unsafe { gl.DeleteProgram(program) });

    unsafe {
        gl.AttachShader(program, vertex);
        gl.AttachShader(program, fragment);
        gl.LinkProgram(program);
    }

    let mut status = gl::FALSE as GLint;
    unsafe {
        gl.GetProgramiv(program, gl::LINK_STATUS, &mut status);
    }
    if status == gl::FALSE as GLint {
        let log = read_info_log(gl, program, false);
        return Err(GlError::ProgramLink { log });
    }

    guard.disarm();
    Ok(program)
}

/// Creates one attribute binding per vertex input binding: attribute location
/// `i` is bound to vertex-buffer binding `i`, matching the 1:1 convention the
/// fixed-function state in spec.md §3 assumes (vertex layout reflection is out
/// of scope: shader sources are opaque).
fn create_vao(gl: &Gl, vertex_bindings: &[VertexInputBinding]) -> GLuint {
    let mut vao = 0;
    unsafe {
        gl.CreateVertexArrays(1, &mut vao);
        for (i, _binding) in vertex_bindings.iter().enumerate() {
            let i = i as GLuint;
            gl.EnableVertexArrayAttrib(vao, i);
            gl.VertexArrayAttribFormat(vao, i, 4, gl::FLOAT, gl::FALSE, 0);
            gl.VertexArrayAttribBinding(vao, i, i);
        }
    }
    vao
}

pub(crate) fn create_pipeline(gl: &Gl, desc: &PipelineDescriptor<'_>) -> Option<GlPipeline> {
    let vertex = match compile_shader(gl, "vertex", gl::VERTEX_SHADER, desc.vertex_shader_source) {
        Ok(obj) => obj,
        Err(e) => {
            log::error!("create_pipeline: {}", e);
            return None;
        }
    };
    let vertex_guard = ScopedRelease::new(|| unsafe { gl.DeleteShader(vertex) });

    let fragment = match compile_shader(gl, "fragment", gl::FRAGMENT_SHADER, desc.fragment_shader_source) {
        Ok(obj) => obj,
        Err(e) => {
            log::error!("create_pipeline: {}", e);
            return None;
        }
    };
    let fragment_guard = ScopedRelease::new(|| unsafe { gl.DeleteShader(fragment) });

    let program = match link_program(gl, vertex, fragment) {
        Ok(obj) => obj,
        Err(e) => {
            log::error!("create_pipeline: {}", e);
            return None;
        }
    };
    let program_guard = ScopedRelease::new(|| unsafe { gl.DeleteProgram(program) });

    let vao = create_vao(gl, desc.vertex_bindings);
    let vao_guard = ScopedRelease::new(|| unsafe { gl.DeleteVertexArrays(1, &vao) });

    unsafe {
        gl.DeleteShader(vertex);
        gl.DeleteShader(fragment);
    }
    vertex_guard.disarm();
    fragment_guard.disarm();

    program_guard.disarm();
    vao_guard.disarm();

    Some(GlPipeline {
        program,
        vao,
        topology: desc.topology,
        vertex_bindings: desc.vertex_bindings.to_vec(),
        blend_states: desc.blend_states.to_vec(),
        depth_stencil: desc.depth_stencil,
        rasterizer: desc.rasterizer,
        multisample: desc.multisample,
    })
}

pub(crate) fn destroy_pipeline(gl: &Gl, pipeline: GlPipeline) {
    unsafe {
        gl.DeleteProgram(pipeline.program);
        gl.DeleteVertexArrays(1, &pipeline.vao);
    }
}
