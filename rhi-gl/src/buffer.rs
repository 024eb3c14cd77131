//! Buffer resource factory.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;
use crate::util::ScopedRelease;
use rhi::{BufferAccess, BufferDescriptor};

#[derive(Debug)]
pub(crate) struct GlBuffer {
    pub(crate) obj: GLuint,
    pub(crate) desc: BufferDescriptor,
}

fn storage_flags(access: BufferAccess) -> GLbitfield {
    match access {
        BufferAccess::GpuOnly => 0,
        BufferAccess::CpuToGpu => gl::DYNAMIC_STORAGE_BIT | gl::MAP_WRITE_BIT,
        BufferAccess::GpuToCpu => gl::MAP_READ_BIT,
    }
}

/// Validates `desc` and `initial_bytes` per spec.md §4.2's `create_buffer`
/// contract, then allocates backend storage. Returns `None` on any validation
/// failure (already logged).
pub(crate) fn create_buffer(gl: &Gl, desc: &BufferDescriptor, initial_bytes: Option<&[u8]>) -> Option<GlBuffer> {
    if desc.size == 0 {
        log::error!("create_buffer: size must be > 0");
        return None;
    }
    if let Some(bytes) = initial_bytes {
        if bytes.is_empty() || bytes.len() > desc.size {
            log::error!(
                "create_buffer: initial_bytes length {} out of range for size {}",
                bytes.len(),
                desc.size
            );
            return None;
        }
    }

    let mut obj: GLuint = 0;
    unsafe {
        gl.CreateBuffers(1, &mut obj);
    }
    if obj == 0 {
        log::error!("create_buffer: glCreateBuffers returned 0");
        return None;
    }

    let guard = ScopedRelease::new(|| unsafe { gl.DeleteBuffers(1, &obj) });

    unsafe {
        gl.NamedBufferStorage(
            obj,
            desc.size as isize,
            initial_bytes.map_or(std::ptr::null(), |b| b.as_ptr() as *const GLvoid),
            storage_flags(desc.access),
        );
    }

    guard.disarm();
    Some(GlBuffer { obj, desc: *desc })
}

pub(crate) fn destroy_buffer(gl: &Gl, buffer: GlBuffer) {
    unsafe {
        gl.DeleteBuffers(1, &buffer.obj);
    }
}
