//! Fences: GPU-side sync points.
//!
//! `wait_for_fence` is a purely server-side wait (`glWaitSync`): it enqueues a
//! wait into the GL command stream and returns immediately, never blocking the
//! calling thread. There is deliberately no client-wait (`glClientWaitSync`)
//! path here — spec.md §4.4.9 rules out a CPU-blocking wait primitive.

use crate::api as gl;
use crate::api::types::*;
use crate::api::Gl;

#[derive(Debug, Default)]
pub(crate) struct GlFence {
    sync: Option<GLsync>,
}

unsafe impl Send for GlFence {}

pub(crate) fn create_fence() -> GlFence {
    GlFence::default()
}

pub(crate) fn destroy_fence(gl: &Gl, fence: GlFence) {
    if let Some(sync) = fence.sync {
        unsafe {
            gl.DeleteSync(sync);
        }
    }
}

/// Inserts a new sync point into the command stream, replacing (and deleting)
/// whatever sync object this fence previously held.
pub(crate) fn signal(gl: &Gl, fence: &mut GlFence) {
    if let Some(old) = fence.sync.take() {
        unsafe {
            gl.DeleteSync(old);
        }
    }
    let sync = unsafe { gl.FenceSync(gl::SYNC_GPU_COMMANDS_COMPLETE, 0) };
    fence.sync = Some(sync);
}

/// Enqueues a server-side wait: subsequent commands on this context's command
/// stream will not execute until `fence`'s sync point is reached, but the CPU
/// is never blocked. A fence that has never been signaled has nothing to wait
/// on; the call is dropped and logged, matching spec.md §9's error policy.
pub(crate) fn wait(gl: &Gl, fence: &GlFence) {
    match fence.sync {
        Some(sync) => unsafe {
            gl.WaitSync(sync, 0, gl::TIMEOUT_IGNORED);
        },
        None => log::error!("wait_for_fence: fence has never been signaled"),
    }
}
