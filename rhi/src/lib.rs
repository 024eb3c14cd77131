//! RHI manifesto:
//! * Vulkan-shaped: explicit pipelines, render passes, framebuffers and
//!   shader bindings instead of a global state machine.
//! * Single-threaded, single-queue, immediate execution: no command-buffer
//!   replay, no cross-thread recording.
//! * Every resource is a handle into a device-owned pool; the device is the
//!   sole owner and the only thing that can destroy a resource.
//! * Failures never propagate as exceptions or `Result`s across this
//!   boundary: a failed create returns the null handle, a failed queue
//!   command is dropped. Both are logged. See [`error`].
//!
//! This crate is backend-agnostic: it declares the resource model and the
//! `Device`/`CommandQueue` contracts. `rhi-gl` is the only implementation
//! today, targeting a single OpenGL 4.5 core context.

pub mod binding;
pub mod buffer;
pub mod command;
pub mod device;
pub mod error;
pub mod fence;
pub mod format;
pub mod framebuffer;
pub mod handle;
pub mod image;
pub mod pipeline;
pub mod renderpass;
pub mod swapchain;

pub use binding::*;
pub use buffer::*;
pub use command::*;
pub use device::*;
pub use fence::*;
pub use format::*;
pub use framebuffer::*;
pub use handle::{Handle, Pool};
pub use image::*;
pub use pipeline::*;
pub use renderpass::*;
pub use swapchain::Swapchain;
