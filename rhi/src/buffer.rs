//! Buffer descriptors.

use crate::handle::Handle;

/// Opaque marker type for [`Handle<BufferTag>`].
#[derive(Debug)]
pub struct BufferTag;
pub type BufferHandle = Handle<BufferTag>;

/// What a buffer may be bound as.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
    Storage,
    /// Dedicated to CPU<->GPU transfers.
    Stage,
}

/// Which direction data may move for a buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BufferAccess {
    GpuOnly,
    CpuToGpu,
    GpuToCpu,
}

#[derive(Copy, Clone, Debug)]
pub struct BufferDescriptor {
    pub usage: BufferUsage,
    pub access: BufferAccess,
    pub size: usize,
}
