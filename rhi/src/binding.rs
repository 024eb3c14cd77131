//! Shader bindings: groupings of texture/sampler and buffer references consumed
//! by a pipeline.

use crate::buffer::BufferHandle;
use crate::handle::Handle;
use crate::image::{SamplerHandle, TextureHandle};

#[derive(Debug)]
pub struct ShaderBindingTag;
pub type ShaderBindingHandle = Handle<ShaderBindingTag>;

#[derive(Copy, Clone, Debug)]
pub struct TextureBinding {
    pub binding_index: u32,
    pub texture: TextureHandle,
    pub sampler: SamplerHandle,
}

#[derive(Copy, Clone, Debug)]
pub struct BufferBinding {
    pub binding_index: u32,
    pub buffer: BufferHandle,
    pub offset: usize,
    /// `0` means "whole buffer".
    pub size: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ShaderBindingDescriptor {
    pub textures: Vec<TextureBinding>,
    pub buffers: Vec<BufferBinding>,
}
