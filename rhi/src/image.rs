//! Texture and sampler descriptors.

use crate::format::Format;
use crate::handle::Handle;
use bitflags::bitflags;

#[derive(Debug)]
pub struct TextureTag;
pub type TextureHandle = Handle<TextureTag>;

#[derive(Debug)]
pub struct SamplerTag;
pub type SamplerHandle = Handle<SamplerTag>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TextureType {
    Texture2D,
    Texture3D,
    TextureCube,
}

bitflags! {
    pub struct TextureUsage: u32 {
        const SAMPLED = 1 << 0;
        const STORAGE = 1 << 1;
        const RENDER_TARGET = 1 << 2;
        const DEPTH_STENCIL_TARGET = 1 << 3;
        const TRANSFER_SOURCE = 1 << 4;
        const TRANSFER_DESTINATION = 1 << 5;
        const RESOLVE_SOURCE = 1 << 6;
        const RESOLVE_DESTINATION = 1 << 7;
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TextureDescriptor {
    pub ty: TextureType,
    pub format: Format,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub array_layers: u32,
    pub mip_levels: u32,
    pub sample_count: u32,
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Width/height/depth of mip level `level`, clamped to at least 1 texel.
    pub fn mip_extent(&self, level: u32) -> (u32, u32, u32) {
        let shift = |extent: u32| (extent >> level).max(1);
        let (w, h) = (shift(self.width), shift(self.height));
        let d = if self.ty == TextureType::Texture3D {
            shift(self.depth)
        } else {
            1
        };
        (w, h, d)
    }
}

// -------------------------------------------------------------------------------------------------
// Samplers

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MipmapMode {
    Off,
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Off,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Copy, Clone, Debug)]
pub struct SamplerDescriptor {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub mipmap_mode: MipmapMode,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
    pub lod_bias: f32,
    pub lod_min: f32,
    pub lod_max: f32,
    pub compare: CompareOp,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        SamplerDescriptor {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mipmap_mode: MipmapMode::Off,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            lod_bias: 0.0,
            lod_min: -1000.0,
            lod_max: 1000.0,
            compare: CompareOp::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_extent_halves_and_clamps_to_one() {
        let desc = TextureDescriptor {
            ty: TextureType::Texture2D,
            format: Format::Rgba8Unorm,
            width: 64,
            height: 64,
            depth: 1,
            array_layers: 1,
            mip_levels: 7,
            sample_count: 1,
            usage: TextureUsage::SAMPLED,
        };
        assert_eq!(desc.mip_extent(0), (64, 64, 1));
        assert_eq!(desc.mip_extent(6), (1, 1, 1));
        assert_eq!(desc.mip_extent(10), (1, 1, 1));
    }
}
