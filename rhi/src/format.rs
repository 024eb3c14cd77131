//! The format catalog: a total function from abstract pixel format to the
//! driver-level description the GL backend needs (internal format, data format,
//! data type, byte size) plus the color/depth/stencil classification every
//! attachment and copy-validation path switches on.

/// Abstract pixel / vertex-attribute format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Format {
    R8Unorm,
    R16Unorm,
    Rg8Unorm,
    Rg16Unorm,
    Rgb8Unorm,
    Rgb16Unorm,
    Rgba8Unorm,
    Rgba16Unorm,

    R8Snorm,
    R16Snorm,
    Rg8Snorm,
    Rg16Snorm,
    Rgb8Snorm,
    Rgb16Snorm,
    Rgba8Snorm,
    Rgba16Snorm,

    R8Uint,
    R16Uint,
    R32Uint,
    Rg8Uint,
    Rg16Uint,
    Rg32Uint,
    Rgb8Uint,
    Rgb16Uint,
    Rgb32Uint,
    Rgba8Uint,
    Rgba16Uint,
    Rgba32Uint,

    R8Sint,
    R16Sint,
    R32Sint,
    Rg8Sint,
    Rg16Sint,
    Rg32Sint,
    Rgb8Sint,
    Rgb16Sint,
    Rgb32Sint,
    Rgba8Sint,
    Rgba16Sint,
    Rgba32Sint,

    R16Sfloat,
    R32Sfloat,
    Rg16Sfloat,
    Rg32Sfloat,
    Rgb16Sfloat,
    Rgb32Sfloat,
    Rgba16Sfloat,
    Rgba32Sfloat,

    Depth16,
    Depth24,
    Depth32Sfloat,
    Stencil8,
    Depth24Stencil8,
    Depth32SfloatStencil8,
}

/// Which attachment slot a depth/stencil format is legal for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DepthStencilClass {
    Depth,
    Stencil,
    DepthStencil,
}

/// Driver-facing description of a [`Format`]: enough to create a texture, to
/// validate a copy region, and to classify an attachment.
#[derive(Copy, Clone, Debug)]
pub struct FormatInfo {
    pub internal_format: u32,
    pub data_format: u32,
    pub data_type: u32,
    pub bytes_per_pixel: u32,
    pub is_color: bool,
    pub depth_stencil_class: Option<DepthStencilClass>,
}

impl FormatInfo {
    pub fn is_depth_stencil(&self) -> bool {
        self.depth_stencil_class.is_some()
    }
}

/// Looks up the driver-facing description of `format`. Total over every
/// variant of [`Format`]; an unmatched format is a programmer error (adding a
/// `Format` variant without extending this table).
pub fn format_info(format: Format) -> FormatInfo {
    use gl_constants as gl;
    use Format::*;

    let (internal_format, data_format, data_type, bytes_per_pixel) = match format {
        R8Unorm => (gl::R8, gl::RED, gl::UNSIGNED_BYTE, 1),
        R16Unorm => (gl::R16, gl::RED, gl::UNSIGNED_SHORT, 2),
        Rg8Unorm => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE, 2),
        Rg16Unorm => (gl::RG16, gl::RG, gl::UNSIGNED_SHORT, 4),
        Rgb8Unorm => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE, 3),
        Rgb16Unorm => (gl::RGB16, gl::RGB, gl::UNSIGNED_SHORT, 6),
        Rgba8Unorm => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, 4),
        Rgba16Unorm => (gl::RGBA16, gl::RGBA, gl::UNSIGNED_SHORT, 8),

        R8Snorm => (gl::R8_SNORM, gl::RED, gl::BYTE, 1),
        R16Snorm => (gl::R16_SNORM, gl::RED, gl::SHORT, 2),
        Rg8Snorm => (gl::RG8_SNORM, gl::RG, gl::BYTE, 2),
        Rg16Snorm => (gl::RG16_SNORM, gl::RG, gl::SHORT, 4),
        Rgb8Snorm => (gl::RGB8_SNORM, gl::RGB, gl::BYTE, 3),
        Rgb16Snorm => (gl::RGB16_SNORM, gl::RGB, gl::SHORT, 6),
        Rgba8Snorm => (gl::RGBA8_SNORM, gl::RGBA, gl::BYTE, 4),
        Rgba16Snorm => (gl::RGBA16_SNORM, gl::RGBA, gl::SHORT, 8),

        R8Uint => (gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE, 1),
        R16Uint => (gl::R16UI, gl::RED_INTEGER, gl::UNSIGNED_SHORT, 2),
        R32Uint => (gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT, 4),
        Rg8Uint => (gl::RG8UI, gl::RG_INTEGER, gl::UNSIGNED_BYTE, 2),
        Rg16Uint => (gl::RG16UI, gl::RG_INTEGER, gl::UNSIGNED_SHORT, 4),
        Rg32Uint => (gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT, 8),
        Rgb8Uint => (gl::RGB8UI, gl::RGB_INTEGER, gl::UNSIGNED_BYTE, 3),
        Rgb16Uint => (gl::RGB16UI, gl::RGB_INTEGER, gl::UNSIGNED_SHORT, 6),
        Rgb32Uint => (gl::RGB32UI, gl::RGB_INTEGER, gl::UNSIGNED_INT, 12),
        Rgba8Uint => (gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE, 4),
        Rgba16Uint => (gl::RGBA16UI, gl::RGBA_INTEGER, gl::UNSIGNED_SHORT, 8),
        Rgba32Uint => (gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT, 16),

        R8Sint => (gl::R8I, gl::RED_INTEGER, gl::BYTE, 1),
        R16Sint => (gl::R16I, gl::RED_INTEGER, gl::SHORT, 2),
        R32Sint => (gl::R32I, gl::RED_INTEGER, gl::INT, 4),
        Rg8Sint => (gl::RG8I, gl::RG_INTEGER, gl::BYTE, 2),
        Rg16Sint => (gl::RG16I, gl::RG_INTEGER, gl::SHORT, 4),
        Rg32Sint => (gl::RG32I, gl::RG_INTEGER, gl::INT, 8),
        Rgb8Sint => (gl::RGB8I, gl::RGB_INTEGER, gl::BYTE, 3),
        Rgb16Sint => (gl::RGB16I, gl::RGB_INTEGER, gl::SHORT, 6),
        Rgb32Sint => (gl::RGB32I, gl::RGB_INTEGER, gl::INT, 12),
        Rgba8Sint => (gl::RGBA8I, gl::RGBA_INTEGER, gl::BYTE, 4),
        Rgba16Sint => (gl::RGBA16I, gl::RGBA_INTEGER, gl::SHORT, 8),
        Rgba32Sint => (gl::RGBA32I, gl::RGBA_INTEGER, gl::INT, 16),

        R16Sfloat => (gl::R16F, gl::RED, gl::HALF_FLOAT, 2),
        R32Sfloat => (gl::R32F, gl::RED, gl::FLOAT, 4),
        Rg16Sfloat => (gl::RG16F, gl::RG, gl::HALF_FLOAT, 4),
        Rg32Sfloat => (gl::RG32F, gl::RG, gl::FLOAT, 8),
        Rgb16Sfloat => (gl::RGB16F, gl::RGB, gl::HALF_FLOAT, 6),
        Rgb32Sfloat => (gl::RGB32F, gl::RGB, gl::FLOAT, 12),
        Rgba16Sfloat => (gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT, 8),
        Rgba32Sfloat => (gl::RGBA32F, gl::RGBA, gl::FLOAT, 16),

        Depth16 => (gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT, 2),
        Depth24 => (gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT, 4),
        Depth32Sfloat => (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT, 4),
        Stencil8 => (gl::STENCIL_INDEX8, gl::STENCIL_INDEX, gl::UNSIGNED_BYTE, 1),
        Depth24Stencil8 => (gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8, 4),
        Depth32SfloatStencil8 => (
            gl::DEPTH32F_STENCIL8,
            gl::DEPTH_STENCIL,
            gl::FLOAT_32_UNSIGNED_INT_24_8_REV,
            5,
        ),
    };

    let depth_stencil_class = match format {
        Depth16 | Depth24 | Depth32Sfloat => Some(DepthStencilClass::Depth),
        Stencil8 => Some(DepthStencilClass::Stencil),
        Depth24Stencil8 | Depth32SfloatStencil8 => Some(DepthStencilClass::DepthStencil),
        _ => None,
    };

    FormatInfo {
        internal_format,
        data_format,
        data_type,
        bytes_per_pixel,
        is_color: depth_stencil_class.is_none(),
        depth_stencil_class,
    }
}

/// GL enum values needed by the format table, duplicated here so `rhi` does not
/// depend on the `gl` bindings crate that only `rhi-gl` links against. Values
/// are from the OpenGL 4.5 core registry and must stay in sync with `rhi-gl`'s
/// generated bindings by hand.
mod gl_constants {
    pub const RED: u32 = 0x1903;
    pub const RG: u32 = 0x8227;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const RED_INTEGER: u32 = 0x8D94;
    pub const RG_INTEGER: u32 = 0x8228;
    pub const RGB_INTEGER: u32 = 0x8D98;
    pub const RGBA_INTEGER: u32 = 0x8D99;
    pub const DEPTH_COMPONENT: u32 = 0x1902;
    pub const STENCIL_INDEX: u32 = 0x1901;
    pub const DEPTH_STENCIL: u32 = 0x84F9;

    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const BYTE: u32 = 0x1400;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const SHORT: u32 = 0x1402;
    pub const UNSIGNED_INT: u32 = 0x1405;
    pub const INT: u32 = 0x1404;
    pub const HALF_FLOAT: u32 = 0x140B;
    pub const FLOAT: u32 = 0x1406;
    pub const UNSIGNED_INT_24_8: u32 = 0x84FA;
    pub const FLOAT_32_UNSIGNED_INT_24_8_REV: u32 = 0x8DAD;

    pub const R8: u32 = 0x8229;
    pub const R16: u32 = 0x822A;
    pub const RG8: u32 = 0x822B;
    pub const RG16: u32 = 0x822C;
    pub const RGB8: u32 = 0x8051;
    pub const RGB16: u32 = 0x8054;
    pub const RGBA8: u32 = 0x8058;
    pub const RGBA16: u32 = 0x805B;

    pub const R8_SNORM: u32 = 0x8F94;
    pub const R16_SNORM: u32 = 0x8F98;
    pub const RG8_SNORM: u32 = 0x8F95;
    pub const RG16_SNORM: u32 = 0x8F99;
    pub const RGB8_SNORM: u32 = 0x8F96;
    pub const RGB16_SNORM: u32 = 0x8F9A;
    pub const RGBA8_SNORM: u32 = 0x8F97;
    pub const RGBA16_SNORM: u32 = 0x8F9B;

    pub const R8UI: u32 = 0x8232;
    pub const R16UI: u32 = 0x8234;
    pub const R32UI: u32 = 0x8236;
    pub const RG8UI: u32 = 0x8238;
    pub const RG16UI: u32 = 0x823A;
    pub const RG32UI: u32 = 0x823C;
    pub const RGB8UI: u32 = 0x8D7D;
    pub const RGB16UI: u32 = 0x8D77;
    pub const RGB32UI: u32 = 0x8D71;
    pub const RGBA8UI: u32 = 0x8D7C;
    pub const RGBA16UI: u32 = 0x8D76;
    pub const RGBA32UI: u32 = 0x8D70;

    pub const R8I: u32 = 0x8231;
    pub const R16I: u32 = 0x8233;
    pub const R32I: u32 = 0x8235;
    pub const RG8I: u32 = 0x8237;
    pub const RG16I: u32 = 0x8239;
    pub const RG32I: u32 = 0x823B;
    pub const RGB8I: u32 = 0x8D8F;
    pub const RGB16I: u32 = 0x8D89;
    pub const RGB32I: u32 = 0x8D83;
    pub const RGBA8I: u32 = 0x8D8E;
    pub const RGBA16I: u32 = 0x8D88;
    pub const RGBA32I: u32 = 0x8D82;

    pub const R16F: u32 = 0x822D;
    pub const R32F: u32 = 0x822E;
    pub const RG16F: u32 = 0x822F;
    pub const RG32F: u32 = 0x8230;
    pub const RGB16F: u32 = 0x881B;
    pub const RGB32F: u32 = 0x8815;
    pub const RGBA16F: u32 = 0x881A;
    pub const RGBA32F: u32 = 0x8814;

    pub const DEPTH_COMPONENT16: u32 = 0x81A5;
    pub const DEPTH_COMPONENT24: u32 = 0x81A6;
    pub const DEPTH_COMPONENT32F: u32 = 0x8CAC;
    pub const STENCIL_INDEX8: u32 = 0x8D48;
    pub const DEPTH24_STENCIL8: u32 = 0x88F0;
    pub const DEPTH32F_STENCIL8: u32 = 0x8CAD;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_formats_report_no_depth_stencil_class() {
        let info = format_info(Format::Rgba8Unorm);
        assert!(info.is_color);
        assert!(!info.is_depth_stencil());
    }

    #[test]
    fn packed_depth_stencil_is_classified_as_depth_stencil() {
        let info = format_info(Format::Depth24Stencil8);
        assert!(!info.is_color);
        assert_eq!(info.depth_stencil_class, Some(DepthStencilClass::DepthStencil));
        assert_eq!(info.bytes_per_pixel, 4);
    }

    #[test]
    fn stencil_only_is_classified_as_stencil() {
        let info = format_info(Format::Stencil8);
        assert_eq!(info.depth_stencil_class, Some(DepthStencilClass::Stencil));
    }
}
