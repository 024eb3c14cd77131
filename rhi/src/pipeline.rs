//! Pipeline descriptors: vertex input layout, blend/depth-stencil/rasterizer/
//! multisample fixed-function state, and the pipeline itself.

use crate::handle::Handle;
use ordered_float::NotNan;

#[derive(Debug)]
pub struct PipelineTag;
pub type PipelineHandle = Handle<PipelineTag>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
}

/// One vertex input binding: a buffer slot and the byte stride between elements.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexInputBinding {
    pub stride: u32,
}

// -------------------------------------------------------------------------------------------------
// Blend state

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags::bitflags! {
    pub struct ColorWriteMask: u32 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const ALL = Self::R.bits | Self::G.bits | Self::B.bits | Self::A.bits;
    }
}

/// Blend state for a single color attachment.
#[derive(Copy, Clone, Debug)]
pub struct ColorBlendAttachmentState {
    pub enabled: bool,
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub write_mask: ColorWriteMask,
}

impl Default for ColorBlendAttachmentState {
    fn default() -> Self {
        ColorBlendAttachmentState {
            enabled: false,
            src_color_blend_factor: BlendFactor::One,
            dst_color_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            write_mask: ColorWriteMask::ALL,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Depth-stencil state

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StencilOpState {
    pub compare: CompareFunc,
    pub reference: u32,
    pub read_mask: u32,
    pub write_mask: u32,
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
}

impl Default for StencilOpState {
    fn default() -> Self {
        StencilOpState {
            compare: CompareFunc::Always,
            reference: 0,
            read_mask: 0xff,
            write_mask: 0xff,
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare: CompareFunc,
    pub stencil_test_enable: bool,
    pub stencil_front: StencilOpState,
    pub stencil_back: StencilOpState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        DepthStencilState {
            depth_test_enable: false,
            depth_write_enable: true,
            depth_compare: CompareFunc::Less,
            stencil_test_enable: false,
            stencil_front: StencilOpState::default(),
            stencil_back: StencilOpState::default(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Rasterizer state

bitflags::bitflags! {
    pub struct CullMode: u32 {
        const NONE = 0;
        const FRONT = 1 << 0;
        const BACK = 1 << 1;
        const FRONT_AND_BACK = Self::FRONT.bits | Self::BACK.bits;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

#[derive(Copy, Clone, Debug)]
pub struct PolygonOffset {
    pub factor: NotNan<f32>,
    pub units: NotNan<f32>,
}

#[derive(Copy, Clone, Debug)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub polygon_mode: PolygonMode,
    pub depth_clamp_enable: bool,
    pub depth_clamp_near: NotNan<f32>,
    pub depth_clamp_far: NotNan<f32>,
    pub polygon_offset: Option<PolygonOffset>,
    pub scissor_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        RasterizerState {
            cull_mode: CullMode::NONE,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            depth_clamp_enable: false,
            depth_clamp_near: NotNan::new(0.0).unwrap(),
            depth_clamp_far: NotNan::new(1.0).unwrap(),
            polygon_offset: None,
            scissor_enable: false,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Multisample state

#[derive(Copy, Clone, Debug, Default)]
pub struct MultisampleState {
    pub sample_shading_enable: bool,
    pub min_sample_shading: f32,
}

// -------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Scissor {
    Disabled,
    Rect { x: i32, y: i32, width: u32, height: u32 },
}

/// Descriptor passed to `create_pipeline`. Shader sources are opaque strings:
/// compilation/linking is the GL backend's job, never this crate's.
#[derive(Clone, Debug)]
pub struct PipelineDescriptor<'a> {
    pub topology: PrimitiveTopology,
    pub vertex_shader_source: &'a str,
    pub fragment_shader_source: &'a str,
    pub vertex_bindings: &'a [VertexInputBinding],
    pub blend_states: &'a [ColorBlendAttachmentState],
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub multisample: MultisampleState,
}
