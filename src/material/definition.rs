//! Material and pass definition records
//!
//! A definition record is a named, inheritable bundle of shader stage
//! references, render state, and texture bindings. Every field except the
//! name is optional: a field is either set explicitly in the JSON that
//! produced the record, filled in from the nearest ancestor that sets it,
//! or left unset.

use serde::{Deserialize, Serialize};

/// A single material or pass definition
///
/// Parsed from one JSON object. The `name` and `parent_name` come from the
/// object's key (`"Child:Parent"`), not from the object body, so they are
/// skipped during deserialization and filled in by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDefinition {
    /// Unique name of this definition within its definition set
    #[serde(skip)]
    pub name: String,
    /// Name of the definition this one inherits from, if any
    ///
    /// This is a name-based lookup, never a direct reference: the parent may
    /// be defined later in the document or not at all.
    #[serde(skip)]
    pub parent_name: Option<String>,

    pub states: Option<Vec<StateFlag>>,
    pub defines: Option<Vec<String>>,
    pub sampler_states: Option<Vec<SamplerState>>,

    pub depth_bias: Option<f32>,
    pub slope_scaled_depth_bias: Option<f32>,

    pub vertex_shader: Option<String>,
    pub fragment_shader: Option<String>,
    pub geometry_shader: Option<String>,
    pub tessellation_evaluation_shader: Option<String>,
    pub tessellation_control_shader: Option<String>,

    pub vertex_fields: Option<Vec<VertexFieldDecl>>,

    pub front_face: Option<StencilOpState>,
    pub back_face: Option<StencilOpState>,
    pub stencil_ref: Option<u32>,
    pub stencil_read_mask: Option<u32>,
    pub stencil_write_mask: Option<u32>,

    pub msaa_support: Option<MsaaSupport>,
    pub primitive_mode: Option<PrimitiveTopology>,

    #[serde(rename = "blendSrc")]
    pub source_blend_factor: Option<BlendFactor>,
    #[serde(rename = "blendDst")]
    pub destination_blend_factor: Option<BlendFactor>,
    pub alpha_src: Option<BlendFactor>,
    pub alpha_dst: Option<BlendFactor>,

    pub depth_func: Option<CompareOp>,

    pub textures: Option<Vec<TextureBinding>>,

    /// Geometry filter expression selecting what this material draws
    pub filters: Option<String>,
    /// Name of the material to fall back to
    pub fallback: Option<String>,
    pub render_queue: Option<RenderQueue>,
    /// Name of the render pass that draws this material
    pub pass: Option<String>,

    /// Names of passes that must execute before this one
    pub dependencies: Option<Vec<String>>,
    /// Names of the texture resources this pass samples from
    pub texture_inputs: Option<Vec<String>>,
    /// Names of the texture resources this pass renders to
    pub texture_outputs: Option<Vec<String>>,
}

/// Render state toggles a definition can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateFlag {
    Blending,
    InvertCulling,
    DisableCulling,
    DisableDepthWrite,
    DisableDepthTest,
    EnableStencilTest,
    StencilWrite,
    DisableColorWrite,
    EnableAlphaToCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendFactor {
    One,
    Zero,
    SourceColor,
    DestColor,
    OneMinusSrcColor,
    OneMinusDstColor,
    SourceAlpha,
    OneMinusSrcAlpha,
    DestAlpha,
    OneMinusDstAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Never,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Incr,
    IncrWrap,
    Decr,
    DecrWrap,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsaaSupport {
    #[serde(rename = "MSAA")]
    Msaa,
    Both,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    Line,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    TexelAA,
    Bilinear,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    Repeat,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderQueue {
    Transparent,
    Opaque,
    Cutout,
}

/// Where a bound texture comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureLocation {
    /// Written by an earlier pass in this shaderpack
    Dynamic,
    InUserPackage,
    InAppPackage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexField {
    Position,
    Color,
    #[serde(rename = "UV0")]
    Uv0,
    #[serde(rename = "UV1")]
    Uv1,
    Normal,
    Tangent,
    MidTexCoord,
    VirtualTextureId,
    McEntityId,
}

/// One entry in a definition's `vertexFields` array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexFieldDecl {
    pub field: VertexField,
}

/// Sampler configuration for a bound texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplerState {
    pub sampler_index: u32,
    #[serde(rename = "textureFilter")]
    pub filter: TextureFilter,
    pub wrap_mode: WrapMode,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            sampler_index: 0,
            filter: TextureFilter::Point,
            wrap_mode: WrapMode::Clamp,
        }
    }
}

/// Stencil configuration for one face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilOpState {
    #[serde(rename = "stencilFunc")]
    pub compare_op: Option<CompareOp>,
    #[serde(rename = "stencilFailOp")]
    pub fail_op: Option<StencilOp>,
    #[serde(rename = "stencilDepthFailOp")]
    pub depth_fail_op: Option<StencilOp>,
    #[serde(rename = "stencilPassOp")]
    pub pass_op: Option<StencilOp>,
}

/// A texture sampled by a material, with its binding slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureBinding {
    #[serde(rename = "textureIndex")]
    pub index: u32,
    pub texture_location: TextureLocation,
    pub texture_name: String,
    #[serde(default)]
    pub calculate_mipmaps: Option<bool>,
}
