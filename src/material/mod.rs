//! Material and pass definitions, parsing, and inheritance resolution

pub mod definition;
pub mod inheritance;
pub mod parser;

pub use definition::{
    BlendFactor, CompareOp, MaterialDefinition, MsaaSupport, PrimitiveTopology, RenderQueue,
    SamplerState, StateFlag, StencilOp, StencilOpState, TextureBinding, TextureFilter,
    TextureLocation, VertexField, VertexFieldDecl, WrapMode,
};
pub use inheritance::resolve_inheritance;
pub use parser::{parse_definitions, MaterialError};
