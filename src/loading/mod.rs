//! Shaderpack loading from disk
//!
//! The entry point is [`load_shaderpack`], which reads a shaderpack
//! directory into a [`Shaderpack`]. Shader source loading and include
//! expansion live in [`shader_source`].

pub mod shader_source;
pub mod shaderpack;

pub use shader_source::{
    load_shader_file, ShaderLine, ShaderLoadError, StageSources, FRAGMENT_EXTENSIONS,
    GEOMETRY_EXTENSIONS, TESS_CONTROL_EXTENSIONS, TESS_EVAL_EXTENSIONS, VERTEX_EXTENSIONS,
};
pub use shaderpack::{load_shaderpack, Shaderpack, ShaderpackError};
