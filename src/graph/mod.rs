//! Render graph compilation
//!
//! Provides pass dependency ordering and physical texture planning for the
//! passes a shaderpack declares.

pub mod aliasing;
pub mod dependency;
pub mod pass;

pub use aliasing::{plan_aliases, TextureAliasPlan, BACKBUFFER_TEXTURE};
pub use dependency::{order_passes, RenderGraphError, BACKBUFFER_RESOURCE};
pub use pass::{parse_texture_resources, PixelFormat, RenderPassNode, TextureFormat, TextureResource};
