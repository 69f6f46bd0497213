//! Shaderpack loading and render graph compilation
//!
//! This crate reads Minecraft-style shaderpacks off disk, resolves material
//! and pass inheritance, compiles the declared passes into an execution
//! order, and plans which declared textures can share physical storage.

pub mod config;
pub mod graph;
pub mod loading;
pub mod material;

// Re-export commonly used types
pub mod prelude {
    // Config types
    pub use crate::config::LoaderConfig;

    // Loading types
    pub use crate::loading::{
        load_shaderpack, ShaderLine, ShaderLoadError, Shaderpack, ShaderpackError, StageSources,
    };

    // Material types
    pub use crate::material::{MaterialDefinition, MaterialError};

    // Graph types
    pub use crate::graph::{
        PixelFormat, RenderGraphError, RenderPassNode, TextureAliasPlan, TextureFormat,
        TextureResource,
    };
}

/// Initialize logging for the loader
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
