//! Render pass nodes and texture resource declarations
//!
//! Passes reference resources by name only; the names are resolved against
//! the shared texture resource map, never owned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::material::MaterialDefinition;

/// A single node in the render graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPassNode {
    pub name: String,
    /// Resource names this pass reads
    pub texture_inputs: Vec<String>,
    /// Resource names this pass writes
    pub texture_outputs: Vec<String>,
    /// Names of passes that must execute before this one
    pub dependencies: Vec<String>,
}

impl RenderPassNode {
    /// Project a resolved pass definition down to its graph-relevant parts
    pub fn from_definition(definition: &MaterialDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            texture_inputs: definition.texture_inputs.clone().unwrap_or_default(),
            texture_outputs: definition.texture_outputs.clone().unwrap_or_default(),
            dependencies: definition.dependencies.clone().unwrap_or_default(),
        }
    }

    pub fn writes_resource(&self, resource: &str) -> bool {
        self.texture_outputs.iter().any(|output| output == resource)
    }

    pub fn reads_resource(&self, resource: &str) -> bool {
        self.texture_inputs.iter().any(|input| input == resource)
    }
}

/// Pixel formats a dynamic texture resource can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    #[serde(rename = "RGB8")]
    Rgb8,
    #[serde(rename = "RGBA8")]
    Rgba8,
    #[serde(rename = "RGB16F")]
    Rgb16F,
    #[serde(rename = "RGBA16F")]
    Rgba16F,
    #[serde(rename = "RGB32F")]
    Rgb32F,
    #[serde(rename = "RGBA32F")]
    Rgba32F,
    Depth,
    DepthStencil,
}

/// Full format descriptor of a texture resource
///
/// Two resources may only share a physical texture when these compare equal
/// in every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureFormat {
    #[serde(rename = "format")]
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

/// A dynamic texture resource declared in resources.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureResource {
    pub name: String,
    #[serde(default)]
    pub binding: Option<u32>,
    #[serde(flatten)]
    pub format: TextureFormat,
}

/// Decode a resources.json document into a map keyed by resource name
///
/// The document is a JSON array of texture resource declarations.
pub fn parse_texture_resources(
    document: &serde_json::Value,
) -> Result<HashMap<String, TextureResource>, serde_json::Error> {
    let resources: Vec<TextureResource> = serde_json::from_value(document.clone())?;
    Ok(resources
        .into_iter()
        .map(|resource| (resource.name.clone(), resource))
        .collect())
}
