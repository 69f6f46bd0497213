//! Shaderpack loading
//!
//! Pulls a whole shaderpack off disk: pass definitions (falling back to the
//! default Bedrock or Optifine passes when the pack declares none),
//! material definitions, shader source per material stage, texture resource
//! declarations, the compiled pass execution order, and the physical
//! texture plan. A load either fully succeeds or the shaderpack is
//! rejected; per-shader and per-material file problems degrade locally
//! instead of aborting the load.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::LoaderConfig;
use crate::graph::{
    order_passes, parse_texture_resources, plan_aliases, RenderGraphError, RenderPassNode,
    TextureAliasPlan, TextureResource,
};
use crate::loading::shader_source::{
    load_shader_file, StageSources, FRAGMENT_EXTENSIONS, GEOMETRY_EXTENSIONS,
    TESS_CONTROL_EXTENSIONS, TESS_EVAL_EXTENSIONS, VERTEX_EXTENSIONS,
};
use crate::material::{parse_definitions, resolve_inheritance, MaterialDefinition, MaterialError};

// TODO: fill in the Bedrock shader names
const BEDROCK_SHADER_NAMES: &[&str] = &[];

const OPTIFINE_SHADER_NAMES: &[&str] = &[
    "gbuffers_basic",
    "gbuffers_textured",
    "gbuffers_textured_lit",
    "gbuffers_skybasic",
    "gbuffers_skytextured",
    "gbuffers_clouds",
    "gbuffers_terrain",
    "gbuffers_terrain_solid",
    "gbuffers_terrain_cutout_mip",
    "gbuffers_terrain_cutout",
    "gbuffers_damagedblock",
    "gbuffers_water",
    "gbuffers_block",
    "gbuffers_beaconbeam",
    "gbuffers_item",
    "gbuffers_entities",
    "gbuffers_armor_glint",
    "gbuffers_spidereyes",
    "gbuffers_hand",
    "gbuffers_weather",
    "composite",
    "composite1",
    "composite2",
    "composite3",
    "composite4",
    "composite5",
    "composite6",
    "composite7",
    "final",
    "shadow",
    "shadow_solid",
    "shadow_cutout",
    "deferred",
    "deferred1",
    "deferred2",
    "deferred3",
    "deferred4",
    "deferred5",
    "deferred6",
    "deferred7",
    "gbuffers_hand_water",
    "deferred_last",
    "composite_last",
];

/// Everything a renderer needs from a loaded shaderpack
#[derive(Debug, Clone, Default)]
pub struct Shaderpack {
    pub name: String,
    /// Resolved materials grouped by the pass that draws them
    pub materials_by_pass: HashMap<String, Vec<MaterialDefinition>>,
    /// Loaded shader source per material name
    pub sources: HashMap<String, StageSources>,
    /// Passes in compiled execution order
    pub ordered_passes: Vec<RenderPassNode>,
    /// Declared dynamic texture resources by name
    pub textures: HashMap<String, TextureResource>,
    /// Physical texture assignments for the declared resources
    pub texture_plan: TextureAliasPlan,
}

/// Errors that reject a whole shaderpack
#[derive(Debug, thiserror::Error)]
pub enum ShaderpackError {
    #[error("shaderpack {name} is a zip file; zipped shaderpacks are not supported")]
    ZippedPackUnsupported { name: String },

    #[error("cannot work with the format of shaderpack {name}; please choose another one")]
    UnsupportedFormat { name: String },

    #[error("could not read required file {path:?}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Graph(#[from] RenderGraphError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Load the shaderpack with the given name
///
/// The name is a directory under the config's shaderpack root. On any
/// returned error the caller should keep whatever shaderpack was active
/// before.
pub fn load_shaderpack(config: &LoaderConfig, name: &str) -> Result<Shaderpack, ShaderpackError> {
    info!(shaderpack = name, "Loading shaderpack");

    if name.ends_with(".zip") {
        error!(shaderpack = name, "Cannot load zipped shaderpack");
        return Err(ShaderpackError::ZippedPackUnsupported {
            name: name.to_string(),
        });
    }

    let pack_dir = config.shaderpack_path(name);
    let shaders_dir = pack_dir.join("shaders");

    // Passes, falling back to a default set when the pack declares none
    let mut pass_definitions = read_pass_definitions(&pack_dir)?;
    if pass_definitions.is_empty() {
        warn!(
            shaderpack = name,
            "No passes defined by shaderpack; attempting to guess the intended format"
        );
        pass_definitions = load_default_passes(config, name, &shaders_dir)?;
    }
    resolve_inheritance(&mut pass_definitions)?;

    let pass_nodes: HashMap<String, RenderPassNode> = pass_definitions
        .values()
        .map(|definition| {
            (
                definition.name.clone(),
                RenderPassNode::from_definition(definition),
            )
        })
        .collect();

    let ordered_names = order_passes(&pass_nodes)?;
    let ordered_passes: Vec<RenderPassNode> = ordered_names
        .iter()
        .filter_map(|pass_name| pass_nodes.get(pass_name).cloned())
        .collect();

    // Materials; one bad file degrades, it doesn't abort
    let mut materials = read_material_files(&pack_dir)?;
    resolve_inheritance(&mut materials)?;

    info!(shaderpack = name, "Reading shaders from disk");
    let sources: HashMap<String, StageSources> = materials
        .par_iter()
        .map(|(material_name, material)| {
            (
                material_name.clone(),
                load_stage_sources(&shaders_dir, material),
            )
        })
        .collect();

    // Texture resources are mandatory
    let resources_path = pack_dir.join("resources.json");
    let resources_document = read_json(&resources_path)?;
    let textures = parse_texture_resources(&resources_document)?;

    let texture_plan = plan_aliases(&ordered_passes, &textures);

    let mut materials_by_pass: HashMap<String, Vec<MaterialDefinition>> = HashMap::new();
    for material in materials.into_values() {
        match material.pass.clone() {
            Some(pass_name) => materials_by_pass
                .entry(pass_name)
                .or_default()
                .push(material),
            None => warn!(
                material = %material.name,
                "Material names no pass and will not be drawn; set one on it or one of its parents"
            ),
        }
    }
    for grouped in materials_by_pass.values_mut() {
        grouped.sort_by(|a, b| a.name.cmp(&b.name));
    }

    debug!(
        shaderpack = name,
        passes = ordered_passes.len(),
        materials = materials_by_pass.values().map(Vec::len).sum::<usize>(),
        textures = textures.len(),
        "Shaderpack loaded"
    );

    Ok(Shaderpack {
        name: name.to_string(),
        materials_by_pass,
        sources,
        ordered_passes,
        textures,
        texture_plan,
    })
}

fn read_json(path: &Path) -> Result<serde_json::Value, ShaderpackError> {
    let text = fs::read_to_string(path).map_err(|source| ShaderpackError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn read_pass_definitions(
    pack_dir: &Path,
) -> Result<HashMap<String, MaterialDefinition>, ShaderpackError> {
    let passes_path = pack_dir.join("passes.json");
    if !passes_path.is_file() {
        return Ok(HashMap::new());
    }
    let document = read_json(&passes_path)?;
    Ok(parse_definitions(&document)?)
}

/// Pick and load a default pass document based on which known shader
/// filenames the pack's shaders directory contains
fn load_default_passes(
    config: &LoaderConfig,
    name: &str,
    shaders_dir: &Path,
) -> Result<HashMap<String, MaterialDefinition>, ShaderpackError> {
    let stems = shader_names_in_folder(shaders_dir)?;

    let document = if contains_bedrock_files(&stems) {
        read_json(&config.bedrock_passes_path())?
    } else if contains_optifine_files(&stems) {
        read_json(&config.optifine_passes_path())?
    } else {
        error!(
            shaderpack = name,
            "Cannot work with the format of this shaderpack; please choose another one and try again"
        );
        return Err(ShaderpackError::UnsupportedFormat {
            name: name.to_string(),
        });
    };

    Ok(parse_definitions(&document)?)
}

/// File stems of every regular file in the pack's shaders directory
fn shader_names_in_folder(shaders_dir: &Path) -> Result<Vec<String>, ShaderpackError> {
    let mut filenames = Vec::new();
    if !shaders_dir.is_dir() {
        return Ok(filenames);
    }

    for entry in fs::read_dir(shaders_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Some(stem) = path.file_stem() {
                filenames.push(stem.to_string_lossy().into_owned());
            }
        }
    }

    Ok(filenames)
}

fn contains_bedrock_files(stems: &[String]) -> bool {
    stems
        .iter()
        .any(|stem| BEDROCK_SHADER_NAMES.contains(&stem.as_str()))
}

fn contains_optifine_files(stems: &[String]) -> bool {
    stems
        .iter()
        .any(|stem| OPTIFINE_SHADER_NAMES.contains(&stem.as_str()))
}

/// Read every `*.material` file under the pack's materials directory
///
/// A file that fails to read or parse is logged and skipped so the rest of
/// the pack still loads.
fn read_material_files(
    pack_dir: &Path,
) -> Result<HashMap<String, MaterialDefinition>, ShaderpackError> {
    let materials_dir = pack_dir.join("materials");
    let mut materials = HashMap::new();

    if !materials_dir.is_dir() {
        warn!(path = ?materials_dir, "Shaderpack has no materials directory");
        return Ok(materials);
    }

    for entry in fs::read_dir(&materials_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("material") {
            continue;
        }

        let document = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(document) => document,
                Err(err) => {
                    error!(path = ?path, error = %err, "Skipping unparsable material file");
                    continue;
                }
            },
            Err(err) => {
                error!(path = ?path, error = %err, "Skipping unreadable material file");
                continue;
            }
        };

        match parse_definitions(&document) {
            Ok(definitions) => materials.extend(definitions),
            Err(err) => {
                error!(path = ?path, error = %err, "Skipping invalid material file");
            }
        }
    }

    Ok(materials)
}

/// Load the source of every stage a material sets
///
/// The vertex and fragment stages are expected after inheritance resolution;
/// a missing one is logged and left unset so the caller can skip the
/// material. Tessellation needs both the control and evaluation stages, so a
/// lone one of the pair is ignored with a warning.
fn load_stage_sources(shaders_dir: &Path, material: &MaterialDefinition) -> StageSources {
    let mut sources = StageSources::default();

    match &material.vertex_shader {
        None => error!(
            material = %material.name,
            "No vertex shader set; make sure this material or one of its parents sets one"
        ),
        Some(vertex) => match load_shader_file(&shaders_dir.join(vertex), VERTEX_EXTENSIONS) {
            Ok(lines) => sources.vertex = Some(lines),
            Err(err) => error!(
                material = %material.name,
                shader = %vertex,
                error = %err,
                "Could not load vertex shader"
            ),
        },
    }

    match &material.fragment_shader {
        None => error!(
            material = %material.name,
            "No fragment shader set; make sure this material or one of its parents sets one"
        ),
        Some(fragment) => match load_shader_file(&shaders_dir.join(fragment), FRAGMENT_EXTENSIONS) {
            Ok(lines) => sources.fragment = Some(lines),
            Err(err) => error!(
                material = %material.name,
                shader = %fragment,
                error = %err,
                "Could not load fragment shader"
            ),
        },
    }

    if let Some(geometry) = &material.geometry_shader {
        match load_shader_file(&shaders_dir.join(geometry), GEOMETRY_EXTENSIONS) {
            Ok(lines) => sources.geometry = Some(lines),
            Err(err) => error!(
                material = %material.name,
                shader = %geometry,
                error = %err,
                "Could not load geometry shader"
            ),
        }
    }

    match (
        &material.tessellation_control_shader,
        &material.tessellation_evaluation_shader,
    ) {
        (Some(_), None) => warn!(
            material = %material.name,
            "A tessellation control shader is set without an evaluation shader; both are needed, so tessellation is skipped for this material"
        ),
        (None, Some(_)) => warn!(
            material = %material.name,
            "A tessellation evaluation shader is set without a control shader; both are needed, so tessellation is skipped for this material"
        ),
        (Some(control), Some(evaluation)) => {
            match load_shader_file(&shaders_dir.join(control), TESS_CONTROL_EXTENSIONS) {
                Ok(lines) => sources.tessellation_control = Some(lines),
                Err(err) => error!(
                    material = %material.name,
                    shader = %control,
                    error = %err,
                    "Could not load tessellation control shader"
                ),
            }
            match load_shader_file(&shaders_dir.join(evaluation), TESS_EVAL_EXTENSIONS) {
                Ok(lines) => sources.tessellation_evaluation = Some(lines),
                Err(err) => error!(
                    material = %material.name,
                    shader = %evaluation,
                    error = %err,
                    "Could not load tessellation evaluation shader"
                ),
            }
        }
        (None, None) => {}
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        config: LoaderConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            let packs = root.path().join("shaderpacks");
            let defaults = root.path().join("config");
            fs::create_dir_all(&packs).unwrap();
            fs::create_dir_all(&defaults).unwrap();
            let config = LoaderConfig::new(packs, defaults);
            Self {
                _root: root,
                config,
            }
        }

        fn pack_dir(&self, name: &str) -> PathBuf {
            let dir = self.config.shaderpacks_root.join(name);
            fs::create_dir_all(&dir).unwrap();
            dir
        }

        fn write(&self, pack: &str, rel: &str, content: &str) {
            let path = self.pack_dir(pack).join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn minimal_pack(fixture: &Fixture, name: &str) {
        fixture.write(
            name,
            "passes.json",
            r#"{
                "Shadow": { "textureOutputs": ["shadowmap"] },
                "Final": {
                    "textureInputs": ["shadowmap"],
                    "textureOutputs": ["backbuffer"]
                }
            }"#,
        );
        fixture.write(
            name,
            "resources.json",
            r#"[
                { "name": "shadowmap", "format": "Depth", "width": 2048, "height": 2048 },
                { "name": "Backbuffer", "format": "RGBA8", "width": 1920, "height": 1080 }
            ]"#,
        );
        fixture.write(
            name,
            "materials/terrain.material",
            r#"{
                "Terrain": {
                    "pass": "Final",
                    "vertexShader": "terrain",
                    "fragmentShader": "terrain"
                }
            }"#,
        );
        fixture.write(name, "shaders/terrain.vsh", "void main() {}\n");
        fixture.write(name, "shaders/terrain.fsh", "void main() {}\n");
    }

    #[test]
    fn test_load_minimal_pack() {
        let fixture = Fixture::new();
        minimal_pack(&fixture, "pack");

        let shaderpack = load_shaderpack(&fixture.config, "pack").unwrap();

        assert_eq!(shaderpack.name, "pack");
        let order: Vec<&str> = shaderpack
            .ordered_passes
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(order, vec!["Shadow", "Final"]);

        let terrain_sources = &shaderpack.sources["Terrain"];
        assert!(terrain_sources.vertex.is_some());
        assert!(terrain_sources.fragment.is_some());

        assert_eq!(shaderpack.materials_by_pass["Final"].len(), 1);
        assert_eq!(shaderpack.textures.len(), 2);
        assert!(shaderpack.texture_plan.assignments.contains_key("shadowmap"));
    }

    #[test]
    fn test_zip_pack_fails_fast() {
        let fixture = Fixture::new();
        let result = load_shaderpack(&fixture.config, "pack.zip");
        assert!(matches!(
            result,
            Err(ShaderpackError::ZippedPackUnsupported { .. })
        ));
    }

    #[test]
    fn test_unknown_format_is_fatal() {
        let fixture = Fixture::new();
        // No passes.json and no recognizable shader names
        fixture.write("pack", "shaders/something_custom.fsh", "void main() {}\n");
        fixture.write("pack", "resources.json", "[]");

        let result = load_shaderpack(&fixture.config, "pack");
        assert!(matches!(
            result,
            Err(ShaderpackError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_optifine_pack_uses_default_passes() {
        let fixture = Fixture::new();
        fixture.write("pack", "shaders/composite.fsh", "void main() {}\n");
        fixture.write("pack", "shaders/composite.vsh", "void main() {}\n");
        fixture.write(
            "pack",
            "resources.json",
            r#"[{ "name": "Backbuffer", "format": "RGBA8", "width": 1920, "height": 1080 }]"#,
        );
        fs::write(
            fixture.config.optifine_passes_path(),
            r#"{
                "Composite": { "textureOutputs": ["backbuffer"] }
            }"#,
        )
        .unwrap();

        let shaderpack = load_shaderpack(&fixture.config, "pack").unwrap();
        assert_eq!(shaderpack.ordered_passes[0].name, "Composite");
    }

    #[test]
    fn test_optifine_guess_with_missing_default_doc_is_fatal() {
        let fixture = Fixture::new();
        fixture.write("pack", "shaders/final.fsh", "void main() {}\n");

        let result = load_shaderpack(&fixture.config, "pack");
        assert!(matches!(result, Err(ShaderpackError::MissingFile { .. })));
    }

    #[test]
    fn test_missing_backbuffer_writer_rejects_pack() {
        let fixture = Fixture::new();
        fixture.write(
            "pack",
            "passes.json",
            r#"{ "Shadow": { "textureOutputs": ["shadowmap"] } }"#,
        );
        fixture.write("pack", "resources.json", "[]");

        let result = load_shaderpack(&fixture.config, "pack");
        assert!(matches!(
            result,
            Err(ShaderpackError::Graph(RenderGraphError::NoBackbufferWriter))
        ));
    }

    #[test]
    fn test_missing_resources_json_is_fatal() {
        let fixture = Fixture::new();
        fixture.write(
            "pack",
            "passes.json",
            r#"{ "Final": { "textureOutputs": ["backbuffer"] } }"#,
        );

        let result = load_shaderpack(&fixture.config, "pack");
        assert!(matches!(result, Err(ShaderpackError::MissingFile { .. })));
    }

    #[test]
    fn test_bad_material_file_degrades() {
        let fixture = Fixture::new();
        minimal_pack(&fixture, "pack");
        fixture.write("pack", "materials/broken.material", "{ not json at all");

        let shaderpack = load_shaderpack(&fixture.config, "pack").unwrap();
        // The good material still loads
        assert!(shaderpack.sources.contains_key("Terrain"));
    }

    #[test]
    fn test_missing_shader_file_leaves_stage_unset() {
        let fixture = Fixture::new();
        minimal_pack(&fixture, "pack");
        fixture.write(
            "pack",
            "materials/ghost.material",
            r#"{
                "Ghost": {
                    "pass": "Final",
                    "vertexShader": "does_not_exist",
                    "fragmentShader": "does_not_exist"
                }
            }"#,
        );

        let shaderpack = load_shaderpack(&fixture.config, "pack").unwrap();
        let ghost = &shaderpack.sources["Ghost"];
        assert!(ghost.vertex.is_none());
        assert!(ghost.fragment.is_none());
    }

    #[test]
    fn test_material_inheritance_spans_files() {
        let fixture = Fixture::new();
        minimal_pack(&fixture, "pack");
        fixture.write(
            "pack",
            "materials/base.material",
            r#"{ "Base": { "pass": "Final", "vertexShader": "terrain", "fragmentShader": "terrain" } }"#,
        );
        fixture.write(
            "pack",
            "materials/child.material",
            r#"{ "Child:Base": {} }"#,
        );

        let shaderpack = load_shaderpack(&fixture.config, "pack").unwrap();
        let child_sources = &shaderpack.sources["Child"];
        assert!(child_sources.vertex.is_some());

        let final_materials = &shaderpack.materials_by_pass["Final"];
        assert!(final_materials.iter().any(|m| m.name == "Child"));
    }

    #[test]
    fn test_tessellation_pair_required() {
        let fixture = Fixture::new();
        minimal_pack(&fixture, "pack");
        fixture.write("pack", "shaders/tess.geo", "control\n");
        fixture.write(
            "pack",
            "materials/lonely.material",
            r#"{
                "Lonely": {
                    "pass": "Final",
                    "vertexShader": "terrain",
                    "fragmentShader": "terrain",
                    "tessellationControlShader": "tess"
                }
            }"#,
        );

        let shaderpack = load_shaderpack(&fixture.config, "pack").unwrap();
        let lonely = &shaderpack.sources["Lonely"];
        assert!(lonely.tessellation_control.is_none());
        assert!(lonely.tessellation_evaluation.is_none());
    }
}
