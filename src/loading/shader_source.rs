//! Shader source file loading and include expansion
//!
//! Shader files are located by probing a list of candidate extensions and
//! read into a flat list of lines. Each line keeps the 1-based number and
//! path of the file it actually came from, so a compile error in an included
//! file points at that file rather than at the includer.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Extensions to try when loading a vertex shader
pub const VERTEX_EXTENSIONS: &[&str] = &[".vert", ".vsh"];
/// Extensions to try when loading a fragment shader
pub const FRAGMENT_EXTENSIONS: &[&str] = &[".frag", ".fsh"];
/// Extensions to try when loading a geometry shader
pub const GEOMETRY_EXTENSIONS: &[&str] = &[".geom", ".geo"];
/// Extensions to try when loading a tessellation evaluation shader
pub const TESS_EVAL_EXTENSIONS: &[&str] = FRAGMENT_EXTENSIONS;
/// Extensions to try when loading a tessellation control shader
pub const TESS_CONTROL_EXTENSIONS: &[&str] = GEOMETRY_EXTENSIONS;

/// One line of shader source, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderLine {
    /// 1-based line number within the file named by `file`
    pub line_num: usize,
    /// The file this line was read from, which for an included line is the
    /// included file, not the includer
    pub file: PathBuf,
    /// The raw line text
    pub line: String,
}

/// Loaded source for every stage a material uses
#[derive(Debug, Clone, Default)]
pub struct StageSources {
    pub vertex: Option<Vec<ShaderLine>>,
    pub fragment: Option<Vec<ShaderLine>>,
    pub geometry: Option<Vec<ShaderLine>>,
    pub tessellation_control: Option<Vec<ShaderLine>>,
    pub tessellation_evaluation: Option<Vec<ShaderLine>>,
}

/// Errors that can occur while loading shader source
#[derive(Debug, thiserror::Error)]
pub enum ShaderLoadError {
    /// No candidate extension produced a readable file
    #[error("shader file {path:?} not found under any candidate extension")]
    NotFound { path: PathBuf },

    /// An included file could not be loaded; wraps the underlying failure so
    /// the includer sees which include was at fault
    #[error("could not load included file {path:?}")]
    IncludeNotFound {
        path: PathBuf,
        #[source]
        source: Box<ShaderLoadError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Try to load a single shader file
///
/// Appends each extension in `extensions` to `shader_path` in order; the
/// first file that opens is read. `#include` lines are replaced by the
/// recursively loaded content of the referenced file.
pub fn load_shader_file(
    shader_path: &Path,
    extensions: &[&str],
) -> Result<Vec<ShaderLine>, ShaderLoadError> {
    for extension in extensions {
        let mut full_shader_path = shader_path.as_os_str().to_owned();
        full_shader_path.push(extension);
        let full_shader_path = PathBuf::from(full_shader_path);
        trace!(path = ?full_shader_path, "Trying to load shader file");

        match fs::read_to_string(&full_shader_path) {
            Ok(source) => {
                debug!(path = ?full_shader_path, "Loading shader file");
                return read_shader_source(&source, &full_shader_path);
            }
            Err(_) => {
                trace!(path = ?full_shader_path, "Could not read file");
            }
        }
    }

    Err(ShaderLoadError::NotFound {
        path: shader_path.to_path_buf(),
    })
}

fn read_shader_source(source: &str, shader_path: &Path) -> Result<Vec<ShaderLine>, ShaderLoadError> {
    let mut file_source = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        if line.starts_with("#include") {
            let included_file = load_included_file(shader_path, line)?;
            file_source.extend(included_file);
        } else {
            file_source.push(ShaderLine {
                line_num: idx + 1,
                file: shader_path.to_path_buf(),
                line: line.to_string(),
            });
        }
    }

    Ok(file_source)
}

/// Load a file requested through an `#include` line
///
/// Includes are expanded recursively with no cycle detection, so a file that
/// includes itself (directly or through a chain) will recurse until the
/// stack runs out. Known limitation inherited from the format.
fn load_included_file(shader_path: &Path, line: &str) -> Result<Vec<ShaderLine>, ShaderLoadError> {
    let included_file_name = filename_from_include(line);
    let file_to_include = included_file_path(shader_path, Path::new(included_file_name));
    trace!(path = ?file_to_include, "Dealing with included file");

    load_shader_file(&file_to_include, &[""]).map_err(|err| ShaderLoadError::IncludeNotFound {
        path: file_to_include,
        source: Box::new(err),
    })
}

/// Extract the filename from an `#include "some/file.glsl"` line
fn filename_from_include(include_line: &str) -> &str {
    let Some(first_quote) = include_line.find('"') else {
        return "";
    };
    let Some(last_quote) = include_line.rfind('"') else {
        return "";
    };
    if last_quote <= first_quote {
        return "";
    }
    &include_line[first_quote + 1..last_quote]
}

/// Determine the full path of an included file
///
/// A root-relative include (`#include "/lib/common.glsl"`) resolves against
/// the shaderpack's `shaders` directory, recovered from the including
/// file's own path. A plain include resolves next to the including file.
fn included_file_path(shader_path: &Path, included_file_name: &Path) -> PathBuf {
    if included_file_name.has_root() {
        if let Some(root) = shaders_root(shader_path) {
            let mut path = root;
            for component in included_file_name.components() {
                if let std::path::Component::Normal(part) = component {
                    path.push(part);
                }
            }
            return path;
        }
    }

    shader_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(included_file_name)
}

/// The path up to and including the last `shaders` component, if any
fn shaders_root(shader_path: &Path) -> Option<PathBuf> {
    let mut root = None;
    let mut prefix = PathBuf::new();
    for component in shader_path.components() {
        prefix.push(component);
        if component.as_os_str() == "shaders" {
            root = Some(prefix.clone());
        }
    }
    root
}
