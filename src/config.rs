//! Configuration types for the shaderpack loader

use std::path::PathBuf;
use tracing::debug;

/// Configuration for shaderpack and default-pass locations
///
/// The loader never keeps global state; the caller constructs one of these
/// and owns it for as long as shaderpacks are being loaded. The default pass
/// documents referenced here are read on demand, not cached process-wide.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Root directory containing shaderpack folders
    pub shaderpacks_root: PathBuf,
    /// Directory containing the default pass documents
    /// (`bedrock_passes.json` and `optifine_passes.json`)
    pub default_passes_dir: PathBuf,
}

impl LoaderConfig {
    /// Create a new LoaderConfig with custom paths
    pub fn new(shaderpacks_root: PathBuf, default_passes_dir: PathBuf) -> Self {
        debug!(
            shaderpacks_root = ?shaderpacks_root,
            default_passes_dir = ?default_passes_dir,
            "Creating new LoaderConfig"
        );
        Self {
            shaderpacks_root,
            default_passes_dir,
        }
    }

    /// Get the full path to a shaderpack directory
    pub fn shaderpack_path(&self, name: &str) -> PathBuf {
        // Validate name to prevent path traversal attacks
        if name.contains("..") || name.contains("/") || name.contains("\\") {
            panic!("Invalid shaderpack name: {name}");
        }
        let path = self.shaderpacks_root.join(name);
        debug!(name = name, path = ?path, "Generated shaderpack path");
        path
    }

    /// Get the path to the default Bedrock pass document
    pub fn bedrock_passes_path(&self) -> PathBuf {
        self.default_passes_dir.join("bedrock_passes.json")
    }

    /// Get the path to the default Optifine pass document
    pub fn optifine_passes_path(&self) -> PathBuf {
        self.default_passes_dir.join("optifine_passes.json")
    }

    /// Check if the configured directories exist
    pub fn validate(&self) -> Result<(), std::io::Error> {
        if !self.shaderpacks_root.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "Shaderpack root directory not found: {:?}",
                    self.shaderpacks_root
                ),
            ));
        }

        if !self.default_passes_dir.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "Default passes directory not found: {:?}",
                    self.default_passes_dir
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_shaderpack_path() {
        let config = LoaderConfig::new(PathBuf::from("shaderpacks"), PathBuf::from("config"));
        assert_eq!(
            config.shaderpack_path("SEUS"),
            PathBuf::from("shaderpacks/SEUS")
        );
    }

    #[test]
    #[should_panic(expected = "Invalid shaderpack name")]
    fn test_shaderpack_path_rejects_traversal() {
        let config = LoaderConfig::new(PathBuf::from("shaderpacks"), PathBuf::from("config"));
        config.shaderpack_path("../evil");
    }

    #[test]
    fn test_default_pass_paths() {
        let config = LoaderConfig::new(PathBuf::from("shaderpacks"), PathBuf::from("config"));
        assert_eq!(
            config.bedrock_passes_path(),
            PathBuf::from("config/bedrock_passes.json")
        );
        assert_eq!(
            config.optifine_passes_path(),
            PathBuf::from("config/optifine_passes.json")
        );
    }

    #[test]
    fn test_validate_missing_root() {
        let config = LoaderConfig::new(
            PathBuf::from("definitely/not/a/real/path"),
            PathBuf::from("also/not/real"),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_existing_dirs() {
        let root = TempDir::new().unwrap();
        let defaults = TempDir::new().unwrap();
        let config = LoaderConfig::new(
            root.path().to_path_buf(),
            defaults.path().to_path_buf(),
        );
        assert!(config.validate().is_ok());
    }
}
