//! Module manifest parsing
//!
//! Handles parsing `module.toml` manifests into [`ModuleDescriptor`]s.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::descriptor::{ModuleDescriptor, ModuleId, SourceArtifact};
use crate::error::CatalogError;

/// File name of a module manifest inside a module directory
pub const MANIFEST_FILE: &str = "module.toml";

/// Module-local tree staged whole when a manifest lists no sources
pub const DEFAULT_SOURCE_TREE: &str = "hardware/src";

/// Module manifest (module.toml structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Module name
    pub name: String,
    /// Module version
    #[serde(default = "default_version")]
    pub version: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Names of the modules this module requires
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Source files of this module
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// One `[[sources]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Path relative to the manifest's directory
    pub origin: PathBuf,
    /// Path relative to the purpose directory; defaults to the origin's file name
    pub destination: Option<PathBuf>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl ModuleManifest {
    /// Parse manifest text. `path` is only used for error reporting.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, CatalogError> {
        let manifest: ModuleManifest =
            toml::from_str(contents).map_err(|e| CatalogError::InvalidManifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if manifest.name.trim().is_empty() {
            return Err(CatalogError::InvalidManifest {
                path: path.to_path_buf(),
                reason: "module name cannot be empty".to_string(),
            });
        }

        Ok(manifest)
    }

    /// Load manifest from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Convert to a descriptor. `module_dir` is the manifest's directory
    /// relative to the library root; origins are rewritten under it.
    pub fn to_descriptor(&self, module_dir: &Path) -> ModuleDescriptor {
        let sources = self
            .sources
            .iter()
            .map(|entry| {
                let origin = module_dir.join(&entry.origin);
                match &entry.destination {
                    Some(destination) => SourceArtifact::new(origin, destination),
                    None => SourceArtifact::keep_name(origin),
                }
            })
            .collect();

        ModuleDescriptor {
            id: ModuleId::new(self.name.trim()),
            version: self.version.clone(),
            description: self.description.clone(),
            dependencies: self.dependencies.iter().map(|d| ModuleId::new(d.trim())).collect(),
            sources,
        }
    }
}
