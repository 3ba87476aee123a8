//! Project configuration
//!
//! Handles loading a project's build configuration (library location, build
//! directory, requested modules, manifest outputs, logging).

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::build::{BuildLayout, BuildRequest, Purpose};

/// Top-level modules to set up, per purpose
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRequestConfig {
    /// Synthesizable top modules
    #[serde(default)]
    pub hardware: Vec<String>,

    /// Simulation-only modules (testbenches, models)
    #[serde(default)]
    pub simulation: Vec<String>,

    /// FPGA-flow-only modules
    #[serde(default)]
    pub fpga: Vec<String>,
}

/// Manifest files written into the build directory.
///
/// An empty file name disables the output (TOML has no null).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// JSON manifest file name (None = not written)
    #[serde(default = "default_json_manifest", serialize_with = "serialize_output")]
    pub json: Option<String>,

    /// Plain source list file name (None = not written)
    #[serde(default = "default_source_list", serialize_with = "serialize_output")]
    pub source_list: Option<String>,
}

/// Disabled outputs are written as `""` so they stay disabled when reloaded
fn serialize_output<S: serde::Serializer>(name: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(name.as_deref().unwrap_or(""))
}

fn default_json_manifest() -> Option<String> {
    Some("manifest.json".to_string())
}

fn default_source_list() -> Option<String> {
    Some("sources.list".to_string())
}

impl ManifestConfig {
    /// Path of the JSON manifest under `build_dir`, if enabled
    pub fn json_path(&self, build_dir: &Path) -> Option<PathBuf> {
        enabled(&self.json).map(|name| build_dir.join(name))
    }

    /// Path of the source list under `build_dir`, if enabled
    pub fn source_list_path(&self, build_dir: &Path) -> Option<PathBuf> {
        enabled(&self.source_list).map(|name| build_dir.join(name))
    }
}

fn enabled(name: &Option<String>) -> Option<&str> {
    name.as_deref().map(str::trim).filter(|n| !n.is_empty())
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            json: default_json_manifest(),
            source_list: default_source_list(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "hwstage=debug"). RUST_LOG takes precedence.
    pub filter: Option<String>,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project (top module) name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Library root holding the module directories
    #[serde(default = "default_library_dir")]
    pub library_dir: PathBuf,

    /// Build output directory (default: `../{name}_{version}`)
    pub build_dir: Option<PathBuf>,

    /// Stage every purpose into the build root instead of per-purpose dirs
    #[serde(default)]
    pub flat_layout: bool,

    /// Requested modules
    #[serde(default)]
    pub modules: ModuleRequestConfig,

    /// Manifest outputs
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Logging configuration
    pub logging: Option<LoggingConfig>,

    /// Directory relative paths are resolved against (the config file's)
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_library_dir() -> PathBuf {
    PathBuf::from("hardware/modules")
}

impl ProjectConfig {
    /// Config with defaults for everything but the name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            library_dir: default_library_dir(),
            build_dir: None,
            flat_layout: false,
            modules: ModuleRequestConfig::default(),
            manifest: ManifestConfig::default(),
            logging: None,
            base_dir: PathBuf::new(),
        }
    }

    /// Load configuration from TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.base_dir = base_dir_of(path);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: ProjectConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.base_dir = base_dir_of(path);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Save configuration to TOML file
    pub fn to_toml_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.name.trim().is_empty(), "project name cannot be empty");
        anyhow::ensure!(!self.version.trim().is_empty(), "project version cannot be empty");
        Ok(())
    }

    /// Library root, resolved against the config file's directory
    pub fn library_dir(&self) -> PathBuf {
        self.base_dir.join(&self.library_dir)
    }

    /// Build root, resolved against the config file's directory
    pub fn build_dir(&self) -> PathBuf {
        match &self.build_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.join(format!("../{}_{}", self.name, self.version)),
        }
    }

    /// Staging layout for this project
    pub fn layout(&self) -> BuildLayout {
        if self.flat_layout {
            BuildLayout::flat(self.library_dir(), self.build_dir())
        } else {
            BuildLayout::new(self.library_dir(), self.build_dir())
        }
    }

    /// Requested modules grouped by purpose
    pub fn request(&self) -> BuildRequest {
        BuildRequest::new()
            .with(Purpose::Hardware, self.modules.hardware.iter().map(String::as_str))
            .with(Purpose::Simulation, self.modules.simulation.iter().map(String::as_str))
            .with(Purpose::Fpga, self.modules.fpga.iter().map(String::as_str))
    }
}

fn base_dir_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
