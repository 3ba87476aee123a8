//! Module identifiers, descriptors and source artifacts

use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Unique name of a reusable hardware block
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create an identifier from a module name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Module name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModuleId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An (origin, destination) pair.
///
/// In a [`ModuleDescriptor`] the origin is relative to the library directory
/// and the destination relative to the purpose directory of the build. Once
/// staged, both paths are rooted (see [`crate::build::BuildLayout`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceArtifact {
    /// Where the file is copied from
    pub origin: PathBuf,
    /// Where the file is copied to
    pub destination: PathBuf,
}

impl SourceArtifact {
    /// Create an artifact
    pub fn new(origin: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// Artifact whose destination is the origin's file name
    pub fn keep_name(origin: impl Into<PathBuf>) -> Self {
        let origin = origin.into();
        let destination = origin
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| origin.clone());
        Self { origin, destination }
    }

    /// Origin path
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Destination path
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl fmt::Display for SourceArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin.display(), self.destination.display())
    }
}

/// Static metadata for one module of the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Module identifier
    pub id: ModuleId,
    /// Module version, e.g. `V0.10`
    pub version: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Direct dependencies, in declaration order
    pub dependencies: Vec<ModuleId>,
    /// Source files staged for this module
    pub sources: Vec<SourceArtifact>,
}

impl ModuleDescriptor {
    /// Create a descriptor with no dependencies and no sources
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            version: "1.0".to_string(),
            description: None,
            dependencies: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Add a direct dependency
    pub fn depends_on(mut self, id: impl Into<ModuleId>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Add a source artifact
    pub fn source(mut self, origin: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        self.sources.push(SourceArtifact::new(origin, destination));
        self
    }

    /// Set the version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
