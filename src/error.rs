//! Error types for catalog construction and build assembly
//!
//! Assembly errors are terminal for the run that raised them: nothing is
//! retried and no partial manifest is ever returned.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{ModuleId, SourceArtifact};

/// Errors raised while assembling a build tree
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A requested or dependency identifier has no catalog entry
    #[error("Unknown module: {0}")]
    UnknownModule(ModuleId),

    /// Dependency traversal revisited a module still on the active path.
    /// The path starts and ends with the repeated module.
    #[error("Cyclic dependency: {}", join_path(.0))]
    CyclicDependency(Vec<ModuleId>),

    /// Copying an artifact into the build directory failed
    #[error("Failed to stage {artifact}: {source}")]
    StagingFailure {
        /// Artifact with resolved library and build paths
        artifact: SourceArtifact,
        /// Underlying filesystem error
        #[source]
        source: io::Error,
    },

    /// Two artifacts with different content target the same destination
    #[error(
        "Destination conflict at {}: {} and {} differ",
        destination.display(),
        first.display(),
        second.display()
    )]
    DestinationConflict {
        /// Shared destination path
        destination: PathBuf,
        /// Origin staged first
        first: PathBuf,
        /// Conflicting origin
        second: PathBuf,
    },
}

impl AssemblyError {
    /// Module identifier the error is about, if any
    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            AssemblyError::UnknownModule(id) => Some(id),
            AssemblyError::CyclicDependency(path) => path.first(),
            _ => None,
        }
    }
}

/// Errors raised while building a [`crate::catalog::Catalog`]
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid module manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Invalid module descriptor {id}: {}", errors.join("; "))]
    InvalidDescriptor { id: ModuleId, errors: Vec<String> },

    #[error("Duplicate module: {0}")]
    DuplicateModule(ModuleId),
}

fn join_path(path: &[ModuleId]) -> String {
    path.iter().map(ModuleId::as_str).collect::<Vec<_>>().join(" -> ")
}
