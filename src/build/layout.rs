//! Build layout
//!
//! Where artifacts come from (one library directory) and where they land
//! (one build directory, split per setup purpose).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{ModuleId, SourceArtifact};

/// Reason a module is set up, which selects its destination directory.
///
/// Declaration order is resolution order: a module needed for hardware is
/// never staged again for simulation or fpga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Synthesizable sources
    Hardware,
    /// Simulation-only sources
    Simulation,
    /// FPGA-flow-only sources
    Fpga,
}

impl Purpose {
    /// Every purpose, in resolution order
    pub const ALL: [Purpose; 3] = [Purpose::Hardware, Purpose::Simulation, Purpose::Fpga];

    /// Default directory of this purpose, relative to the build directory
    pub fn default_dir(self) -> &'static str {
        match self {
            Purpose::Hardware => "hardware/src",
            Purpose::Simulation => "hardware/simulation/src",
            Purpose::Fpga => "hardware/fpga/src",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Purpose::Hardware => "hardware",
            Purpose::Simulation => "simulation",
            Purpose::Fpga => "fpga",
        };
        f.pad(name)
    }
}

/// Library and build roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    library_dir: PathBuf,
    build_dir: PathBuf,
    purpose_dirs: BTreeMap<Purpose, PathBuf>,
}

impl BuildLayout {
    /// Layout using the default per-purpose directories
    pub fn new<L: AsRef<Path>, B: AsRef<Path>>(library_dir: L, build_dir: B) -> Self {
        let purpose_dirs = Purpose::ALL
            .iter()
            .map(|p| (*p, PathBuf::from(p.default_dir())))
            .collect();
        Self {
            library_dir: library_dir.as_ref().to_path_buf(),
            build_dir: build_dir.as_ref().to_path_buf(),
            purpose_dirs,
        }
    }

    /// Layout where every purpose stages straight into the build directory
    pub fn flat<L: AsRef<Path>, B: AsRef<Path>>(library_dir: L, build_dir: B) -> Self {
        let purpose_dirs = Purpose::ALL.iter().map(|p| (*p, PathBuf::new())).collect();
        Self {
            library_dir: library_dir.as_ref().to_path_buf(),
            build_dir: build_dir.as_ref().to_path_buf(),
            purpose_dirs,
        }
    }

    /// Override the directory of one purpose
    pub fn with_purpose_dir<P: AsRef<Path>>(mut self, purpose: Purpose, dir: P) -> Self {
        self.purpose_dirs.insert(purpose, dir.as_ref().to_path_buf());
        self
    }

    /// Library root
    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Build root
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Directory of `purpose` under the build root
    pub fn purpose_dir(&self, purpose: Purpose) -> PathBuf {
        match self.purpose_dirs.get(&purpose) {
            Some(dir) if dir.as_os_str().is_empty() => self.build_dir.clone(),
            Some(dir) => self.build_dir.join(dir),
            None => self.build_dir.join(purpose.default_dir()),
        }
    }

    /// Library path of an artifact's origin
    pub fn origin_path(&self, artifact: &SourceArtifact) -> PathBuf {
        self.library_dir.join(&artifact.origin)
    }

    /// Build path of an artifact staged for `purpose`
    pub fn destination_path(&self, purpose: Purpose, artifact: &SourceArtifact) -> PathBuf {
        self.purpose_dir(purpose).join(&artifact.destination)
    }

    /// Artifact with its origin rooted in the library and its destination
    /// rooted in the purpose directory
    pub fn resolve(&self, purpose: Purpose, artifact: &SourceArtifact) -> SourceArtifact {
        SourceArtifact {
            origin: self.origin_path(artifact),
            destination: self.destination_path(purpose, artifact),
        }
    }
}

/// Top-level modules requested for one build, grouped by purpose
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    groups: BTreeMap<Purpose, Vec<ModuleId>>,
}

impl BuildRequest {
    /// Empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Request with every module in the hardware group
    pub fn hardware<I, M>(modules: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ModuleId>,
    {
        Self::new().with(Purpose::Hardware, modules)
    }

    /// Append modules to the group of `purpose`
    pub fn with<I, M>(mut self, purpose: Purpose, modules: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ModuleId>,
    {
        self.groups
            .entry(purpose)
            .or_default()
            .extend(modules.into_iter().map(Into::into));
        self
    }

    /// Requested modules of one purpose, in request order
    pub fn modules(&self, purpose: Purpose) -> &[ModuleId] {
        self.groups.get(&purpose).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty groups in resolution order
    pub fn groups(&self) -> impl Iterator<Item = (Purpose, &[ModuleId])> {
        self.groups
            .iter()
            .filter(|(_, modules)| !modules.is_empty())
            .map(|(purpose, modules)| (*purpose, modules.as_slice()))
    }

    /// Whether nothing was requested
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}
