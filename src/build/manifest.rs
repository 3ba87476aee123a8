//! Build manifest
//!
//! The ordered list of artifacts staged by one assembly run.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::build::layout::Purpose;
use crate::catalog::{ModuleId, SourceArtifact};

/// One staged artifact, with rooted origin and destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedArtifact {
    /// Module that declared the artifact
    pub module: ModuleId,
    /// Purpose the module was set up for
    pub purpose: Purpose,
    /// Library path to build path
    #[serde(flatten)]
    pub artifact: SourceArtifact,
}

/// Filesystem writes performed by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Artifacts written
    pub copied: usize,
    /// Artifacts already up to date
    pub fresh: usize,
}

impl StageReport {
    /// Number of artifacts looked at
    pub fn total(&self) -> usize {
        self.copied + self.fresh
    }
}

/// Artifacts of one build, dependencies first.
///
/// Equality ignores the [`StageReport`]: a re-run over a populated build
/// directory writes nothing yet describes the same build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildManifest {
    artifacts: Vec<StagedArtifact>,
    #[serde(skip)]
    report: StageReport,
}

impl PartialEq for BuildManifest {
    fn eq(&self, other: &Self) -> bool {
        self.artifacts == other.artifacts
    }
}

impl Eq for BuildManifest {}

impl BuildManifest {
    pub(crate) fn new(artifacts: Vec<StagedArtifact>, report: StageReport) -> Self {
        Self { artifacts, report }
    }

    /// Staged artifacts in staging order
    pub fn artifacts(&self) -> &[StagedArtifact] {
        &self.artifacts
    }

    /// (origin, destination) pairs in staging order
    pub fn pairs(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.artifacts
            .iter()
            .map(|a| (a.artifact.origin(), a.artifact.destination()))
    }

    /// Destination paths in staging order
    pub fn destinations(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.iter().map(|a| a.artifact.destination())
    }

    /// Modules in the order their artifacts were staged
    pub fn modules(&self) -> Vec<&ModuleId> {
        let mut seen = HashSet::new();
        self.artifacts
            .iter()
            .map(|a| &a.module)
            .filter(|m| seen.insert(*m))
            .collect()
    }

    /// Number of artifacts
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the build has no artifacts
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Writes performed while staging
    pub fn report(&self) -> StageReport {
        self.report
    }

    /// Write the artifact list as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }

    /// Write one destination per line, relative to `build_dir` when possible
    pub fn write_source_list<P: AsRef<Path>, B: AsRef<Path>>(&self, path: P, build_dir: B) -> io::Result<()> {
        let mut out = io::BufWriter::new(fs::File::create(path)?);
        for destination in self.destinations() {
            let relative = destination.strip_prefix(build_dir.as_ref()).unwrap_or(destination);
            writeln!(out, "{}", relative.display())?;
        }
        out.flush()
    }
}
