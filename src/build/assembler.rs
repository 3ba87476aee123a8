//! Build graph assembly
//!
//! Resolves every requested module against the catalog, then stages the
//! resulting artifacts into the build directory.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::build::layout::{BuildLayout, BuildRequest, Purpose};
use crate::build::manifest::{BuildManifest, StageReport, StagedArtifact};
use crate::build::registry::ModuleRegistry;
use crate::build::resolver::DependencyResolver;
use crate::build::stager::{file_digest, SourceStager, StageOutcome};
use crate::catalog::{Catalog, ModuleId, SourceArtifact};
use crate::error::AssemblyError;

/// Orchestrates one or more assembly runs over a fixed layout.
///
/// Each call to [`assemble`](Self::assemble) owns a fresh registry; nothing
/// carries over between runs.
#[derive(Debug, Clone)]
pub struct BuildGraphAssembler {
    layout: BuildLayout,
    stager: SourceStager,
}

impl BuildGraphAssembler {
    /// Create an assembler staging according to `layout`
    pub fn new(layout: BuildLayout) -> Self {
        Self {
            layout,
            stager: SourceStager::new(),
        }
    }

    /// Layout used for staging
    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Assemble `requested` modules for the hardware purpose
    pub fn assemble(&self, requested: &[ModuleId], catalog: &Catalog) -> Result<BuildManifest, AssemblyError> {
        self.assemble_request(&BuildRequest::hardware(requested.iter().cloned()), catalog)
    }

    /// Assemble every group of `request`.
    ///
    /// Resolution completes before the first file is written. On error
    /// nothing is returned; files staged before the failure are left in
    /// place since staging is idempotent.
    pub fn assemble_request(
        &self,
        request: &BuildRequest,
        catalog: &Catalog,
    ) -> Result<BuildManifest, AssemblyError> {
        let order = self.resolve(request, catalog)?;
        let planned = self.plan(&order, catalog)?;
        let report = self.stage_all(&planned)?;

        debug!(
            "Assembled {} modules, {} artifacts ({} copied, {} fresh)",
            order.len(),
            planned.len(),
            report.copied,
            report.fresh
        );
        Ok(BuildManifest::new(planned, report))
    }

    /// Dependency-first module order of `request`, without staging
    pub fn resolve(
        &self,
        request: &BuildRequest,
        catalog: &Catalog,
    ) -> Result<Vec<(ModuleId, Purpose)>, AssemblyError> {
        let resolver = DependencyResolver::new(catalog);
        let mut registry = ModuleRegistry::new();
        let mut order = Vec::new();

        for (purpose, modules) in request.groups() {
            for id in modules {
                let resolved = resolver.resolve(id, &mut registry)?;
                debug!("Resolved {} for {}: {} new modules", id, purpose, resolved.len());
                order.extend(resolved.into_iter().map(|m| (m, purpose)));
            }
        }
        Ok(order)
    }

    /// Root every artifact and enforce unique destinations.
    ///
    /// A destination declared twice is kept once when both origins have the
    /// same content, and is a conflict otherwise.
    fn plan(&self, order: &[(ModuleId, Purpose)], catalog: &Catalog) -> Result<Vec<StagedArtifact>, AssemblyError> {
        let mut planned = Vec::new();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

        for (id, purpose) in order {
            let descriptor = catalog
                .get(id)
                .ok_or_else(|| AssemblyError::UnknownModule(id.clone()))?;

            for source in &descriptor.sources {
                let artifact = self.layout.resolve(*purpose, source);

                if let Some(first) = claimed.get(&artifact.destination) {
                    let first_claim = SourceArtifact::new(first, &artifact.destination);
                    if first == &artifact.origin || same_content(&first_claim, &artifact)? {
                        debug!("Skipping duplicate {}", artifact);
                        continue;
                    }
                    return Err(AssemblyError::DestinationConflict {
                        destination: artifact.destination.clone(),
                        first: first.clone(),
                        second: artifact.origin.clone(),
                    });
                }

                claimed.insert(artifact.destination.clone(), artifact.origin.clone());
                planned.push(StagedArtifact {
                    module: id.clone(),
                    purpose: *purpose,
                    artifact,
                });
            }
        }
        Ok(planned)
    }

    #[cfg(not(feature = "parallel-staging"))]
    fn stage_all(&self, planned: &[StagedArtifact]) -> Result<StageReport, AssemblyError> {
        let mut report = StageReport::default();
        for staged in planned {
            match self.stager.stage(&staged.artifact)? {
                StageOutcome::Copied => report.copied += 1,
                StageOutcome::Fresh => report.fresh += 1,
            }
        }
        Ok(report)
    }

    /// Destinations are unique after [`plan`](Self::plan), so no two copies race
    #[cfg(feature = "parallel-staging")]
    fn stage_all(&self, planned: &[StagedArtifact]) -> Result<StageReport, AssemblyError> {
        use rayon::prelude::*;

        let outcomes = planned
            .par_iter()
            .map(|staged| self.stager.stage(&staged.artifact))
            .collect::<Result<Vec<_>, _>>()?;

        let copied = outcomes.iter().filter(|o| **o == StageOutcome::Copied).count();
        Ok(StageReport {
            copied,
            fresh: outcomes.len() - copied,
        })
    }
}

/// Compare origin digests; a read failure names the artifact whose origin failed
fn same_content(first: &SourceArtifact, second: &SourceArtifact) -> Result<bool, AssemblyError> {
    let digest = |artifact: &SourceArtifact| {
        file_digest(&artifact.origin).map_err(|source| AssemblyError::StagingFailure {
            artifact: artifact.clone(),
            source,
        })
    };
    Ok(digest(first)? == digest(second)?)
}
