//! Descriptor validation
//!
//! Validates module descriptors for structure before they enter a catalog.

use std::collections::HashSet;
use std::path::{Component, Path};

use tracing::debug;

use crate::catalog::descriptor::ModuleDescriptor;
use crate::error::CatalogError;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Descriptor is valid
    Valid,
    /// Descriptor is invalid with specific errors
    Invalid(Vec<String>),
}

/// Descriptor validator
#[derive(Debug, Clone)]
pub struct DescriptorValidator {
    /// Maximum module name length
    max_name_len: usize,
}

impl Default for DescriptorValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorValidator {
    /// Create a new descriptor validator
    pub fn new() -> Self {
        Self { max_name_len: 64 }
    }

    /// Validate a module descriptor
    pub fn validate(&self, descriptor: &ModuleDescriptor) -> ValidationResult {
        let mut errors = Vec::new();
        let name = descriptor.id.as_str();

        if !self.is_valid_name(name) {
            errors.push(format!(
                "invalid module name: {:?} (must be alphanumeric with dashes/underscores)",
                name
            ));
        }

        if !self.is_valid_version(&descriptor.version) {
            errors.push(format!(
                "invalid version format: {:?} (expected [V]major.minor[.patch])",
                descriptor.version
            ));
        }

        let mut seen = HashSet::new();
        for dep in &descriptor.dependencies {
            if dep == &descriptor.id {
                errors.push(format!("module {} depends on itself", name));
            } else if !seen.insert(dep) {
                errors.push(format!("dependency {} listed more than once", dep));
            }
        }

        if descriptor.sources.is_empty() {
            errors.push("module declares no sources".to_string());
        }
        errors.extend(path_errors(descriptor));

        if errors.is_empty() {
            debug!("Descriptor validation passed for module: {}", name);
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    /// Validate and convert the outcome into a `Result`
    pub fn check(&self, descriptor: &ModuleDescriptor) -> Result<(), CatalogError> {
        match self.validate(descriptor) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(errors) => Err(CatalogError::InvalidDescriptor {
                id: descriptor.id.clone(),
                errors,
            }),
        }
    }

    /// Validate module name format
    #[inline]
    fn is_valid_name(&self, name: &str) -> bool {
        if name.is_empty() || name.len() > self.max_name_len {
            return false;
        }

        // Must start with alphanumeric
        if !name.chars().next().map_or(false, |c| c.is_alphanumeric()) {
            return false;
        }

        name.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }

    /// Validate version format.
    ///
    /// Accepts: [V|v]major.minor[.patch]
    #[inline]
    fn is_valid_version(&self, version: &str) -> bool {
        let version = version
            .strip_prefix('V')
            .or_else(|| version.strip_prefix('v'))
            .unwrap_or(version);

        let nums: Vec<&str> = version.split('.').collect();
        if nums.len() < 2 || nums.len() > 3 {
            return false;
        }

        nums.iter().all(|n| {
            !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) && n.parse::<u32>().is_ok()
        })
    }
}

/// Check only that every origin and destination stays under its root.
///
/// Applied to every descriptor entering a [`crate::catalog::Catalog`], since
/// joining an absolute or `..` path onto a root escapes it.
pub fn check_paths(descriptor: &ModuleDescriptor) -> Result<(), CatalogError> {
    let errors = path_errors(descriptor);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::InvalidDescriptor {
            id: descriptor.id.clone(),
            errors,
        })
    }
}

fn path_errors(descriptor: &ModuleDescriptor) -> Vec<String> {
    let mut errors = Vec::new();
    for artifact in &descriptor.sources {
        if !is_contained(&artifact.origin) {
            errors.push(format!(
                "origin {} must be a relative path inside the library",
                artifact.origin.display()
            ));
        }
        if !is_contained(&artifact.destination) {
            errors.push(format!(
                "destination {} must be a relative path inside the build directory",
                artifact.destination.display()
            ));
        }
    }
    errors
}

/// Relative, non-empty, and never climbs out through `..`
pub(crate) fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ram() -> ModuleDescriptor {
        ModuleDescriptor::new("iob_ram_2p")
            .version("V0.10")
            .source("ram/iob_ram_2p/iob_ram_2p.v", "iob_ram_2p.v")
    }

    #[test]
    fn test_valid_descriptor() {
        assert_eq!(DescriptorValidator::new().validate(&ram()), ValidationResult::Valid);
    }

    #[test]
    fn test_versions() {
        let validator = DescriptorValidator::new();
        for ok in ["1.0", "V0.10", "v2.3.4"] {
            assert!(validator.is_valid_version(ok), "{}", ok);
        }
        for bad in ["", "V", "1", "1.x", "1.2.3.4", "VV1.0"] {
            assert!(!validator.is_valid_version(bad), "{}", bad);
        }
    }

    #[test]
    fn test_names() {
        let validator = DescriptorValidator::new();
        assert!(validator.is_valid_name("iob_reg-2"));
        assert!(!validator.is_valid_name("_iob_reg"));
        assert!(!validator.is_valid_name("iob reg"));
        assert!(!validator.is_valid_name(&"a".repeat(65)));
    }

    #[test]
    fn test_collects_every_error() {
        let descriptor = ModuleDescriptor::new("iob_fifo")
            .version("latest")
            .depends_on("iob_fifo")
            .depends_on("iob_reg")
            .depends_on("iob_reg");

        match DescriptorValidator::new().validate(&descriptor) {
            ValidationResult::Invalid(errors) => assert_eq!(errors.len(), 4, "{:?}", errors),
            ValidationResult::Valid => panic!("expected invalid descriptor"),
        }
    }

    #[test]
    fn test_escaping_paths_rejected() {
        let descriptor = ModuleDescriptor::new("iob_reg")
            .source("../outside.v", "iob_reg.v")
            .source("iob_reg.v", "/abs/iob_reg.v");

        let err = DescriptorValidator::new().check(&descriptor).unwrap_err();
        match err {
            CatalogError::InvalidDescriptor { id, errors } => {
                assert_eq!(id.as_str(), "iob_reg");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
