//! Module catalog
//!
//! The static mapping from module identifier to descriptor. A catalog is
//! either built in code or discovered from `module.toml` files under a
//! library directory; it is never mutated during assembly.

pub mod descriptor;
pub mod discovery;
pub mod manifest;
pub mod validation;

use std::collections::BTreeMap;

pub use descriptor::{ModuleDescriptor, ModuleId, SourceArtifact};
pub use discovery::CatalogDiscovery;
pub use manifest::{ModuleManifest, SourceEntry, DEFAULT_SOURCE_TREE, MANIFEST_FILE};
pub use validation::{check_paths, DescriptorValidator, ValidationResult};

use crate::error::CatalogError;

/// Identifier to descriptor map, iterated in identifier order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    modules: BTreeMap<ModuleId, ModuleDescriptor>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors, rejecting duplicate identifiers
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    /// Add a descriptor. Fails if its identifier is already present or a
    /// source path would escape the library or build directory.
    pub fn insert(&mut self, descriptor: ModuleDescriptor) -> Result<(), CatalogError> {
        check_paths(&descriptor)?;
        if self.modules.contains_key(&descriptor.id) {
            return Err(CatalogError::DuplicateModule(descriptor.id));
        }
        self.modules.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    /// Look up a descriptor
    pub fn get(&self, id: &ModuleId) -> Option<&ModuleDescriptor> {
        self.modules.get(id)
    }

    /// Whether `id` has an entry
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the catalog has no modules
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Descriptors in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }
}
