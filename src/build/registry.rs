//! Module registry
//!
//! The set of modules admitted into one assembly run.

use std::collections::HashSet;

use crate::catalog::ModuleId;

/// Deduplicating set of admitted modules.
///
/// Created empty per run, only ever grows. Admission order is kept so the
/// registry can be listed deterministically.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    admitted: HashSet<ModuleId>,
    order: Vec<ModuleId>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id` if absent. Returns false, with no side effect, if it was
    /// already admitted.
    pub fn admit(&mut self, id: ModuleId) -> bool {
        if self.admitted.contains(&id) {
            return false;
        }
        self.admitted.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Whether `id` has been admitted
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.admitted.contains(id)
    }

    /// Number of admitted modules
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing was admitted yet
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Admitted modules in admission order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleId> {
        self.order.iter()
    }
}
