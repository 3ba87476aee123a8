//! Dependency resolution
//!
//! Depth-first walk of the catalog's dependency graph that admits every
//! dependency before its dependent.

use std::collections::HashSet;

use tracing::trace;

use crate::build::registry::ModuleRegistry;
use crate::catalog::{Catalog, ModuleDescriptor, ModuleId};
use crate::error::AssemblyError;

/// Resolves modules against one catalog
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver over `catalog`
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Admit `id` and its transitive dependencies into `registry`.
    ///
    /// Returns the newly admitted modules, dependencies first. Modules the
    /// registry already holds are skipped, so resolving the same module
    /// twice yields an empty list the second time.
    ///
    /// The walk keeps its own stack of `(descriptor, next dependency)`
    /// frames, so chain depth is bounded by memory, not the thread stack.
    pub fn resolve(
        &self,
        id: &ModuleId,
        registry: &mut ModuleRegistry,
    ) -> Result<Vec<ModuleId>, AssemblyError> {
        let mut order = Vec::new();
        let mut stack: Vec<(&'a ModuleDescriptor, usize)> = Vec::new();
        let mut on_path: HashSet<&'a ModuleId> = HashSet::new();
        let mut pending = Some(id);

        loop {
            if let Some(next) = pending.take() {
                if registry.contains(next) {
                    trace!("{} already resolved", next);
                } else if on_path.contains(next) {
                    return Err(AssemblyError::CyclicDependency(cycle_path(&stack, next)));
                } else {
                    let descriptor = self
                        .catalog
                        .get(next)
                        .ok_or_else(|| AssemblyError::UnknownModule(next.clone()))?;
                    on_path.insert(&descriptor.id);
                    stack.push((descriptor, 0));
                }
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };
            let descriptor = frame.0;
            match descriptor.dependencies.get(frame.1) {
                Some(dep) => {
                    frame.1 += 1;
                    pending = Some(dep);
                }
                None => {
                    stack.pop();
                    on_path.remove(&descriptor.id);
                    if registry.admit(descriptor.id.clone()) {
                        trace!("Admitted {}", descriptor.id);
                        order.push(descriptor.id.clone());
                    }
                }
            }
        }

        Ok(order)
    }
}

/// Active path from the first occurrence of `repeated` through to its repetition
fn cycle_path(stack: &[(&ModuleDescriptor, usize)], repeated: &ModuleId) -> Vec<ModuleId> {
    let start = stack
        .iter()
        .position(|(d, _)| &d.id == repeated)
        .unwrap_or(0);
    stack[start..]
        .iter()
        .map(|(d, _)| d.id.clone())
        .chain(std::iter::once(repeated.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleDescriptor;

    fn module(name: &str, deps: &[&str]) -> ModuleDescriptor {
        deps.iter()
            .fold(ModuleDescriptor::new(name), |d, dep| d.depends_on(*dep))
            .source(format!("{}.v", name), format!("{}.v", name))
    }

    fn names(ids: &[ModuleId]) -> Vec<&str> {
        ids.iter().map(ModuleId::as_str).collect()
    }

    #[test]
    fn test_dependencies_first() {
        let catalog = Catalog::from_descriptors([
            module("iob_reverse", &[]),
            module("iob_prio_enc", &["iob_reverse"]),
            module("iob_arbiter", &["iob_prio_enc", "iob_reg"]),
            module("iob_reg", &[]),
        ])
        .unwrap();

        let mut registry = ModuleRegistry::new();
        let order = DependencyResolver::new(&catalog)
            .resolve(&"iob_arbiter".into(), &mut registry)
            .unwrap();

        assert_eq!(names(&order), vec!["iob_reverse", "iob_prio_enc", "iob_reg", "iob_arbiter"]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_diamond_admits_shared_dependency_once() {
        let catalog = Catalog::from_descriptors([
            module("iob_reg", &[]),
            module("iob_counter", &["iob_reg"]),
            module("iob_fifo_sync", &["iob_reg", "iob_counter"]),
        ])
        .unwrap();

        let mut registry = ModuleRegistry::new();
        let order = DependencyResolver::new(&catalog)
            .resolve(&"iob_fifo_sync".into(), &mut registry)
            .unwrap();
        assert_eq!(names(&order), vec!["iob_reg", "iob_counter", "iob_fifo_sync"]);
    }

    #[test]
    fn test_already_registered_is_skipped() {
        let catalog = Catalog::from_descriptors([module("iob_reg", &[]), module("iob_counter", &["iob_reg"])])
            .unwrap();
        let resolver = DependencyResolver::new(&catalog);
        let mut registry = ModuleRegistry::new();

        assert_eq!(names(&resolver.resolve(&"iob_reg".into(), &mut registry).unwrap()), vec!["iob_reg"]);
        assert_eq!(
            names(&resolver.resolve(&"iob_counter".into(), &mut registry).unwrap()),
            vec!["iob_counter"]
        );
        assert!(resolver.resolve(&"iob_counter".into(), &mut registry).unwrap().is_empty());
    }

    #[test]
    fn test_two_module_cycle() {
        let catalog = Catalog::from_descriptors([module("a", &["b"]), module("b", &["a"])]).unwrap();
        let err = DependencyResolver::new(&catalog)
            .resolve(&"a".into(), &mut ModuleRegistry::new())
            .unwrap_err();

        match err {
            AssemblyError::CyclicDependency(path) => assert_eq!(names(&path), vec!["a", "b", "a"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cycle_path_excludes_entry_prefix() {
        let catalog =
            Catalog::from_descriptors([module("top", &["a"]), module("a", &["b"]), module("b", &["a"])]).unwrap();
        let err = DependencyResolver::new(&catalog)
            .resolve(&"top".into(), &mut ModuleRegistry::new())
            .unwrap_err();

        match err {
            AssemblyError::CyclicDependency(path) => assert_eq!(names(&path), vec!["a", "b", "a"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_deep_chain_resolves() {
        let depth = 10_000;
        let catalog = Catalog::from_descriptors((0..depth).map(|i| {
            let name = format!("m{}", i);
            if i == 0 {
                module(&name, &[])
            } else {
                module(&name, &[format!("m{}", i - 1).as_str()])
            }
        }))
        .unwrap();

        let mut registry = ModuleRegistry::new();
        let order = DependencyResolver::new(&catalog)
            .resolve(&ModuleId::new(format!("m{}", depth - 1)), &mut registry)
            .unwrap();

        assert_eq!(order.len(), depth);
        assert_eq!(order[0].as_str(), "m0");
        assert_eq!(order[depth - 1].as_str(), format!("m{}", depth - 1));
    }

    #[test]
    fn test_deep_cycle_reports_full_path() {
        let depth = 5_000;
        let catalog = Catalog::from_descriptors((0..depth).map(|i| {
            let dep = format!("m{}", (i + 1) % depth);
            module(&format!("m{}", i), &[dep.as_str()])
        }))
        .unwrap();

        let err = DependencyResolver::new(&catalog)
            .resolve(&"m0".into(), &mut ModuleRegistry::new())
            .unwrap_err();
        match err {
            AssemblyError::CyclicDependency(path) => {
                assert_eq!(path.len(), depth + 1);
                assert_eq!(path.first(), path.last());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unknown_dependency() {
        let catalog = Catalog::from_descriptors([module("iob_ram_2p_tiled", &["iob_ram_2p"])]).unwrap();
        let err = DependencyResolver::new(&catalog)
            .resolve(&"iob_ram_2p_tiled".into(), &mut ModuleRegistry::new())
            .unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownModule(id) if id.as_str() == "iob_ram_2p"));
    }
}
