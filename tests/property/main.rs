//! Property tests for assembly invariants
//!
//! Catalogs are generated acyclic: module `m{i}` may only depend on modules
//! with a smaller index.

use std::collections::{HashMap, HashSet};
use std::fs;

use hwstage::build::{BuildGraphAssembler, BuildLayout, BuildRequest};
use hwstage::catalog::{Catalog, ModuleDescriptor, ModuleId};
use proptest::prelude::*;
use proptest::sample::Index;
use tempfile::TempDir;

fn name(i: usize) -> String {
    format!("m{}", i)
}

fn build_catalog(deps: &[Vec<Index>]) -> Catalog {
    let descriptors = deps.iter().enumerate().map(|(i, picks)| {
        let file = format!("{}.v", name(i));
        let mut descriptor = ModuleDescriptor::new(name(i)).source(file.clone(), file);
        if i > 0 {
            let mut seen = HashSet::new();
            for pick in picks {
                let dep = pick.index(i);
                if seen.insert(dep) {
                    descriptor = descriptor.depends_on(name(dep));
                }
            }
        }
        descriptor
    });
    Catalog::from_descriptors(descriptors).unwrap()
}

fn closure(catalog: &Catalog, roots: &[ModuleId]) -> HashSet<ModuleId> {
    let mut seen = HashSet::new();
    let mut stack: Vec<ModuleId> = roots.to_vec();
    while let Some(id) = stack.pop() {
        if seen.insert(id.clone()) {
            stack.extend(catalog.get(&id).unwrap().dependencies.iter().cloned());
        }
    }
    seen
}

fn graph() -> impl Strategy<Value = (Vec<Vec<Index>>, Vec<Index>)> {
    (
        prop::collection::vec(prop::collection::vec(any::<Index>(), 0..4), 1..16),
        prop::collection::vec(any::<Index>(), 1..5),
    )
}

proptest! {
    #[test]
    fn test_resolution_order_invariants((deps, picks) in graph()) {
        let catalog = build_catalog(&deps);
        let requested: Vec<ModuleId> = picks.iter().map(|p| ModuleId::new(name(p.index(deps.len())))).collect();

        let assembler = BuildGraphAssembler::new(BuildLayout::flat("lib", "build"));
        let order: Vec<ModuleId> = assembler
            .resolve(&BuildRequest::hardware(requested.iter().cloned()), &catalog)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        // Each module at most once
        let positions: HashMap<&ModuleId, usize> = order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        prop_assert_eq!(positions.len(), order.len());

        // Dependencies before dependents
        for (i, id) in order.iter().enumerate() {
            for dep in &catalog.get(id).unwrap().dependencies {
                let at = positions.get(dep).copied();
                prop_assert!(at.map_or(false, |p| p < i), "{} emitted before its dependency {}", id, dep);
            }
        }

        // Exactly the transitive closure
        let emitted: HashSet<ModuleId> = order.iter().cloned().collect();
        prop_assert_eq!(emitted, closure(&catalog, &requested));
    }

    #[test]
    fn test_resolution_is_deterministic((deps, picks) in graph()) {
        let catalog = build_catalog(&deps);
        let request = BuildRequest::hardware(picks.iter().map(|p| name(p.index(deps.len()))));
        let assembler = BuildGraphAssembler::new(BuildLayout::flat("lib", "build"));

        prop_assert_eq!(
            assembler.resolve(&request, &catalog).unwrap(),
            assembler.resolve(&request, &catalog).unwrap()
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_staging_is_idempotent((deps, picks) in graph()) {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("lib");
        let build = dir.path().join("build");
        fs::create_dir_all(&lib).unwrap();
        for i in 0..deps.len() {
            fs::write(lib.join(format!("{}.v", name(i))), format!("module {};\nendmodule\n", name(i))).unwrap();
        }

        let catalog = build_catalog(&deps);
        let requested: Vec<ModuleId> = picks.iter().map(|p| ModuleId::new(name(p.index(deps.len())))).collect();
        let assembler = BuildGraphAssembler::new(BuildLayout::flat(&lib, &build));

        let first = assembler.assemble(&requested, &catalog).unwrap();
        prop_assert_eq!(first.report().copied, first.len());
        for destination in first.destinations() {
            prop_assert!(destination.exists());
        }

        let second = assembler.assemble(&requested, &catalog).unwrap();
        prop_assert_eq!(second.report().copied, 0);
        prop_assert_eq!(&first, &second);
    }
}
