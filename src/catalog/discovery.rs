//! Catalog discovery
//!
//! Scans a library directory and builds a [`Catalog`] from every
//! `module.toml` found under it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::catalog::manifest::{ModuleManifest, SourceEntry, DEFAULT_SOURCE_TREE, MANIFEST_FILE};
use crate::catalog::validation::{is_contained, DescriptorValidator};
use crate::catalog::Catalog;
use crate::error::CatalogError;

/// Library scanner
#[derive(Debug, Clone)]
pub struct CatalogDiscovery {
    /// Library root to scan
    library_dir: PathBuf,
    validator: DescriptorValidator,
}

impl CatalogDiscovery {
    /// Create a new scanner rooted at `library_dir`
    pub fn new<P: AsRef<Path>>(library_dir: P) -> Self {
        Self {
            library_dir: library_dir.as_ref().to_path_buf(),
            validator: DescriptorValidator::new(),
        }
    }

    /// Library root
    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Discover every module in the library.
    ///
    /// Directories are walked breadth-first, entries sorted by name, so the
    /// same tree always yields the same catalog. Any unreadable or invalid
    /// manifest fails the whole discovery.
    pub fn discover(&self) -> Result<Catalog, CatalogError> {
        debug!("Discovering modules in {:?}", self.library_dir);

        let mut catalog = Catalog::new();
        let mut dirs = vec![self.library_dir.clone()];

        while !dirs.is_empty() {
            let mut next_dirs = Vec::new();
            for dir in dirs {
                let mut entries = read_dir_sorted(&dir)?;

                if entries.iter().any(|p| p.file_name().map_or(false, |n| n == MANIFEST_FILE)) {
                    self.load_module(&dir, &mut catalog)?;
                }

                entries.retain(|p| p.is_dir() && !is_hidden(p));
                next_dirs.extend(entries);
            }
            dirs = next_dirs;
        }

        debug!("Discovered {} modules", catalog.len());
        Ok(catalog)
    }

    fn load_module(&self, dir: &Path, catalog: &mut Catalog) -> Result<(), CatalogError> {
        let mut manifest = ModuleManifest::from_file(dir.join(MANIFEST_FILE))?;
        manifest.sources = expand_sources(&manifest.sources, dir)?;
        let module_dir = dir.strip_prefix(&self.library_dir).unwrap_or(dir);
        let descriptor = manifest.to_descriptor(module_dir);

        self.validator.check(&descriptor)?;
        trace!("Found module {} in {:?}", descriptor.id, module_dir);
        catalog.insert(descriptor)
    }
}

/// Replace directory origins with one entry per file beneath them.
///
/// A manifest without sources stages its module's `hardware/src` tree when
/// present. Files keep their path relative to the expanded directory, under
/// the entry's destination if one is given.
fn expand_sources(sources: &[SourceEntry], module_path: &Path) -> Result<Vec<SourceEntry>, CatalogError> {
    let implicit;
    let sources = if sources.is_empty() && module_path.join(DEFAULT_SOURCE_TREE).is_dir() {
        implicit = [SourceEntry {
            origin: PathBuf::from(DEFAULT_SOURCE_TREE),
            destination: None,
        }];
        &implicit[..]
    } else {
        sources
    };

    let mut expanded = Vec::new();
    for entry in sources {
        let tree = module_path.join(&entry.origin);
        // Escaping origins are left for the validator to report
        if !is_contained(&entry.origin) || !tree.is_dir() {
            expanded.push(entry.clone());
            continue;
        }

        for file in list_files(&tree)? {
            let relative = file.strip_prefix(&tree).unwrap_or(&file).to_path_buf();
            let destination = match &entry.destination {
                Some(prefix) => prefix.join(&relative),
                None => relative.clone(),
            };
            expanded.push(SourceEntry {
                origin: entry.origin.join(&relative),
                destination: Some(destination),
            });
        }
        trace!("Expanded {:?} in {:?}", entry.origin, module_path);
    }
    Ok(expanded)
}

/// Every file under `root`, sorted by path
fn list_files(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        for entry in read_dir_sorted(&dir)? {
            if entry.is_dir() {
                dirs.push(entry);
            } else {
                files.push(entry);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let io_err = |source: std::io::Error| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        entries.push(entry.map_err(io_err)?.path());
    }
    entries.sort();
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with('.'))
}
