//! hwstage - hardware module registration and build-tree staging
//!
//! Assembles the source tree of a hardware project from a library of reusable
//! IP modules. Each module declares its dependencies and the source files it
//! contributes; requesting a set of top modules resolves the transitive
//! dependency graph, sets every module up exactly once (dependencies first)
//! and copies its sources into the build directory.
//!
//! ## Layers
//!
//! - [`catalog`]: module descriptors, loaded from `module.toml` files or built in code
//! - [`build`]: dependency resolution, per-purpose layout and staging
//! - [`config`]: project configuration consumed by the `hwstage` tool
//! - [`utils`]: logging setup
//!
//! ## Example
//!
//! ```rust,no_run
//! use hwstage::build::{BuildGraphAssembler, BuildLayout};
//! use hwstage::catalog::{Catalog, ModuleDescriptor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_descriptors([
//!     ModuleDescriptor::new("counter").source("counter.v", "counter.v"),
//!     ModuleDescriptor::new("fifo")
//!         .depends_on("counter")
//!         .source("fifo.v", "fifo.v"),
//! ])?;
//!
//! let assembler = BuildGraphAssembler::new(BuildLayout::flat("lib", "build"));
//! let manifest = assembler.assemble(&["fifo".into()], &catalog)?;
//! assert_eq!(manifest.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod catalog;
pub mod config;
pub mod error;
pub mod utils;

pub use build::{BuildGraphAssembler, BuildLayout, BuildManifest, BuildRequest, Purpose};
pub use catalog::{Catalog, CatalogDiscovery, ModuleDescriptor, ModuleId, SourceArtifact};
pub use config::ProjectConfig;
pub use error::{AssemblyError, CatalogError};
