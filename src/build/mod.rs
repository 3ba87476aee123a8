//! Build-tree assembly
//!
//! Registration, dependency resolution and staging of library modules into
//! one build directory.
//!
//! ## Flow
//!
//! 1. **Resolve**: every requested module is resolved depth-first against the
//!    catalog; a shared [`ModuleRegistry`] keeps each module to one admission.
//! 2. **Plan**: artifacts are rooted under the library and build directories
//!    and checked for destination clashes.
//! 3. **Stage**: files are copied in dependency order, skipping fresh copies.
//!
//! Any error aborts the run before a [`BuildManifest`] is produced.

pub mod assembler;
pub mod layout;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod stager;

pub use assembler::BuildGraphAssembler;
pub use layout::{BuildLayout, BuildRequest, Purpose};
pub use manifest::{BuildManifest, StageReport, StagedArtifact};
pub use registry::ModuleRegistry;
pub use resolver::DependencyResolver;
pub use stager::{SourceStager, StageOutcome};
