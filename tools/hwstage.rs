//! `hwstage` - assemble hardware build trees from a module library
//!
//! ```text
//! USAGE:
//!   hwstage assemble --config project.toml [--dry-run]
//!   hwstage resolve --library <dir> <MODULE>...
//!   hwstage list --library <dir>
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use hwstage::build::{BuildGraphAssembler, BuildLayout, BuildRequest};
use hwstage::catalog::CatalogDiscovery;
use hwstage::config::{LoggingConfig, ProjectConfig};
use hwstage::utils::{init_logging, init_logging_from_config};

#[derive(Parser)]
#[command(name = "hwstage", about = "Hardware module staging tool", version)]
struct Cli {
    /// Log filter (e.g. "debug", "hwstage=trace"); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Resolve the project's modules and stage their sources.
    Assemble {
        /// Project configuration (TOML or JSON).
        #[arg(short, long, default_value = "project.toml")]
        config: PathBuf,
        /// Resolve only and print the module order.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the dependency-first order of the given modules.
    Resolve {
        /// Library root.
        #[arg(short, long)]
        library: PathBuf,
        /// Top-level modules.
        #[arg(required = true)]
        modules: Vec<String>,
    },
    /// List the modules of a library.
    List {
        /// Library root.
        #[arg(short, long)]
        library: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Cmd::Assemble { config, dry_run } => {
            let project = ProjectConfig::from_file(&config)?;
            let logging = match cli.log {
                Some(filter) => Some(LoggingConfig {
                    filter: Some(filter),
                    json_format: project.logging.as_ref().map_or(false, |l| l.json_format),
                }),
                None => project.logging.clone(),
            };
            init_logging_from_config(logging.as_ref());
            cmd_assemble(&project, dry_run)?
        }
        Cmd::Resolve { library, modules } => {
            init_logging(cli.log.as_deref());
            cmd_resolve(&library, &modules)?
        }
        Cmd::List { library } => {
            init_logging(cli.log.as_deref());
            cmd_list(&library)?
        }
    }

    Ok(())
}

fn cmd_assemble(project: &ProjectConfig, dry_run: bool) -> Result<()> {
    let catalog = CatalogDiscovery::new(project.library_dir())
        .discover()
        .context("Failed to load module library")?;
    info!("Loaded {} modules from {}", catalog.len(), project.library_dir().display());

    let request = project.request();
    anyhow::ensure!(!request.is_empty(), "No modules requested in [modules]");

    let assembler = BuildGraphAssembler::new(project.layout());

    if dry_run {
        for (id, purpose) in assembler.resolve(&request, &catalog)? {
            println!("{:<12} {}", purpose, id);
        }
        return Ok(());
    }

    let manifest = assembler.assemble_request(&request, &catalog)?;
    let build_dir = assembler.layout().build_dir();
    std::fs::create_dir_all(build_dir)
        .with_context(|| format!("Failed to create {}", build_dir.display()))?;

    if let Some(path) = project.manifest.json_path(build_dir) {
        manifest
            .write_json(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = project.manifest.source_list_path(build_dir) {
        manifest
            .write_source_list(&path, build_dir)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let report = manifest.report();
    info!(
        "Staged {} modules into {} ({} copied, {} up to date)",
        manifest.modules().len(),
        build_dir.display(),
        report.copied,
        report.fresh
    );
    println!(
        "{}: {} artifacts, {} copied, {} up to date",
        project.name,
        manifest.len(),
        report.copied,
        report.fresh
    );
    Ok(())
}

fn cmd_resolve(library: &Path, modules: &[String]) -> Result<()> {
    let catalog = CatalogDiscovery::new(library).discover()?;
    // Nothing is staged, so the build root is irrelevant
    let assembler = BuildGraphAssembler::new(BuildLayout::flat(library, library));

    let request = BuildRequest::hardware(modules.iter().map(String::as_str));
    for (id, _) in assembler.resolve(&request, &catalog)? {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_list(library: &Path) -> Result<()> {
    let catalog = CatalogDiscovery::new(library).discover()?;

    println!("Modules: {}", catalog.len());
    for descriptor in catalog.iter() {
        let deps: Vec<&str> = descriptor.dependencies.iter().map(|d| d.as_str()).collect();
        println!(
            "  {:<24} {:<8} {} sources  deps: [{}]",
            descriptor.id.as_str(),
            descriptor.version,
            descriptor.sources.len(),
            deps.join(", ")
        );
        if let Some(description) = &descriptor.description {
            println!("    {}", description);
        }
    }
    Ok(())
}
