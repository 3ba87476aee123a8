//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Checked-in sample library under `tests/fixtures/library`
pub fn fixture_library() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/library")
}

/// Temporary library and build directories
pub struct TempLibrary {
    /// Keeps the directories alive
    pub temp_dir: TempDir,
    /// Library root
    pub library_dir: PathBuf,
    /// Build root (not created until something is staged)
    pub build_dir: PathBuf,
}

impl TempLibrary {
    /// Create an empty library with isolated directories
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let library_dir = temp_dir.path().join("lib");
        let build_dir = temp_dir.path().join("build");
        fs::create_dir_all(&library_dir)?;

        Ok(Self {
            temp_dir,
            library_dir,
            build_dir,
        })
    }

    /// Write a module directory with a `module.toml` and one Verilog file per
    /// source name. Returns the module directory.
    pub fn add_module(
        &self,
        dir: &str,
        name: &str,
        dependencies: &[&str],
        sources: &[&str],
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let module_dir = self.library_dir.join(dir);
        fs::create_dir_all(&module_dir)?;

        let deps: Vec<String> = dependencies.iter().map(|d| format!("{:?}", d)).collect();
        let mut manifest = format!(
            "name = {:?}\nversion = \"V0.10\"\ndependencies = [{}]\n",
            name,
            deps.join(", ")
        );
        for source in sources {
            manifest.push_str(&format!("\n[[sources]]\norigin = {:?}\n", source));
            fs::write(module_dir.join(source), verilog_stub(source))?;
        }
        fs::write(module_dir.join("module.toml"), manifest)?;

        Ok(module_dir)
    }

    /// Path of a file under the build root
    pub fn built(&self, relative: &str) -> PathBuf {
        self.build_dir.join(relative)
    }
}

/// Minimal Verilog body named after the file
pub fn verilog_stub(file: &str) -> String {
    let module = file.split('.').next().unwrap_or(file);
    format!("module {};\nendmodule\n", module)
}
