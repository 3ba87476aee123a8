//! Source staging
//!
//! Copies artifacts from the library into the build directory with
//! make-style up-to-date semantics.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::catalog::SourceArtifact;
use crate::error::AssemblyError;

/// What staging did for one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Destination was written
    Copied,
    /// Destination already matched the origin
    Fresh,
}

/// Copies artifacts whose paths are already rooted (see
/// [`crate::build::BuildLayout::resolve`])
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceStager;

impl SourceStager {
    /// Create a stager
    pub fn new() -> Self {
        Self
    }

    /// Copy `artifact.origin` to `artifact.destination` unless the
    /// destination is already up to date.
    pub fn stage(&self, artifact: &SourceArtifact) -> Result<StageOutcome, AssemblyError> {
        let failure = |source: io::Error| AssemblyError::StagingFailure {
            artifact: artifact.clone(),
            source,
        };

        if is_fresh(&artifact.origin, &artifact.destination).map_err(failure)? {
            trace!("{} is up to date", artifact.destination.display());
            return Ok(StageOutcome::Fresh);
        }

        if let Some(parent) = artifact.destination.parent() {
            fs::create_dir_all(parent).map_err(failure)?;
        }
        fs::copy(&artifact.origin, &artifact.destination).map_err(failure)?;
        trace!("Staged {}", artifact);
        Ok(StageOutcome::Copied)
    }
}

/// Destination exists with the origin's length and is either not older than
/// the origin or has identical content.
///
/// Errors only when the origin cannot be read; an unreadable destination
/// counts as stale so the copy reports the real failure.
pub fn is_fresh(origin: &Path, destination: &Path) -> io::Result<bool> {
    let origin_meta = fs::metadata(origin)?;
    if !origin_meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", origin.display()),
        ));
    }

    let destination_meta = match fs::metadata(destination) {
        Ok(meta) => meta,
        Err(_) => return Ok(false),
    };
    if !destination_meta.is_file() || destination_meta.len() != origin_meta.len() {
        return Ok(false);
    }

    if let (Ok(origin_time), Ok(destination_time)) = (origin_meta.modified(), destination_meta.modified()) {
        if destination_time >= origin_time {
            return Ok(true);
        }
    }

    let origin_digest = file_digest(origin)?;
    Ok(file_digest(destination).map_or(false, |d| d == origin_digest))
}

/// Hex SHA-256 of a file's content
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
