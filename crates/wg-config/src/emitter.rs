//! Config file emission with owner-only permissions.

use crate::record::ConfigRecord;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Failed to write config: {0}")]
    Write(#[from] std::io::Error),
}

/// Write the record's config file into `dir`, mode 0600, returning the path.
///
/// The file contains a private key, so group/world access is never granted.
/// Paths are unique per (region, endpoint), so concurrent emits need no
/// coordination.
pub fn emit(record: &ConfigRecord, dir: &Path) -> Result<PathBuf, EmitError> {
    let path = dir.join(record.file_name());

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(&path)?;
    file.write_all(record.render().as_bytes())?;

    info!(path = %path.display(), "Wrote config");
    Ok(path)
}
