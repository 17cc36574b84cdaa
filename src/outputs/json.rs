//! JSON output of the run digest.
//!
//! The file is pretty-printed with two-space indentation and non-ASCII text
//! (Chinese titles and categories) written as-is rather than escaped.

use super::ensure_parent_dir;
use crate::error::OutputError;
use crate::models::Digest;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `digest` to `path`, creating parent directories as needed.
///
/// # Arguments
///
/// * `digest` - The merged run result
/// * `path` - Destination file, overwritten if it exists
///
/// # Returns
///
/// `Ok(())` once the file is written, or [`OutputError`] if serialization
/// or any filesystem step fails.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_digest(digest: &Digest, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(digest)?;

    ensure_parent_dir(path).await?;
    fs::write(path, json).await.map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(total_count = digest.total_count, "Wrote JSON digest");
    Ok(())
}
