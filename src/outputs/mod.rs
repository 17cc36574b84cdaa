//! Output generation for the run digest.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`Digest`](crate::models::Digest) to `news.json` for
//!   downstream consumers
//! - [`summary`]: writes a plain-text digest grouped by source for reading
//!
//! # Output Structure
//!
//! ```text
//! news.json
//! {
//!   "update_time": "2025-05-06 20:30:00",
//!   "total_count": 2,
//!   "sources": ["HolidaySmart", "Unwire.hk"],
//!   "categories": ["旅遊", "科技"],
//!   "news": [
//!     {"title": "...", "link": "...", "source": "...", "category": "...", "scraped_at": "..."}
//!   ]
//! }
//! ```

pub mod json;
pub mod summary;

use crate::error::OutputError;
use std::path::Path;
use tokio::fs;

/// Create the parent directory of `path` if it has one.
async fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await.map_err(|source| OutputError::Io {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}
