//! Plain-text digest for quick reading.
//!
//! Articles are grouped by source in the order each source first appears in
//! the digest, then numbered within the group.

use super::ensure_parent_dir;
use crate::error::OutputError;
use crate::models::{Article, Digest};
use itertools::Itertools;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render the text summary.
pub fn render_summary(digest: &Digest) -> String {
    let rule = "=".repeat(60);
    let thin = "-".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "News digest");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Updated: {}", digest.update_time);
    let _ = writeln!(out, "Total articles: {}", digest.total_count);
    let _ = writeln!(out);

    let groups = digest.news.iter().into_group_map_by(|a| a.source.as_str());
    let order = digest.news.iter().map(|a| a.source.as_str()).unique();
    for source in order {
        let items: &[&Article] = groups.get(source).map(Vec::as_slice).unwrap_or_default();
        let _ = writeln!(out, "\n{source} ({} articles)", items.len());
        let _ = writeln!(out, "{thin}");
        for (i, article) in items.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, article.title);
            let _ = writeln!(out, "   {}\n", article.link);
        }
    }
    out
}

/// Write the text summary to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_summary(digest: &Digest, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    ensure_parent_dir(path).await?;
    fs::write(path, render_summary(digest))
        .await
        .map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
    info!("Wrote text summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, link: &str, source: &str) -> Article {
        Article {
            title: title.into(),
            link: link.into(),
            source: source.into(),
            category: "科技".into(),
            scraped_at: "2025-05-06 20:30:00".into(),
        }
    }

    #[test]
    fn test_render_groups_by_first_appearance() {
        let digest = Digest::new(
            vec![
                article("U1", "https://unwire.hk/1", "Unwire.hk"),
                article("H1", "https://holidaysmart.io/1", "HolidaySmart"),
                article("U2", "https://unwire.hk/2", "Unwire.hk"),
            ],
            "2025-05-06 20:30:01",
        );
        let text = render_summary(&digest);
        assert!(text.contains("Updated: 2025-05-06 20:30:01"));
        assert!(text.contains("Total articles: 3"));

        let unwire = text.find("Unwire.hk (2 articles)").unwrap();
        let holiday = text.find("HolidaySmart (1 articles)").unwrap();
        assert!(unwire < holiday);
        assert!(text.contains("2. U2\n   https://unwire.hk/2\n"));
    }

    #[test]
    fn test_render_empty_digest() {
        let text = render_summary(&Digest::new(vec![], "2025-05-06 20:30:01"));
        assert!(text.contains("Total articles: 0"));
        assert!(!text.contains("articles)"));
    }

    #[tokio::test]
    async fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("news_summary.txt");
        let digest = Digest::new(vec![article("U1", "https://unwire.hk/1", "Unwire.hk")], "now");
        write_summary(&digest, &path).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("1. U1"));
    }
}
