//! Command-line interface definitions for HK News Digest.
//!
//! All arguments have defaults, so a bare invocation scrapes the built-in
//! sources and writes `news.json` and `news_summary.txt` to the current
//! directory.

use crate::orchestrator::MergeOrder;
use clap::Parser;

/// Command-line arguments for the HK News Digest application.
///
/// # Examples
///
/// ```sh
/// # Built-in sources, default output files
/// hk_news_digest
///
/// # Custom sources and output locations
/// hk_news_digest -c sources.yaml -j public/news.json -s public/news_summary.txt
///
/// # Emit sources as they finish instead of in declaration order
/// hk_news_digest --merge-order completion
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output path for the JSON digest
    #[arg(short, long, default_value = "news.json")]
    pub json_output: String,

    /// Output path for the plain-text summary
    #[arg(short, long, default_value = "news_summary.txt")]
    pub summary_output: String,

    /// Optional YAML file listing the sources to scrape (replaces the built-in list)
    #[arg(short = 'c', long, env = "NEWS_SOURCES")]
    pub sources: Option<String>,

    /// Order in which per-source results are merged
    #[arg(long, value_enum, default_value_t = MergeOrder::Config)]
    pub merge_order: MergeOrder,
}
