//! Headline extraction from RSS 2.0, RSS 1.0 (RDF) and Atom feeds.
//!
//! The feed is parsed into a flat list of [`FeedEntry`] values first, with
//! `rss` for RSS 2.0 and RDF and `atom_syndication` for Atom. A feed that
//! fails to parse, has an unknown root element, or ends before its elements
//! are closed is malformed and yields no articles at all.
//!
//! Feed entries are trusted for domain and path, so the HTML article filter
//! is not applied. An optional [`ContentFilter`](crate::config::ContentFilter)
//! narrows the built list by title keywords.

use crate::config::{Extraction, MAX_NEWS_PER_SOURCE, SourceConfig};
use crate::error::ExtractError;
use crate::models::Article;
use crate::urls::{is_valid_absolute_url, normalize_url};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, instrument};

/// One `<item>` or `<entry>`, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
}

/// Extract up to [`MAX_NEWS_PER_SOURCE`] articles from a feed document.
#[instrument(level = "debug", skip_all, fields(source = %config.id))]
pub fn extract_articles(xml: &str, config: &SourceConfig) -> Result<Vec<Article>, ExtractError> {
    let entries = parse_feed(xml)?;
    let mut articles = Vec::new();

    for entry in entries.into_iter().take(MAX_NEWS_PER_SOURCE) {
        let title = entry.title.as_deref().map(str::trim).unwrap_or_default();
        let link = entry.link.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            debug!(?entry, "Skipping entry without title or link");
            continue;
        }
        let link = normalize_url(link, config.base_url.as_deref());
        if !is_valid_absolute_url(&link) {
            debug!(%title, %link, "Skipping entry with non-absolute link");
            continue;
        }
        articles.push(Article::new(title, link, config));
    }

    if let Extraction::Feed {
        content_filter: Some(filter),
    } = &config.extraction
    {
        let before = articles.len();
        articles = filter.apply(articles);
        debug!(before, after = articles.len(), "Applied content filter");
    }

    Ok(articles)
}

/// Parse a feed into its entries, in document order.
///
/// The root element picks the format: `rss` and `RDF` go to the `rss`
/// crate, `feed` goes to `atom_syndication`. A document that ends with
/// elements still open is rejected before either parser sees it.
///
/// # Arguments
///
/// * `xml` - The fetched feed document
///
/// # Returns
///
/// Every `<item>` or `<entry>` with its title and alternate link, or
/// [`ExtractError::MalformedFeed`] when the document is not a complete
/// RSS, RDF or Atom feed.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, ExtractError> {
    match root_element(xml)?.as_str() {
        "rss" | "RDF" => {
            let channel = rss::Channel::read_from(xml.as_bytes())
                .map_err(|e| ExtractError::MalformedFeed(format!("rss: {e}")))?;
            Ok(channel
                .items()
                .iter()
                .map(|item| FeedEntry {
                    title: item.title().map(String::from),
                    link: item.link().map(String::from),
                })
                .collect())
        }
        "feed" => {
            let feed = atom_syndication::Feed::read_from(xml.as_bytes())
                .map_err(|e| ExtractError::MalformedFeed(format!("atom: {e}")))?;
            Ok(feed
                .entries()
                .iter()
                .map(|entry| FeedEntry {
                    title: Some(entry.title().value.clone()),
                    link: entry
                        .links()
                        .iter()
                        .find(|link| link.rel() == "alternate" && !link.href().trim().is_empty())
                        .map(|link| link.href().to_string()),
                })
                .collect())
        }
        other => Err(ExtractError::MalformedFeed(format!(
            "root element <{other}> is not rss, feed or RDF"
        ))),
    }
}

/// Local name of the document element, once the whole document is known to
/// be well formed and complete.
fn root_element(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut root = None;
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::MalformedFeed(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => {
                if depth == 0 && root.is_none() {
                    root = Some(local_name(&start));
                }
                depth += 1;
            }
            Event::Empty(start) if depth == 0 && root.is_none() => {
                root = Some(local_name(&start));
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ExtractError::MalformedFeed("document ended inside an element".into()));
    }
    root.ok_or_else(|| ExtractError::MalformedFeed("no root element".into()))
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}
