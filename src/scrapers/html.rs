//! Headline extraction from HTML listing pages.
//!
//! Candidates are picked with the source's [`SelectionRule`](crate::config::SelectionRule).
//! The title is the element's full text; the link is the element's own
//! `href`, or the `href` of the nearest enclosing `<a>` when the element is
//! not a link itself (e.g. an `<h2>` inside a card anchor).

use crate::config::{MAX_NEWS_PER_SOURCE, SelectionRule, SourceConfig};
use crate::error::ExtractError;
use crate::filter::accept;
use crate::models::Article;
use crate::urls::normalize_url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Extract up to [`MAX_NEWS_PER_SOURCE`] articles from `html`, in document order.
///
/// Rejected candidates are skipped; a link already emitted by this call is
/// skipped too. Scanning stops as soon as the cap is reached.
///
/// # Arguments
///
/// * `html` - The fetched listing page
/// * `rule` - Which elements are headline candidates
/// * `config` - The source, for filtering and stamping articles
///
/// # Returns
///
/// The accepted articles, or [`ExtractError::Selector`] if `rule` is not a
/// valid CSS selector.
#[instrument(level = "debug", skip_all, fields(source = %config.id))]
pub fn extract_articles(
    html: &str,
    rule: &SelectionRule,
    config: &SourceConfig,
) -> Result<Vec<Article>, ExtractError> {
    let selector_text = rule.selector_text();
    let selector = Selector::parse(selector_text).map_err(|e| ExtractError::Selector {
        selector: selector_text.to_string(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let mut articles = Vec::new();
    let mut seen_links: HashSet<String> = HashSet::new();

    for element in document.select(&selector) {
        if articles.len() >= MAX_NEWS_PER_SOURCE {
            break;
        }

        let title = element.text().collect::<String>();
        let title = title.trim();
        let href = link_target(element).unwrap_or_default();
        let link = normalize_url(href.trim(), config.base_url.as_deref());

        if !accept(title, &link, config) {
            debug!(%title, %link, "Rejected candidate");
            continue;
        }
        if !seen_links.insert(link.clone()) {
            continue;
        }
        articles.push(Article::new(title, link, config));
    }

    Ok(articles)
}

/// The `href` of `element` if it is a link, else of its nearest `<a>` ancestor.
fn link_target(element: ElementRef<'_>) -> Option<&str> {
    if is_link(element) {
        return element.value().attr("href");
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| is_link(*ancestor))
        .and_then(|ancestor| ancestor.value().attr("href"))
}

fn is_link(element: ElementRef<'_>) -> bool {
    element.value().name() == "a" && element.value().attr("href").is_some()
}
