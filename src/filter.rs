//! Candidate acceptance rules.
//!
//! [`accept`] gates HTML candidates against a source's rules with exact,
//! case-sensitive substring matching. [`ContentFilter::keeps`] is the
//! keyword pass over feed titles and matches case-insensitively.

use crate::config::{ContentFilter, SourceConfig};
use crate::models::Article;
use crate::urls::is_valid_absolute_url;

/// Decide whether an HTML candidate becomes an article.
///
/// Checks run cheapest first and stop at the first failure: title length,
/// excluded title fragments, required domain and path fragments, then
/// absolute-URL validity. Pure and total.
pub fn accept(title: &str, link: &str, config: &SourceConfig) -> bool {
    if title.is_empty() || title.chars().count() < config.min_title_length {
        return false;
    }
    if config
        .exclude_titles
        .iter()
        .any(|exclude| title.contains(exclude.as_str()))
    {
        return false;
    }
    if let Some(domain) = &config.domain_must_contain {
        if !link.contains(domain.as_str()) {
            return false;
        }
    }
    if let Some(path) = &config.path_must_contain {
        if !link.contains(path.as_str()) {
            return false;
        }
    }
    is_valid_absolute_url(link)
}

impl ContentFilter {
    /// True when `title` survives the exclude and require keyword lists.
    pub fn keeps(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        let contains = |keyword: &String| title.contains(&keyword.to_lowercase());

        if self.exclude_any.iter().any(contains) {
            return false;
        }
        self.require_any.is_empty() || self.require_any.iter().any(contains)
    }

    /// Keep the articles whose titles pass [`keeps`](Self::keeps), in order.
    pub fn apply(&self, articles: Vec<Article>) -> Vec<Article> {
        articles
            .into_iter()
            .filter(|article| self.keeps(&article.title))
            .collect()
    }
}
