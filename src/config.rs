//! Source configuration.
//!
//! Every source is described by an immutable [`SourceConfig`]. A validated,
//! ordered collection of them ([`SourceSet`]) is built once at startup,
//! either from the built-in defaults or from a YAML file, and handed to the
//! orchestrator. Declaration order is the merge order of the final digest.

use crate::error::ConfigError;
use crate::urls::is_valid_absolute_url;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, instrument};

/// Maximum number of articles a single source may contribute per run.
pub const MAX_NEWS_PER_SOURCE: usize = 15;
/// Per-attempt request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Total attempts per URL (first try included).
pub const MAX_ATTEMPTS: u32 = 3;
/// Delay unit between attempts; attempt `n` waits `n * RETRY_DELAY`.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
/// Number of sources fetched at the same time.
pub const MAX_CONCURRENT_SOURCES: usize = 3;
/// Civil-time offset (hours east of UTC) used for every timestamp.
pub const TIMEZONE_OFFSET_HOURS: i32 = 8;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// How candidate elements are picked out of an HTML listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Every `<a>` element carrying an `href`.
    #[default]
    AllAnchors,
    /// Elements matching a CSS selector. A match that is not itself a link
    /// takes its target from the nearest enclosing `<a href>`.
    Css(String),
}

impl SelectionRule {
    /// CSS selector text this rule evaluates to.
    pub fn selector_text(&self) -> &str {
        match self {
            SelectionRule::AllAnchors => "a[href]",
            SelectionRule::Css(selector) => selector,
        }
    }
}

/// Keyword filter applied to feed article titles.
///
/// Keywords are matched case-insensitively. An article is kept when none of
/// `exclude_any` occurs in its title and, if `require_any` is non-empty, at
/// least one of `require_any` does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentFilter {
    #[serde(default)]
    pub require_any: Vec<String>,
    #[serde(default)]
    pub exclude_any: Vec<String>,
}

impl ContentFilter {
    pub fn new<I, J, S>(require_any: I, exclude_any: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            require_any: require_any.into_iter().map(Into::into).collect(),
            exclude_any: exclude_any.into_iter().map(Into::into).collect(),
        }
    }
}

/// Extraction path for a source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// HTML listing page scanned with a selection rule and the article filter.
    Html {
        #[serde(default)]
        selection: SelectionRule,
    },
    /// RSS or Atom feed, optionally narrowed by a keyword filter.
    Feed {
        #[serde(default)]
        content_filter: Option<ContentFilter>,
    },
}

impl Default for Extraction {
    fn default() -> Self {
        Extraction::Html {
            selection: SelectionRule::AllAnchors,
        }
    }
}

/// Static descriptor of one news source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub id: String,
    pub fetch_url: String,
    #[serde(default)]
    pub fallback_url: Option<String>,
    pub source_name: String,
    pub category: String,
    #[serde(default)]
    pub min_title_length: usize,
    #[serde(default)]
    pub exclude_titles: Vec<String>,
    #[serde(default)]
    pub domain_must_contain: Option<String>,
    #[serde(default)]
    pub path_must_contain: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(flatten)]
    pub extraction: Extraction,
}

impl SourceConfig {
    /// A bare HTML source with no filters beyond the defaults.
    pub fn html(
        id: impl Into<String>,
        fetch_url: impl Into<String>,
        source_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            fetch_url: fetch_url.into(),
            fallback_url: None,
            source_name: source_name.into(),
            category: category.into(),
            min_title_length: 0,
            exclude_titles: Vec::new(),
            domain_must_contain: None,
            path_must_contain: None,
            base_url: None,
            extraction: Extraction::default(),
        }
    }

    /// A bare feed source without a content filter.
    pub fn feed(
        id: impl Into<String>,
        fetch_url: impl Into<String>,
        source_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            extraction: Extraction::Feed {
                content_filter: None,
            },
            ..Self::html(id, fetch_url, source_name, category)
        }
    }

    pub fn is_feed(&self) -> bool {
        matches!(self.extraction, Extraction::Feed { .. })
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyId { index });
        }
        let required = [
            ("fetch_url", &self.fetch_url),
            ("source_name", &self.source_name),
            ("category", &self.category),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    id: self.id.clone(),
                    field,
                });
            }
        }

        let urls = [
            ("fetch_url", Some(&self.fetch_url)),
            ("fallback_url", self.fallback_url.as_ref()),
            ("base_url", self.base_url.as_ref()),
        ];
        for (field, url) in urls {
            if let Some(url) = url {
                if !is_valid_absolute_url(url) {
                    return Err(ConfigError::InvalidUrl {
                        id: self.id.clone(),
                        field,
                        url: url.clone(),
                    });
                }
            }
        }

        if let Extraction::Html { selection } = &self.extraction {
            let text = selection.selector_text();
            Selector::parse(text).map_err(|e| ConfigError::InvalidSelector {
                id: self.id.clone(),
                selector: text.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Validated, ordered, read-only collection of sources.
#[derive(Debug, Clone)]
pub struct SourceSet {
    sources: Vec<SourceConfig>,
}

impl SourceSet {
    /// Validate every source and freeze the set.
    pub fn new(sources: Vec<SourceConfig>) -> Result<Self, ConfigError> {
        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        let mut ids = HashSet::new();
        for (index, source) in sources.iter().enumerate() {
            source.validate(index)?;
            if !ids.insert(source.id.as_str()) {
                return Err(ConfigError::DuplicateId(source.id.clone()));
            }
        }
        Ok(Self { sources })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.id == id)
    }
}

/// Parse a YAML list of sources and validate it.
pub fn parse_sources(yaml: &str, path: &str) -> Result<SourceSet, ConfigError> {
    let sources: Vec<SourceConfig> =
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
    SourceSet::new(sources)
}

/// Load the source set from `path`, or fall back to the built-in defaults.
#[instrument(level = "info")]
pub fn load_sources(path: Option<&str>) -> Result<SourceSet, ConfigError> {
    let Some(path) = path else {
        let set = default_sources()?;
        info!(count = set.len(), "Using built-in sources");
        return Ok(set);
    };
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let set = parse_sources(&yaml, path)?;
    info!(count = set.len(), %path, "Loaded sources from file");
    Ok(set)
}

/// Built-in sources, in digest order.
pub fn default_sources() -> Result<SourceSet, ConfigError> {
    let unwire = SourceConfig {
        min_title_length: 12,
        domain_must_contain: Some("unwire.hk".into()),
        path_must_contain: Some("/20".into()),
        ..SourceConfig::html("unwire", "https://unwire.hk/", "Unwire.hk", "科技")
    };

    let newmobilelife = SourceConfig {
        fallback_url: Some("https://www.newmobilelife.com/最新文章/".into()),
        min_title_length: 12,
        exclude_titles: vec!["Read More".into(), "更多".into()],
        domain_must_contain: Some("newmobilelife.com/20".into()),
        ..SourceConfig::html(
            "newmobilelife",
            "https://www.newmobilelife.com/",
            "NewMobileLife",
            "科技",
        )
    };

    let holidaysmart = SourceConfig {
        min_title_length: 12,
        exclude_titles: [
            "HolidaySmart 假期日常",
            "HolidaySmart",
            "更多",
            "詳情",
            "了解更多",
            "查看更多",
            "Read More",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        path_must_contain: Some("/hk/article/".into()),
        base_url: Some("https://holidaysmart.io".into()),
        ..SourceConfig::html(
            "holidaysmart",
            "https://holidaysmart.io/hk",
            "HolidaySmart",
            "旅遊",
        )
    };

    let meethk = SourceConfig {
        extraction: Extraction::Feed {
            content_filter: Some(ContentFilter::new(
                ["機票", "優惠", "飛", "來回"],
                [
                    "Hotels.com",
                    "Trip.com",
                    "Expedia",
                    "Agoda",
                    "Booking.com",
                    "Klook",
                    "KKday",
                    "Staycation",
                    "Club Med",
                    "酒店",
                    "每日更新",
                    "一定要bookmark",
                    "HopeGoo",
                    "信用卡",
                ],
            )),
        },
        ..SourceConfig::feed(
            "meethk",
            "https://www.meethk.com/category/flight/feed/",
            "MeetHK",
            "機票",
        )
    };

    SourceSet::new(vec![unwire, newmobilelife, holidaysmart, meethk])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_are_valid_and_ordered() {
        let set = default_sources().unwrap();
        let ids: Vec<&str> = set.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["unwire", "newmobilelife", "holidaysmart", "meethk"]);
        assert!(set.get("meethk").unwrap().is_feed());
        assert!(!set.get("unwire").unwrap().is_feed());
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(SourceSet::new(vec![]), Err(ConfigError::NoSources)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let a = SourceConfig::html("dup", "https://a.com", "A", "x");
        let b = SourceConfig::html("dup", "https://b.com", "B", "x");
        let err = SourceSet::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId(id) if id == "dup"));
    }

    #[test]
    fn test_missing_label_rejected() {
        let source = SourceConfig::html("a", "https://a.com", "", "x");
        let err = SourceSet::new(vec![source]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "source_name",
                ..
            }
        ));
    }

    #[test]
    fn test_relative_fetch_url_rejected() {
        let source = SourceConfig::html("a", "/news", "A", "x");
        let err = SourceSet::new(vec![source]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                field: "fetch_url",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_selector_rejected() {
        let source = SourceConfig {
            extraction: Extraction::Html {
                selection: SelectionRule::Css("h2[[".into()),
            },
            ..SourceConfig::html("a", "https://a.com", "A", "x")
        };
        let err = SourceSet::new(vec![source]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSelector { .. }));
    }

    #[test]
    fn test_parse_sources_from_yaml() {
        let yaml = r#"
- id: tech
  fetch_url: https://tech.example.com/
  fallback_url: https://tech.example.com/latest/
  source_name: Tech
  category: 科技
  min_title_length: 10
  path_must_contain: /20
  kind: html
  selection:
    css: h2.entry-title
- id: deals
  fetch_url: https://deals.example.com/feed/
  source_name: Deals
  category: 旅遊
  kind: feed
  content_filter:
    require_any: [優惠]
    exclude_any: [酒店]
"#;
        let set = parse_sources(yaml, "sources.yaml").unwrap();
        assert_eq!(set.len(), 2);

        let tech = set.get("tech").unwrap();
        assert_eq!(tech.min_title_length, 10);
        assert_eq!(
            tech.fallback_url.as_deref(),
            Some("https://tech.example.com/latest/")
        );
        assert_eq!(
            tech.extraction,
            Extraction::Html {
                selection: SelectionRule::Css("h2.entry-title".into())
            }
        );

        let deals = set.get("deals").unwrap();
        assert_eq!(
            deals.extraction,
            Extraction::Feed {
                content_filter: Some(ContentFilter::new(["優惠"], ["酒店"]))
            }
        );
    }

    #[test]
    fn test_yaml_missing_required_field_is_config_error() {
        let yaml = "- id: a\n  source_name: A\n  category: x\n";
        let err = parse_sources(yaml, "bad.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_selector_text() {
        assert_eq!(SelectionRule::AllAnchors.selector_text(), "a[href]");
        assert_eq!(SelectionRule::Css("h3 a".into()).selector_text(), "h3 a");
    }
}
