//! Link normalization and absolute-URL validation.

use url::Url;

/// Resolve `href` against `base` when it is relative.
///
/// Empty input yields an empty string. Links that already carry an
/// `http://` or `https://` prefix are returned unchanged. A relative link
/// with no base is returned as-is and will fail validation downstream.
pub fn normalize_url(href: &str, base: Option<&str>) -> String {
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let Some(base) = base else {
        return href.to_string();
    };
    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

/// True when `url` parses with a non-empty scheme and host.
pub fn is_valid_absolute_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_resolved_against_base() {
        assert_eq!(
            normalize_url("/a/b", Some("https://x.com")),
            "https://x.com/a/b"
        );
    }

    #[test]
    fn test_absolute_link_unchanged() {
        assert_eq!(
            normalize_url("https://y.com/a", Some("https://x.com")),
            "https://y.com/a"
        );
        assert_eq!(normalize_url("http://y.com/a", None), "http://y.com/a");
    }

    #[test]
    fn test_empty_href() {
        assert_eq!(normalize_url("", Some("https://x.com")), "");
    }

    #[test]
    fn test_relative_without_base_is_returned_as_is() {
        assert_eq!(normalize_url("/about", None), "/about");
        assert!(!is_valid_absolute_url("/about"));
    }

    #[test]
    fn test_document_relative_link() {
        assert_eq!(
            normalize_url("article/42", Some("https://holidaysmart.io/hk/")),
            "https://holidaysmart.io/hk/article/42"
        );
    }

    #[test]
    fn test_is_valid_absolute_url() {
        assert!(is_valid_absolute_url("https://unwire.hk/2024/01/foo"));
        assert!(!is_valid_absolute_url(""));
        assert!(!is_valid_absolute_url("not a url"));
        assert!(!is_valid_absolute_url("mailto:someone@example.com"));
        assert!(!is_valid_absolute_url("javascript:void(0)"));
    }
}
