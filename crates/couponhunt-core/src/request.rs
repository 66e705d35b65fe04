use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

/// Request body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// Merchant page URL exactly as the client sent it. May be quoted,
    /// percent-encoded, or missing its scheme.
    pub url: String,
}

impl AnalyzeRequest {
    /// The request URL after [`normalize_url`].
    #[must_use]
    pub fn clean_url(&self) -> String {
        normalize_url(&self.url)
    }
}

/// Normalizes a client-supplied URL.
///
/// Trims whitespace, strips surrounding single/double quotes, percent-decodes,
/// and prefixes `https://` when no `scheme://` is present.
///
/// ```
/// use couponhunt_core::normalize_url;
///
/// assert_eq!(normalize_url(" \"shop.com/cart\" "), "https://shop.com/cart");
/// assert_eq!(normalize_url("https%3A%2F%2Fshop.com"), "https://shop.com");
/// ```
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let stripped = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let decoded = percent_decode_str(stripped).decode_utf8_lossy();
    if SCHEME_RE.is_match(&decoded) {
        decoded.into_owned()
    } else {
        format!("https://{decoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_absolute_urls() {
        assert_eq!(normalize_url("https://shop.com"), "https://shop.com");
        assert_eq!(
            normalize_url("http://shop.com/a?b=1"),
            "http://shop.com/a?b=1"
        );
    }

    #[test]
    fn defaults_scheme_to_https() {
        assert_eq!(normalize_url("www.amazon.com"), "https://www.amazon.com");
        assert_eq!(normalize_url("shop.com:8080/x"), "https://shop.com:8080/x");
    }

    #[test]
    fn strips_whitespace_and_quotes() {
        assert_eq!(normalize_url("  'shop.com'  "), "https://shop.com");
        assert_eq!(normalize_url("\"https://shop.com\""), "https://shop.com");
    }

    #[test]
    fn percent_decodes_before_scheme_check() {
        assert_eq!(
            normalize_url("https%3A%2F%2Fshop.com%2Fsale%20items"),
            "https://shop.com/sale items"
        );
    }

    #[test]
    fn clean_url_uses_normalizer() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"url":" nike.com "}"#).unwrap();
        assert_eq!(req.clean_url(), "https://nike.com");
    }
}
