//! Coupon aggregator probing.
//!
//! Fetches a merchant's page on each known aggregator, pulls coupon-like
//! containers out with CSS selectors, and reads a code from each container.
//! Structured `data-*` attributes win over text patterns because they carry
//! far fewer false positives.

use std::sync::LazyLock;
use std::time::Duration;

use couponhunt_core::{dedupe_by_code, validate_coupon_code, CouponCode};
use futures::future::join_all;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::client::PageFetcher;

/// Aggregator URL templates; `{merchant}` is replaced by the merchant name.
pub const COUPON_SITES: [&str; 4] = [
    "https://www.retailmenot.com/view/{merchant}",
    "https://www.promocodes.com/{merchant}",
    "https://www.coupons.com/brands/{merchant}",
    "https://www.offers.com/{merchant}",
];

const COUPON_SELECTORS: [&str; 8] = [
    r#"div[class*="coupon"]"#,
    r#"div[class*="promo"]"#,
    r#"div[class*="offer"]"#,
    r#"div[class*="deal"]"#,
    r#"div[class*="discount"]"#,
    r#"div[class*="code"]"#,
    "[data-coupon]",
    "[data-promo]",
];

const COUPON_ATTRIBUTES: [&str; 3] = ["data-coupon", "data-code", "data-promo"];

static SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    COUPON_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid coupon selector"))
        .collect()
});

/// Text fallbacks, most specific first. Group 1 is the candidate code.
static CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)code[:\s]+([A-Z0-9_-]+)",
        r"(?i)coupon[:\s]+([A-Z0-9_-]+)",
        r"(?i)promo[:\s]+([A-Z0-9_-]+)",
        r"(?i)\b([A-Z0-9]{4,15})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid code pattern"))
    .collect()
});

/// Result of probing one aggregator URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found {
        url: String,
        coupons: Vec<CouponCode>,
    },
    Skipped {
        url: String,
        reason: String,
    },
}

/// Probes the known coupon aggregators for a merchant.
#[derive(Debug, Clone)]
pub struct CouponSiteProber {
    fetcher: PageFetcher,
    templates: Vec<String>,
    timeout: Duration,
}

impl CouponSiteProber {
    /// Creates a prober over [`COUPON_SITES`] with a per-site fetch timeout.
    #[must_use]
    pub fn new(fetcher: PageFetcher, timeout_secs: u64) -> Self {
        Self {
            fetcher,
            templates: COUPON_SITES.iter().map(ToString::to_string).collect(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Replaces the aggregator templates. Each must contain `{merchant}`.
    #[must_use]
    pub fn with_templates(mut self, templates: Vec<String>) -> Self {
        self.templates = templates;
        self
    }

    /// The concrete URLs that would be probed for `merchant`, in order.
    #[must_use]
    pub fn site_urls(&self, merchant: &str) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.replace("{merchant}", merchant))
            .collect()
    }

    /// Fetches every aggregator concurrently and reports one outcome per
    /// site, in template order.
    pub async fn probe_sites(&self, merchant: &str) -> Vec<ProbeOutcome> {
        let urls = self.site_urls(merchant);
        join_all(urls.into_iter().map(|url| self.probe_site(url))).await
    }

    /// Returns every distinct coupon found for `merchant`, first discovery
    /// wins, in template order. Unreachable sites are skipped.
    pub async fn probe(&self, merchant: &str) -> Vec<CouponCode> {
        let merchant = merchant.trim();
        if merchant.is_empty() {
            tracing::warn!("empty merchant name; nothing to probe");
            return Vec::new();
        }

        tracing::info!(merchant, sites = self.templates.len(), "probing coupon sites");
        let mut found = Vec::new();
        for outcome in self.probe_sites(merchant).await {
            match outcome {
                ProbeOutcome::Found { url, coupons } => {
                    tracing::debug!(url = %url, count = coupons.len(), "coupon site analyzed");
                    found.extend(coupons);
                }
                ProbeOutcome::Skipped { url, reason } => {
                    tracing::warn!(url = %url, reason = %reason, "skipping coupon site");
                }
            }
        }

        let unique = dedupe_by_code(found);
        tracing::info!(merchant, unique = unique.len(), "coupon site probe finished");
        unique
    }

    async fn probe_site(&self, url: String) -> ProbeOutcome {
        match self.fetcher.fetch_html_with_timeout(&url, self.timeout).await {
            Ok(html) => {
                let coupons = extract_codes_from_html(&html, &url);
                ProbeOutcome::Found { url, coupons }
            }
            Err(e) => ProbeOutcome::Skipped {
                url,
                reason: e.to_string(),
            },
        }
    }
}

/// Extracts coupon codes from aggregator markup, attributing each to
/// `source`. Duplicates are kept; callers de-duplicate across sites.
///
/// A container contributes a code on validation alone; no description text
/// is required alongside it.
#[must_use]
pub fn extract_codes_from_html(html: &str, source: &str) -> Vec<CouponCode> {
    let document = Html::parse_document(html);
    let mut coupons = Vec::new();

    for selector in SELECTORS.iter() {
        for element in document.select(selector) {
            if let Some(coupon) = extract_code(element).and_then(|c| CouponCode::new(&c, source)) {
                coupons.push(coupon);
            }
        }
    }

    coupons
}

/// Reads a code from one container: a valid `data-*` attribute first, then
/// the first text pattern whose capture validates.
///
/// Text nodes are joined with a space, so a code split across sibling
/// elements (`<span>SAVE</span><span>20</span>`) reads as two tokens.
fn extract_code(element: ElementRef<'_>) -> Option<String> {
    let from_attribute = COUPON_ATTRIBUTES.iter().find_map(|attr| {
        element
            .value()
            .attr(attr)
            .filter(|v| validate_coupon_code(v))
            .map(str::to_owned)
    });
    if from_attribute.is_some() {
        return from_attribute;
    }

    let text = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }

    CODE_PATTERNS.iter().find_map(|pattern| {
        let candidate = pattern.captures(&text)?.get(1)?.as_str().to_ascii_uppercase();
        validate_coupon_code(&candidate).then_some(candidate)
    })
}
