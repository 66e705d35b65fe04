use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static COUPON_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9_-]{4,15}$").expect("valid coupon code regex"));

/// Returns `true` when `code` looks like a redeemable coupon code.
///
/// Surrounding whitespace is ignored and the match is case-insensitive:
/// 4 to 15 characters drawn from `A-Z`, `0-9`, `_` and `-`. Empty input is
/// rejected.
#[must_use]
pub fn validate_coupon_code(code: &str) -> bool {
    let trimmed = code.trim();
    !trimmed.is_empty() && COUPON_CODE_RE.is_match(trimmed)
}

/// A single coupon code together with where it was found.
///
/// Construct through [`CouponCode::new`] to guarantee the code passes
/// [`validate_coupon_code`] and is stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponCode {
    pub code: String,
    pub source: String,
}

impl CouponCode {
    /// Validates `code` and returns the normalized coupon, or `None` when the
    /// candidate is rejected.
    #[must_use]
    pub fn new(code: &str, source: impl Into<String>) -> Option<Self> {
        if !validate_coupon_code(code) {
            return None;
        }
        Some(Self {
            code: code.trim().to_ascii_uppercase(),
            source: source.into(),
        })
    }
}

/// Wire shape `{"coupons": [...]}` used both by LLM extraction output and
/// by the `/analyze` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponCodeList {
    #[serde(default)]
    pub coupons: Vec<CouponCode>,
}

/// Response body of `POST /analyze`.
pub type AnalyzeResponse = CouponCodeList;

/// Removes repeated codes, keeping the first occurrence (and its source) in
/// discovery order.
#[must_use]
pub fn dedupe_by_code(coupons: Vec<CouponCode>) -> Vec<CouponCode> {
    let mut seen = std::collections::HashSet::new();
    coupons
        .into_iter()
        .filter(|c| seen.insert(c.code.clone()))
        .collect()
}
