//! Turning free-form agent output into the response payloads.
//!
//! Agents may answer with a bare JSON string, a wrapper object such as
//! `{"output": ...}` or `{"output": {"action_input": ...}}`, or JSON wrapped
//! in a markdown code fence. Everything that is not recoverable becomes a
//! [`NormalizeError`]; callers degrade that to an empty response.

use couponhunt_core::{CouponCode, FormField, FormFields};
use serde_json::Value;

use crate::error::NormalizeError;

/// Unwraps and parses raw agent output into JSON.
///
/// An `output` key is unwrapped once, then an `action_input` key inside it is
/// unwrapped once. The remaining value is parsed if it is text and used as-is
/// if it is an object.
///
/// # Errors
///
/// - [`NormalizeError::InvalidJson`] when the text is not valid JSON.
/// - [`NormalizeError::UnsupportedShape`] for non-text, non-object values.
pub fn normalize_agent_output(raw: &Value) -> Result<Value, NormalizeError> {
    let mut output = raw;
    if let Some(inner) = output.get("output") {
        output = inner;
    }
    if let Some(inner) = output.get("action_input") {
        output = inner;
    }

    match output {
        Value::String(text) => Ok(serde_json::from_str(strip_code_fence(text))?),
        Value::Object(_) => Ok(output.clone()),
        Value::Array(_) => Err(NormalizeError::UnsupportedShape("an array")),
        Value::Number(_) => Err(NormalizeError::UnsupportedShape("a number")),
        Value::Bool(_) => Err(NormalizeError::UnsupportedShape("a boolean")),
        Value::Null => Err(NormalizeError::UnsupportedShape("null")),
    }
}

/// Strips a surrounding ```` ``` ```` or ```` ```json ```` fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    match body.split_once('\n') {
        Some((info, code)) if !info.trim().contains(char::is_whitespace) => code.trim(),
        _ => body.trim(),
    }
}

/// Reads `{"coupons": [{"code", "source"}]}`, keeping entries whose code
/// validates. Codes come back uppercased; a missing `source` becomes empty.
#[must_use]
pub fn coupons_from_value(value: &Value) -> Vec<CouponCode> {
    let Some(entries) = value.get("coupons").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let code = entry.get("code").and_then(Value::as_str)?;
            let source = entry.get("source").and_then(Value::as_str).unwrap_or_default();
            let coupon = CouponCode::new(code, source);
            if coupon.is_none() {
                tracing::debug!(code, "dropping invalid coupon code");
            }
            coupon
        })
        .collect()
}

/// Reads `{"coupon_input": {...}, "apply_button": {...}}`.
///
/// Returns `None` unless `value` is an object. A missing, null or empty
/// element object maps to `None`; a populated one keeps its `css_path`, which
/// may itself be null.
#[must_use]
pub fn form_fields_from_value(value: &Value) -> Option<FormFields> {
    let fields = value.as_object()?;
    let field = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_object)
            .filter(|obj| !obj.is_empty())
            .map(|obj| FormField {
                css_path: obj.get("css_path").and_then(Value::as_str).map(str::to_owned),
            })
    };

    Some(FormFields {
        coupon_input: field("coupon_input"),
        apply_button: field("apply_button"),
    })
}
