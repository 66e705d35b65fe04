//! LLM-backed extraction: coupon codes from recognised text, and the coupon
//! form from page markup.

use couponhunt_core::{CouponCode, FormAnalyzeResponse};
use serde_json::{json, Value};

use crate::llm::ChatClient;
use crate::normalize::{coupons_from_value, form_fields_from_value};
use crate::prompts::{EXTRACT_COUPONS_SYSTEM_PROMPT, EXTRACT_FORM_FIELDS_SYSTEM_PROMPT};

/// Markup beyond this many characters is not sent to the model.
pub const MAX_FORM_HTML_CHARS: usize = 60_000;

/// Asks the model for coupon codes in `texts` (OCR detections or any other
/// JSON values). Returned codes are validated and uppercased; any failure
/// yields an empty list.
pub async fn extract_coupons_from_text(llm: &ChatClient, texts: &[Value]) -> Vec<CouponCode> {
    if texts.is_empty() {
        return Vec::new();
    }

    let input = Value::Array(texts.to_vec()).to_string();
    let messages = vec![
        json!({"role": "system", "content": EXTRACT_COUPONS_SYSTEM_PROMPT}),
        json!({"role": "user", "content": format!("Input text:\n---\n{input}\n---")}),
    ];

    match llm.complete_json(messages).await {
        Ok(value) => {
            let coupons = coupons_from_value(&value);
            tracing::info!(segments = texts.len(), found = coupons.len(), "coupon text extraction finished");
            coupons
        }
        Err(e) => {
            tracing::warn!(error = %e, "coupon text extraction failed");
            Vec::new()
        }
    }
}

/// Asks the model to locate the coupon input and apply button in `html`.
/// Any failure yields `{"form_fields": null}`.
pub async fn extract_form_fields(llm: &ChatClient, html: &str) -> FormAnalyzeResponse {
    let excerpt: String = html.chars().take(MAX_FORM_HTML_CHARS).collect();
    let messages = vec![
        json!({"role": "system", "content": EXTRACT_FORM_FIELDS_SYSTEM_PROMPT}),
        json!({"role": "user", "content": format!("HTML to analyze:\n{excerpt}")}),
    ];

    match llm.complete_json(messages).await {
        Ok(value) => FormAnalyzeResponse {
            form_fields: form_fields_from_value(&value),
        },
        Err(e) => {
            tracing::warn!(error = %e, "form field extraction failed");
            FormAnalyzeResponse::empty()
        }
    }
}
