use serde::{Deserialize, Serialize};

/// Request body of `POST /analyze_form`.
#[derive(Debug, Clone, Deserialize)]
pub struct FormAnalyzeRequest {
    /// Raw page markup, usually `document.documentElement.outerHTML` from the
    /// browser extension.
    pub html_page: String,
}

/// Location of a single form element, addressed by CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub css_path: Option<String>,
}

/// The coupon entry field and the button that applies it. Either may be
/// missing from a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub coupon_input: Option<FormField>,
    pub apply_button: Option<FormField>,
}

/// Response body of `POST /analyze_form`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAnalyzeResponse {
    pub form_fields: Option<FormFields>,
}

impl FormAnalyzeResponse {
    #[must_use]
    pub fn empty() -> Self {
        Self { form_fields: None }
    }
}
