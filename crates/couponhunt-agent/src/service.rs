//! Request handling behind `/analyze` and `/analyze_form`.
//!
//! Both services always produce a structurally valid response. Failures are
//! returned as the second tuple element for logging, never as an `Err`.

use std::sync::LazyLock;

use couponhunt_core::{AnalyzeRequest, AnalyzeResponse, FormAnalyzeRequest, FormAnalyzeResponse};
use scraper::{Html, Selector};

use crate::agent::{Agent, AgentTask};
use crate::normalize::{coupons_from_value, form_fields_from_value, normalize_agent_output};
use crate::prompts::{
    ANALYZE_FORM_OBJECTIVE, ANALYZE_FORM_OUTPUT_FORMAT, ANALYZE_OBJECTIVE, ANALYZE_OUTPUT_FORMAT,
};

static FORM_CONTROL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input, textarea, select, button").expect("valid form control selector")
});

/// Finds coupon codes for the page in `request`.
pub async fn analyze(
    agent: &dyn Agent,
    request: &AnalyzeRequest,
) -> (AnalyzeResponse, Option<String>) {
    if request.url.trim().is_empty() {
        return (AnalyzeResponse::default(), Some("url is empty".to_owned()));
    }

    let url = request.clean_url();
    tracing::info!(url = %url, "analyzing url");
    let tasks = [
        AgentTask::Objective(ANALYZE_OBJECTIVE.to_owned()),
        AgentTask::Input(format!("url: {url}")),
        AgentTask::OutputFormat(ANALYZE_OUTPUT_FORMAT.to_owned()),
    ];

    let raw = match agent.run(&tasks).await {
        Ok(raw) => raw,
        Err(e) => {
            return (
                AnalyzeResponse::default(),
                Some(format!("error analyzing URL: {e}")),
            )
        }
    };
    tracing::debug!(raw = %raw, "raw agent response");

    match normalize_agent_output(&raw) {
        Ok(data) => {
            let coupons = coupons_from_value(&data);
            tracing::info!(url = %url, found = coupons.len(), "analysis finished");
            (AnalyzeResponse { coupons }, None)
        }
        Err(e) => (AnalyzeResponse::default(), Some(e.to_string())),
    }
}

/// Locates the coupon input and apply button in the page in `request`.
///
/// Markup without any form control is answered with `form_fields: null`
/// without consulting the agent.
pub async fn analyze_form(
    agent: &dyn Agent,
    request: &FormAnalyzeRequest,
) -> (FormAnalyzeResponse, Option<String>) {
    if !has_form_controls(&request.html_page) {
        tracing::debug!("no form controls in page; skipping agent");
        return (FormAnalyzeResponse::empty(), None);
    }

    tracing::info!(html_len = request.html_page.len(), "analyzing form");
    let tasks = [
        AgentTask::Objective(ANALYZE_FORM_OBJECTIVE.to_owned()),
        AgentTask::Input(format!("html: {}", request.html_page)),
        AgentTask::OutputFormat(ANALYZE_FORM_OUTPUT_FORMAT.to_owned()),
    ];

    let raw = match agent.run(&tasks).await {
        Ok(raw) => raw,
        Err(e) => return (FormAnalyzeResponse::empty(), Some(e.to_string())),
    };

    match normalize_agent_output(&raw) {
        Ok(data) => (
            FormAnalyzeResponse {
                form_fields: data.get("form_fields").and_then(form_fields_from_value),
            },
            None,
        ),
        Err(e) => (FormAnalyzeResponse::empty(), Some(e.to_string())),
    }
}

/// Returns `true` when `html` contains at least one input, textarea, select
/// or button element.
#[must_use]
pub fn has_form_controls(html: &str) -> bool {
    if html.trim().is_empty() {
        return false;
    }
    Html::parse_document(html)
        .select(&FORM_CONTROL_SELECTOR)
        .next()
        .is_some()
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
