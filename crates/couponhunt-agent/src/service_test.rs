use std::sync::Mutex;

use async_trait::async_trait;
use couponhunt_core::CouponCode;
use serde_json::{json, Value};

use super::*;
use crate::error::AgentError;

/// Agent that returns a canned answer and records what it was asked.
struct StubAgent {
    reply: Result<Value, &'static str>,
    seen: Mutex<Vec<Vec<AgentTask>>>,
}

impl StubAgent {
    fn answering(reply: Value) -> Self {
        Self {
            reply: Ok(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(reason: &'static str) -> Self {
        Self {
            reply: Err(reason),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Vec<AgentTask>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for StubAgent {
    async fn run(&self, tasks: &[AgentTask]) -> Result<Value, AgentError> {
        self.seen.lock().unwrap().push(tasks.to_vec());
        match &self.reply {
            Ok(value) => Ok(value.clone()),
            Err(reason) => Err(AgentError::Parse((*reason).to_owned())),
        }
    }
}

fn analyze_request(url: &str) -> AnalyzeRequest {
    AnalyzeRequest {
        url: url.to_owned(),
    }
}

fn form_request(html: &str) -> FormAnalyzeRequest {
    FormAnalyzeRequest {
        html_page: html.to_owned(),
    }
}

#[tokio::test]
async fn analyze_sends_clean_url_and_validates_coupons() {
    let agent = StubAgent::answering(json!(
        r#"{"coupons":[{"code":"save10","source":"banner"},{"code":"??","source":"x"}]}"#
    ));

    let (response, error) = analyze(&agent, &analyze_request(" \"shop.com/deals\" ")).await;

    assert_eq!(error, None);
    assert_eq!(
        response.coupons,
        vec![CouponCode::new("SAVE10", "banner").unwrap()]
    );
    let calls = agent.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0], AgentTask::Objective(ANALYZE_OBJECTIVE.to_owned()));
    assert_eq!(calls[0][1], AgentTask::Input("url: https://shop.com/deals".to_owned()));
}

#[tokio::test]
async fn analyze_degrades_unparseable_output_to_empty_with_error() {
    let agent = StubAgent::answering(json!("Sorry, no coupons today."));
    let (response, error) = analyze(&agent, &analyze_request("https://shop.com")).await;
    assert!(response.coupons.is_empty());
    assert!(error.unwrap().contains("failed to parse agent output"));
}

#[tokio::test]
async fn analyze_degrades_agent_failure_to_empty_with_error() {
    let agent = StubAgent::failing("boom");
    let (response, error) = analyze(&agent, &analyze_request("https://shop.com")).await;
    assert!(response.coupons.is_empty());
    assert!(error.unwrap().starts_with("error analyzing URL"));
}

#[tokio::test]
async fn analyze_rejects_blank_url_without_calling_agent() {
    let agent = StubAgent::answering(json!("{}"));
    let (response, error) = analyze(&agent, &analyze_request("   ")).await;
    assert!(response.coupons.is_empty());
    assert!(error.is_some());
    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn analyze_form_short_circuits_without_form_controls() {
    let agent = StubAgent::answering(json!("{}"));
    for html in ["", "   ", "<div><p>No form here</p></div>"] {
        let (response, error) = analyze_form(&agent, &form_request(html)).await;
        assert_eq!(response, FormAnalyzeResponse::empty());
        assert_eq!(error, None);
    }
    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn analyze_form_maps_wrapped_agent_output() {
    let agent = StubAgent::answering(json!({
        "output": {
            "action_input": {
                "form_fields": {
                    "coupon_input": {"css_path": "#coupon"},
                    "apply_button": null
                }
            }
        }
    }));
    let html = r#"<form><input id="coupon"><button>Apply</button></form>"#;

    let (response, error) = analyze_form(&agent, &form_request(html)).await;

    assert_eq!(error, None);
    let fields = response.form_fields.unwrap();
    assert_eq!(
        fields.coupon_input.unwrap().css_path.as_deref(),
        Some("#coupon")
    );
    assert_eq!(fields.apply_button, None);
    assert_eq!(agent.calls()[0][1], AgentTask::Input(format!("html: {html}")));
}

#[tokio::test]
async fn analyze_form_null_form_fields_stays_null() {
    let agent = StubAgent::answering(json!(r#"{"form_fields": null}"#));
    let (response, error) = analyze_form(&agent, &form_request("<input>")).await;
    assert_eq!(response, FormAnalyzeResponse::empty());
    assert_eq!(error, None);
}

#[tokio::test]
async fn analyze_form_degrades_parse_failure() {
    let agent = StubAgent::answering(json!("not json"));
    let (response, error) = analyze_form(&agent, &form_request("<input>")).await;
    assert_eq!(response, FormAnalyzeResponse::empty());
    assert!(error.is_some());
}

#[test]
fn form_controls_detection() {
    assert!(has_form_controls("<input type=text>"));
    assert!(has_form_controls("<html><body><textarea></textarea></body></html>"));
    assert!(has_form_controls("<select><option>1</option></select>"));
    assert!(!has_form_controls("<form></form>"));
    assert!(!has_form_controls("plain text"));
}
