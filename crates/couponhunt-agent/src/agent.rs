//! The coupon-finding agent and its tool-calling loop.

use std::sync::Arc;

use async_trait::async_trait;
use couponhunt_core::AppConfig;
use couponhunt_scraper::{CouponSiteProber, DisabledOcr, OcrEngine, PageFetcher};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AgentError;
use crate::llm::{first_message, ChatClient};
use crate::prompts::AGENT_SYSTEM_PROMPT;
use crate::tools::{coupon_tools, Tool, ToolCall};
use crate::vision::VisionOcr;

/// One record of an agent invocation. Serializes as a single-key object,
/// e.g. `{"objective": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTask {
    Objective(String),
    Input(String),
    OutputFormat(String),
}

/// Runs an ordered task list to a raw answer.
///
/// The answer is usually the model's final text as a JSON string; callers
/// pass it through [`crate::normalize_agent_output`].
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, tasks: &[AgentTask]) -> Result<Value, AgentError>;
}

/// Agent used when no LLM credential is configured; every run fails with
/// [`AgentError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredAgent;

#[async_trait]
impl Agent for UnconfiguredAgent {
    async fn run(&self, _tasks: &[AgentTask]) -> Result<Value, AgentError> {
        Err(AgentError::NotConfigured)
    }
}

/// OpenAI tool-calling loop over the coupon tools.
pub struct ToolCallingAgent {
    llm: ChatClient,
    tools: Vec<Box<dyn Tool>>,
    max_iterations: usize,
}

impl ToolCallingAgent {
    #[must_use]
    pub fn new(llm: ChatClient, tools: Vec<Box<dyn Tool>>, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }

    async fn execute_tool(&self, call: &ToolCall) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            tracing::warn!(tool = %call.name, "unknown tool requested");
            return format!("Error: unknown tool '{}'", call.name);
        };

        match tool.call(&call.arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "tool execution failed");
                format!("Error: {e}")
            }
        }
    }
}

#[async_trait]
impl Agent for ToolCallingAgent {
    async fn run(&self, tasks: &[AgentTask]) -> Result<Value, AgentError> {
        let tool_defs: Vec<Value> = self.tools.iter().map(|t| t.definition()).collect();
        let mut messages = vec![
            json!({"role": "system", "content": AGENT_SYSTEM_PROMPT}),
            json!({"role": "user", "content": render_tasks(tasks)}),
        ];

        for iteration in 1..=self.max_iterations {
            tracing::debug!(
                iteration,
                model = %self.llm.model(),
                message_count = messages.len(),
                "agent iteration starting"
            );

            let mut request = json!({
                "messages": messages,
                "temperature": 0,
            });
            if !tool_defs.is_empty() {
                request["tools"] = Value::Array(tool_defs.clone());
                request["tool_choice"] = json!("auto");
            }

            let response = self.llm.chat(request).await?;
            let message = first_message(&response)?.clone();

            let tool_calls = message
                .get("tool_calls")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            if tool_calls.is_empty() {
                let content = message
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                tracing::info!(iteration, response_len = content.len(), "agent finished");
                return Ok(Value::String(content));
            }

            messages.push(message);
            for raw_call in &tool_calls {
                let Some(call) = ToolCall::from_openai_value(raw_call) else {
                    tracing::warn!(call = %raw_call, "failed to parse tool call");
                    // Every call id needs a reply or the next request is rejected.
                    if let Some(id) = raw_call.get("id").and_then(Value::as_str) {
                        messages.push(json!({
                            "role": "tool",
                            "tool_call_id": id,
                            "content": "Error: malformed tool call",
                        }));
                    }
                    continue;
                };

                tracing::info!(tool = %call.name, id = %call.id, "executing tool call");
                let result = self.execute_tool(&call).await;
                tracing::debug!(tool = %call.name, result_len = result.len(), "tool call complete");

                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": result,
                }));
            }
        }

        tracing::warn!(max_iterations = self.max_iterations, "agent reached max iterations");
        Err(AgentError::MaxIterations(self.max_iterations))
    }
}

/// Renders the task records as the user turn, one `key: value` line each.
fn render_tasks(tasks: &[AgentTask]) -> String {
    tasks
        .iter()
        .map(|task| match task {
            AgentTask::Objective(text) => format!("objective: {text}"),
            AgentTask::Input(text) => format!("input: {text}"),
            AgentTask::OutputFormat(text) => format!("output_format: {text}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the agent described by `config`: the tool-calling agent when an
/// API key is set, [`UnconfiguredAgent`] otherwise.
///
/// OCR runs through the vision model when enabled; without it the image
/// tools still run but recognise nothing.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be constructed.
pub fn build_agent(config: &AppConfig) -> Result<Arc<dyn Agent>, AgentError> {
    if !config.llm_configured() {
        tracing::warn!("OPENAI_API_KEY not set; agent requests will return empty results");
        return Ok(Arc::new(UnconfiguredAgent));
    }

    let llm = ChatClient::from_config(config)?;
    let fetcher = PageFetcher::from_config(config)?;
    let ocr: Arc<dyn OcrEngine> = if config.ocr_enabled {
        Arc::new(VisionOcr::new(llm.clone()))
    } else {
        Arc::new(DisabledOcr)
    };
    let prober = CouponSiteProber::new(fetcher.clone(), config.coupon_search_timeout_secs);

    tracing::info!(
        model = %llm.model(),
        ocr_enabled = config.ocr_enabled,
        max_iterations = config.agent_max_iterations,
        "agent ready"
    );
    Ok(Arc::new(ToolCallingAgent::new(
        llm.clone(),
        coupon_tools(fetcher, ocr, llm, prober),
        config.agent_max_iterations,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_serialize_as_single_key_records() {
        let tasks = vec![
            AgentTask::Objective("find coupons".into()),
            AgentTask::Input("url: https://shop.com".into()),
            AgentTask::OutputFormat("JSON".into()),
        ];
        assert_eq!(
            serde_json::to_value(&tasks).unwrap(),
            json!([
                {"objective": "find coupons"},
                {"input": "url: https://shop.com"},
                {"output_format": "JSON"}
            ])
        );
    }

    #[test]
    fn tasks_render_in_order() {
        let rendered = render_tasks(&[
            AgentTask::Objective("a".into()),
            AgentTask::Input("b".into()),
            AgentTask::OutputFormat("c".into()),
        ]);
        assert_eq!(rendered, "objective: a\ninput: b\noutput_format: c");
    }

    #[tokio::test]
    async fn unconfigured_agent_fails_every_run() {
        let err = UnconfiguredAgent.run(&[]).await.unwrap_err();
        assert!(matches!(err, AgentError::NotConfigured));
    }
}
