//! Minimal client for OpenAI-compatible chat completions.

use std::time::Duration;

use couponhunt_core::AppConfig;
use serde_json::{json, Value};

use crate::error::AgentError;

const LLM_TIMEOUT_SECS: u64 = 120;

/// Posts chat completion requests to `{base_url}/chat/completions`.
///
/// Cheap to clone; every tool and the agent loop share one.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .finish()
    }
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Builds a client from the LLM settings in `config`.
    ///
    /// # Errors
    ///
    /// - [`AgentError::NotConfigured`] when no API key is set.
    /// - [`AgentError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .filter(|_| config.llm_configured())
            .ok_or(AgentError::NotConfigured)?;
        Self::new(api_key, &config.llm_base_url, &config.llm_model)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a raw chat completion request. `model` is filled in when the
    /// body does not set one.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Http`] on network failure or timeout.
    /// - [`AgentError::Api`] for any non-2xx response.
    /// - [`AgentError::Parse`] when the body is not JSON.
    pub async fn chat(&self, mut body: Value) -> Result<Value, AgentError> {
        if let Some(fields) = body.as_object_mut() {
            fields
                .entry("model")
                .or_insert_with(|| json!(self.model));
        }

        tracing::debug!(model = %self.model, "sending chat completion request");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))
    }

    /// Runs `messages` in JSON mode at temperature 0 and parses the reply.
    ///
    /// # Errors
    ///
    /// Everything [`ChatClient::chat`] returns, plus [`AgentError::Parse`]
    /// when the reply has no content or the content is not JSON.
    pub async fn complete_json(&self, messages: Vec<Value>) -> Result<Value, AgentError> {
        let response = self
            .chat(json!({
                "model": self.model,
                "response_format": { "type": "json_object" },
                "temperature": 0,
                "messages": messages,
            }))
            .await?;

        let content = first_message(&response)?
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::Parse("no content in response".into()))?;

        serde_json::from_str(content).map_err(|e| AgentError::Parse(e.to_string()))
    }
}

/// Returns `choices[0].message` from a chat completion response.
///
/// # Errors
///
/// Returns [`AgentError::Parse`] when the response carries no message.
pub fn first_message(response: &Value) -> Result<&Value, AgentError> {
    response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| AgentError::Parse("no message in response".into()))
}
