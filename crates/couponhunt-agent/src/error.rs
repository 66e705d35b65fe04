use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM is not configured: set OPENAI_API_KEY")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected LLM response: {0}")]
    Parse(String),

    #[error("agent reached max iterations ({0})")]
    MaxIterations(usize),

    #[error("scraper setup failed: {0}")]
    Scraper(#[from] couponhunt_scraper::ScraperError),
}

/// Failure to turn raw agent output into JSON.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to parse agent output as JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("agent output is {0}, expected text or an object")]
    UnsupportedShape(&'static str),
}

/// Errors reported back to the model as tool results.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to parse arguments: {0}")]
    ArgumentParse(String),

    #[error("tool execution failed: {0}")]
    Execution(String),
}
