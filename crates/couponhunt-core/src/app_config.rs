use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub openai_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub agent_max_iterations: usize,
    pub scrape_timeout_secs: u64,
    pub head_timeout_secs: u64,
    pub coupon_search_timeout_secs: u64,
    pub user_agent: String,
    pub ocr_enabled: bool,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Returns `true` when an LLM credential is available.
    #[must_use]
    pub fn llm_configured(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("agent_max_iterations", &self.agent_max_iterations)
            .field("scrape_timeout_secs", &self.scrape_timeout_secs)
            .field("head_timeout_secs", &self.head_timeout_secs)
            .field(
                "coupon_search_timeout_secs",
                &self.coupon_search_timeout_secs,
            )
            .field("user_agent", &self.user_agent)
            .field("ocr_enabled", &self.ocr_enabled)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
