use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like `User-Agent` sent on every outbound request by default.
/// Several coupon aggregators reject obvious bot agents outright.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("COUPONHUNT_ENV", "development"))?;
    let bind_addr = parse_addr("COUPONHUNT_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("COUPONHUNT_LOG_LEVEL", "info");

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let llm_base_url = or_default("COUPONHUNT_LLM_BASE_URL", "https://api.openai.com/v1")
        .trim_end_matches('/')
        .to_string();
    let llm_model = or_default("COUPONHUNT_LLM_MODEL", "gpt-4o-mini");
    let agent_max_iterations = parse_usize("COUPONHUNT_AGENT_MAX_ITERATIONS", "12")?;
    if agent_max_iterations == 0 {
        return Err(invalid(
            "COUPONHUNT_AGENT_MAX_ITERATIONS",
            "must be at least 1".to_string(),
        ));
    }

    let scrape_timeout_secs = parse_u64("COUPONHUNT_SCRAPE_TIMEOUT_SECS", "30")?;
    let head_timeout_secs = parse_u64("COUPONHUNT_HEAD_TIMEOUT_SECS", "5")?;
    let coupon_search_timeout_secs = parse_u64("COUPONHUNT_COUPON_SEARCH_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("COUPONHUNT_USER_AGENT", DEFAULT_USER_AGENT);
    let ocr_enabled = parse_bool("COUPONHUNT_OCR_ENABLED", "true")?;

    let rate_limit_max_requests = parse_usize("COUPONHUNT_RATE_LIMIT_MAX_REQUESTS", "120")?;
    let rate_limit_window_secs = parse_u64("COUPONHUNT_RATE_LIMIT_WINDOW_SECS", "60")?;
    // Body cap for the analysis routes; pages arrive as full outerHTML.
    let max_body_bytes = parse_usize("COUPONHUNT_MAX_BODY_BYTES", "16777216")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        openai_api_key,
        llm_base_url,
        llm_model,
        agent_max_iterations,
        scrape_timeout_secs,
        head_timeout_secs,
        coupon_search_timeout_secs,
        user_agent,
        ocr_enabled,
        rate_limit_max_requests,
        rate_limit_window_secs,
        max_body_bytes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COUPONHUNT_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
