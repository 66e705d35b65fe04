use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "COUPONHUNT_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults are valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.openai_api_key.is_none());
    assert!(!cfg.llm_configured());
    assert_eq!(cfg.llm_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.llm_model, "gpt-4o-mini");
    assert_eq!(cfg.agent_max_iterations, 12);
    assert_eq!(cfg.scrape_timeout_secs, 30);
    assert_eq!(cfg.head_timeout_secs, 5);
    assert_eq!(cfg.coupon_search_timeout_secs, 10);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert!(cfg.ocr_enabled);
    assert_eq!(cfg.rate_limit_max_requests, 120);
    assert_eq!(cfg.rate_limit_window_secs, 60);
    assert_eq!(cfg.max_body_bytes, 16 * 1024 * 1024);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-test");
    map.insert("COUPONHUNT_LLM_BASE_URL", "http://localhost:9999/v1/");
    map.insert("COUPONHUNT_COUPON_SEARCH_TIMEOUT_SECS", "3");
    map.insert("COUPONHUNT_OCR_ENABLED", "false");
    map.insert("COUPONHUNT_MAX_BODY_BYTES", "1048576");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.llm_configured());
    assert_eq!(cfg.llm_base_url, "http://localhost:9999/v1");
    assert_eq!(cfg.coupon_search_timeout_secs, 3);
    assert!(!cfg.ocr_enabled);
    assert_eq!(cfg.max_body_bytes, 1_048_576);
}

#[test]
fn blank_api_key_counts_as_unset() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("COUPONHUNT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COUPONHUNT_BIND_ADDR"),
        "expected InvalidEnvVar(COUPONHUNT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("COUPONHUNT_SCRAPE_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COUPONHUNT_SCRAPE_TIMEOUT_SECS"),
        "expected InvalidEnvVar(COUPONHUNT_SCRAPE_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bool() {
    let mut map = HashMap::new();
    map.insert("COUPONHUNT_OCR_ENABLED", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COUPONHUNT_OCR_ENABLED"),
        "expected InvalidEnvVar(COUPONHUNT_OCR_ENABLED), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_iterations() {
    let mut map = HashMap::new();
    map.insert("COUPONHUNT_AGENT_MAX_ITERATIONS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "COUPONHUNT_AGENT_MAX_ITERATIONS"
    ));
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("[redacted]"));
}
