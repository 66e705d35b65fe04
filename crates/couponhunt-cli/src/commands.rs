//! Subcommand handlers. Each returns the text to print on stdout.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use couponhunt_agent::{ChatClient, VisionOcr};
use couponhunt_core::{AnalyzeRequest, AppConfig, FormAnalyzeRequest};
use couponhunt_scraper::{DisabledOcr, OcrEngine, PageFetcher};
use serde::Serialize;
use serde_json::json;

fn pretty<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

fn fetcher(config: &AppConfig) -> anyhow::Result<PageFetcher> {
    PageFetcher::from_config(config).map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}

/// Reads a whole file, or stdin when `input` is `-`.
pub(crate) fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

pub(crate) fn validate(code: &str) -> anyhow::Result<String> {
    let valid = couponhunt_core::validate_coupon_code(code);
    let normalized = valid.then(|| code.trim().to_ascii_uppercase());
    pretty(&json!({"code": code, "valid": valid, "normalized": normalized}))
}

pub(crate) async fn images(config: &AppConfig, url: &str, ocr: bool) -> anyhow::Result<String> {
    let fetcher = fetcher(config)?;
    let url = couponhunt_core::normalize_url(url);
    let images = couponhunt_scraper::scrape_images(&fetcher, &url).await;
    if !ocr {
        return pretty(&json!({"url": url, "images": images}));
    }

    let engine: Arc<dyn OcrEngine> = match ChatClient::from_config(config) {
        Ok(llm) if config.ocr_enabled => Arc::new(VisionOcr::new(llm)),
        _ => {
            tracing::warn!("OCR unavailable (disabled or no OPENAI_API_KEY); no text will be read");
            Arc::new(DisabledOcr)
        }
    };
    let detections =
        couponhunt_scraper::extract_text_from_images(&fetcher, engine.as_ref(), &images).await;
    pretty(&json!({"url": url, "images": images, "detections": detections}))
}

pub(crate) async fn probe(config: &AppConfig, merchant: &str) -> anyhow::Result<String> {
    let prober =
        couponhunt_scraper::CouponSiteProber::new(fetcher(config)?, config.coupon_search_timeout_secs);
    let coupons = prober.probe(merchant).await;
    pretty(&json!({"merchant": merchant, "coupons": coupons}))
}

pub(crate) fn clean(input: &str, tags: &[String]) -> anyhow::Result<String> {
    let html = read_input(input)?;
    Ok(couponhunt_scraper::clean_html(&html, tags))
}

pub(crate) async fn analyze(config: &AppConfig, url: &str) -> anyhow::Result<String> {
    let agent = couponhunt_agent::build_agent(config)?;
    let request = AnalyzeRequest {
        url: url.to_owned(),
    };
    let (response, error) = couponhunt_agent::analyze(agent.as_ref(), &request).await;
    if let Some(error) = error {
        tracing::warn!(error = %error, "analysis degraded to empty result");
    }
    pretty(&response)
}

pub(crate) async fn analyze_form(config: &AppConfig, input: &str) -> anyhow::Result<String> {
    let agent = couponhunt_agent::build_agent(config)?;
    let request = FormAnalyzeRequest {
        html_page: read_input(input)?,
    };
    let (response, error) = couponhunt_agent::analyze_form(agent.as_ref(), &request).await;
    if let Some(error) = error {
        tracing::warn!(error = %error, "form analysis degraded to null result");
    }
    pretty(&response)
}
