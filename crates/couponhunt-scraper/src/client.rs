use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;

/// Shared HTTP client for every outbound page, image and aggregator fetch.
///
/// Cheap to clone. Each call takes its own timeout so one client can serve
/// the 30s scrape, 5s HEAD and 10s aggregator budgets.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    scrape_timeout: Duration,
    head_timeout: Duration,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with the given `User-Agent` and default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        user_agent: &str,
        scrape_timeout_secs: u64,
        head_timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self {
            client,
            scrape_timeout: Duration::from_secs(scrape_timeout_secs),
            head_timeout: Duration::from_secs(head_timeout_secs),
        })
    }

    /// Builds a fetcher from the user agent and timeouts in `config`.
    ///
    /// # Errors
    ///
    /// See [`PageFetcher::new`].
    pub fn from_config(config: &couponhunt_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.user_agent,
            config.scrape_timeout_secs,
            config.head_timeout_secs,
        )
    }

    /// Fetches `url` as text using the general scrape timeout.
    ///
    /// # Errors
    ///
    /// See [`PageFetcher::fetch_html_with_timeout`].
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        self.fetch_html_with_timeout(url, self.scrape_timeout).await
    }

    /// Fetches `url` as text, failing after `timeout`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    pub async fn fetch_html_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .timeout(timeout)
            .send()
            .await?;
        let response = check_status(response, url)?;
        Ok(response.text().await?)
    }

    /// Downloads `url` as raw bytes using the general scrape timeout.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self
            .client
            .get(url)
            .timeout(self.scrape_timeout)
            .send()
            .await?;
        let response = check_status(response, url)?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Issues a `HEAD` request and returns the reported `Content-Type`, if any.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    pub async fn head_content_type(&self, url: &str) -> Result<Option<String>, ScraperError> {
        let response = self
            .client
            .head(url)
            .timeout(self.head_timeout)
            .send()
            .await?;
        let response = check_status(response, url)?;
        Ok(response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase()))
    }
}

fn check_status(
    response: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, ScraperError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        })
    }
}

/// Extracts the network location (`host` or `host:port`) from a page URL.
///
/// Given `"https://shop.com/cart?x=1"`, returns `"shop.com"`. Returns `None`
/// when the URL does not parse or has no host.
#[must_use]
pub fn extract_base_host(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
