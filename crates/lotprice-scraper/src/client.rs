use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::FetchError;
use crate::rate_limit::retry_with_backoff;

/// Wait assumed when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Fetches listing pages as HTML text.
///
/// 429 and network failures are retried with exponential backoff up to
/// `max_retries` extra attempts. Other failures are returned immediately.
pub struct PageClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// GETs `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`]: not an absolute http(s) URL.
    /// - [`FetchError::RateLimited`]: HTTP 429 after all retries.
    /// - [`FetchError::NotFound`]: HTTP 404.
    /// - [`FetchError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`FetchError::NotHtml`]: a `Content-Type` that is not HTML.
    /// - [`FetchError::Http`]: network or TLS failure after all retries.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let parsed = parse_page_url(url)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let parsed = parsed.clone();
            async move {
                let response = self.client.get(parsed.clone()).send().await?;
                let status = response.status();
                let url = parsed.to_string();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(FetchError::RateLimited {
                        url,
                        retry_after_secs,
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(FetchError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(FetchError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let is_html = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map_or(true, |ct| ct.to_ascii_lowercase().contains("html"));
                if !is_html {
                    return Err(FetchError::NotHtml { url });
                }

                let body = response.text().await?;
                tracing::debug!(%url, bytes = body.len(), "fetched page");
                Ok(body)
            }
        })
        .await
    }
}

fn parse_page_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
