//! HTTP client for the fetch collaborator.
//!
//! Two backends sit behind one [`ScrapeClient::fetch`] call:
//!
//! - **direct**: a plain GET of the target URL with browser-like headers;
//!   the body is returned as-is (normally markup).
//! - **scraper API**: a POST of a JSON job to a realtime scraping service
//!   with basic-auth credentials; the service fetches (and optionally renders
//!   and parses) the target URL and answers with a JSON envelope.

use std::time::Duration;

use pricescout_core::{FetchMode, ScraperApiCredentials};
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{RawResponse, ScrapeRequest};
use crate::urls::{host_or_raw, origin_of};

/// Job body understood by the realtime scraping service.
#[derive(Debug, Serialize)]
struct ScrapeJob<'a> {
    source: &'static str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    render: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_location: Option<&'a str>,
    parse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsing_instructions: Option<&'a Value>,
}

enum Backend {
    Direct,
    ScraperApi {
        endpoint: String,
        credentials: Option<ScraperApiCredentials>,
    },
}

/// Fetches one page per call, retrying transient failures.
///
/// Every request is bounded by the configured timeout; non-2xx statuses are
/// returned as typed errors and never handed to the normalizer.
pub struct ScrapeClient {
    client: Client,
    backend: Backend,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    backoff_base_secs: u64,
}

impl ScrapeClient {
    /// Creates a client that GETs target pages directly.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn direct(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            backend: Backend::Direct,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates a client that submits jobs to a realtime scraping service.
    ///
    /// `credentials` may be `None`; such a client reports itself as not
    /// configured and every fetch fails with
    /// [`ScraperError::MissingCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `endpoint` is not a URL, or
    /// [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn scraper_api(
        timeout_secs: u64,
        user_agent: &str,
        endpoint: &str,
        credentials: Option<ScraperApiCredentials>,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        Url::parse(endpoint).map_err(|e| ScraperError::InvalidUrl {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            backend: Backend::ScraperApi {
                endpoint: endpoint.to_owned(),
                credentials,
            },
            max_retries,
            backoff_base_secs,
        })
    }

    #[must_use]
    pub fn mode(&self) -> FetchMode {
        match self.backend {
            Backend::Direct => FetchMode::Direct,
            Backend::ScraperApi { .. } => FetchMode::ScraperApi,
        }
    }

    /// Whether everything needed to issue a fetch is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match &self.backend {
            Backend::Direct => true,
            Backend::ScraperApi { credentials, .. } => credentials.is_some(),
        }
    }

    /// Fetches `request.target_url` through the configured backend.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::MissingCredentials`]: scraper API without credentials.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network failure or timeout after all retries.
    /// - [`ScraperError::Deserialize`]: the scraping service answered with
    ///   something that is not JSON.
    pub async fn fetch(&self, request: &ScrapeRequest) -> Result<RawResponse, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, move || async move {
            match &self.backend {
                Backend::Direct => self.fetch_direct(request).await,
                Backend::ScraperApi {
                    endpoint,
                    credentials,
                } => {
                    let credentials =
                        credentials.as_ref().ok_or(ScraperError::MissingCredentials)?;
                    self.fetch_scraper_api(endpoint, credentials, request).await
                }
            }
        })
        .await
    }

    async fn fetch_direct(&self, request: &ScrapeRequest) -> Result<RawResponse, ScraperError> {
        let url = &request.target_url;
        let mut builder = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache");
        if let Some(origin) = origin_of(url) {
            builder = builder.header(reqwest::header::REFERER, origin);
        }
        let response = builder.send().await?;
        let response = check_status(response, url)?;
        let body = response.text().await?;
        Ok(RawResponse::detect(body))
    }

    async fn fetch_scraper_api(
        &self,
        endpoint: &str,
        credentials: &ScraperApiCredentials,
        request: &ScrapeRequest,
    ) -> Result<RawResponse, ScraperError> {
        let job = ScrapeJob {
            source: "universal",
            url: &request.target_url,
            render: request.render_mode.as_deref(),
            geo_location: request.geo_location.as_deref(),
            parse: request.parsing_instructions.is_some(),
            parsing_instructions: request.parsing_instructions.as_ref(),
        };
        let response = self
            .client
            .post(endpoint)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .json(&job)
            .send()
            .await?;
        let response = check_status(response, endpoint)?;
        let body = response.text().await?;
        let value = serde_json::from_str::<Value>(&body).map_err(|e| ScraperError::Deserialize {
            context: format!("scraper service response for {}", request.target_url),
            source: e,
        })?;
        Ok(RawResponse::Structured(value))
    }
}

fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ScraperError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(user_agent)
        .build()?)
}

/// Maps 429 and other non-2xx statuses to typed errors.
fn check_status(response: Response, url: &str) -> Result<Response, ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            domain: host_or_raw(url),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}
