//! One complete search: build the request, fetch, normalize.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pricescout_core::{format_usd, AppConfig, FetchMode, ProductRecord};

use crate::client::ScrapeClient;
use crate::error::ScraperError;
use crate::instructions::listing_instructions;
use crate::normalize::{extract, NormalizeOptions, PayloadShape};
use crate::types::{RawResponse, ScrapeRequest};

/// What a search produced, short of a transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// At least one record passed normalization.
    Found(Vec<ProductRecord>),
    /// Nothing to show, and why.
    Empty(EmptyReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmptyReason {
    /// The fetch backend needs credentials that are not configured.
    NotConfigured,
    /// The page was understood but no listing passed the price filter.
    NoMatches { price_ceiling: f64 },
    /// No known listing container or entry list was found.
    UnrecognizedPayload,
    /// The scraping service reported a non-success status for the job.
    BackendRejected { status: u16 },
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::NotConfigured => {
                write!(f, "Scraper service credentials are not configured")
            }
            EmptyReason::NoMatches { price_ceiling } => {
                write!(f, "No products found under {}", format_usd(*price_ceiling))
            }
            EmptyReason::UnrecognizedPayload => {
                write!(f, "No products found (the store page was not recognized)")
            }
            EmptyReason::BackendRejected { status } => write!(
                f,
                "No products found (scraper service returned status {status})"
            ),
        }
    }
}

/// Search pipeline for one target site.
pub struct ProductSearch {
    client: ScrapeClient,
    options: NormalizeOptions,
    render_mode: Option<String>,
    geo_location: Option<String>,
    send_parsing_instructions: bool,
}

impl ProductSearch {
    #[must_use]
    pub fn new(client: ScrapeClient, options: NormalizeOptions) -> Self {
        Self {
            client,
            options,
            render_mode: None,
            geo_location: None,
            send_parsing_instructions: false,
        }
    }

    /// Builds the client and normalization options described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = match config.fetch_mode {
            FetchMode::Direct => ScrapeClient::direct(
                config.request_timeout_secs,
                &config.user_agent,
                config.max_retries,
                config.retry_backoff_base_secs,
            )?,
            FetchMode::ScraperApi => ScrapeClient::scraper_api(
                config.request_timeout_secs,
                &config.user_agent,
                &config.scraper_api_url,
                config.scraper_api_credentials.clone(),
                config.max_retries,
                config.retry_backoff_base_secs,
            )?,
        };
        let options = NormalizeOptions {
            base_url: config.base_url.clone(),
            price_ceiling: config.price_ceiling,
            max_markup_entries: config.max_results,
            max_structured_entries: config.structured_max_results,
        };
        Ok(Self::new(client, options).with_service_options(
            Some(config.render_mode.clone()),
            Some(config.geo_location.clone()),
            config.scraper_api_parse,
        ))
    }

    /// Render/geo hints and whether to ask the scraping service to parse the
    /// page itself. Ignored in direct mode.
    #[must_use]
    pub fn with_service_options(
        mut self,
        render_mode: Option<String>,
        geo_location: Option<String>,
        send_parsing_instructions: bool,
    ) -> Self {
        self.render_mode = render_mode.filter(|s| !s.trim().is_empty());
        self.geo_location = geo_location.filter(|s| !s.trim().is_empty());
        self.send_parsing_instructions = send_parsing_instructions;
        self
    }

    #[must_use]
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Search page URL for `query`, including a best-effort upstream price
    /// facet. The ceiling is re-checked during normalization regardless.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let query = utf8_percent_encode(query.trim(), NON_ALPHANUMERIC);
        let facet = format!("currentprice_facet=Price~0 to {}", self.options.price_ceiling);
        let facet = utf8_percent_encode(&facet, NON_ALPHANUMERIC);
        format!(
            "{}/site/searchpage.jsp?st={query}&qp={facet}",
            self.options.base_url.trim_end_matches('/')
        )
    }

    #[must_use]
    pub fn scrape_request(&self, query: &str) -> ScrapeRequest {
        let mut request = ScrapeRequest::new(self.search_url(query));
        if self.client.mode() == FetchMode::ScraperApi {
            request.render_mode.clone_from(&self.render_mode);
            request.geo_location.clone_from(&self.geo_location);
            if self.send_parsing_instructions {
                request.parsing_instructions = Some(listing_instructions());
            }
        }
        request
    }

    /// Fetches the raw response for `query`, or `None` when the backend is
    /// not configured.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from [`ScrapeClient::fetch`].
    pub async fn fetch_raw(&self, query: &str) -> Result<Option<RawResponse>, ScraperError> {
        if !self.client.is_configured() {
            tracing::info!(
                mode = %self.client.mode(),
                "fetch backend not configured, skipping request"
            );
            return Ok(None);
        }
        let request = self.scrape_request(query);
        tracing::info!(url = %request.target_url, mode = %self.client.mode(), "fetching search page");
        let raw = self.client.fetch(&request).await?;
        tracing::debug!(bytes = raw.approx_len(), "received scrape response");
        Ok(Some(raw))
    }

    /// Runs one search end to end.
    ///
    /// Missing credentials and unusable payloads are reported as
    /// [`SearchOutcome::Empty`]; only transport failures are errors.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from [`ScrapeClient::fetch`].
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ScraperError> {
        match self.fetch_raw(query).await? {
            Some(raw) => Ok(self.outcome(&raw, query)),
            None => Ok(SearchOutcome::Empty(EmptyReason::NotConfigured)),
        }
    }

    /// Normalizes an already-fetched response into a [`SearchOutcome`].
    #[must_use]
    pub fn outcome(&self, raw: &RawResponse, query: &str) -> SearchOutcome {
        let extraction = extract(raw, query.trim(), &self.options);
        tracing::info!(
            query = query.trim(),
            shape = ?extraction.shape,
            records = extraction.records.len(),
            "search normalized"
        );
        if !extraction.records.is_empty() {
            return SearchOutcome::Found(extraction.records);
        }
        let reason = match extraction.shape {
            PayloadShape::Rejected { status } => EmptyReason::BackendRejected { status },
            PayloadShape::Unrecognized => EmptyReason::UnrecognizedPayload,
            PayloadShape::Markup { .. }
            | PayloadShape::Structured
            | PayloadShape::StructuredMarkup { .. } => EmptyReason::NoMatches {
                price_ceiling: self.options.price_ceiling,
            },
        };
        SearchOutcome::Empty(reason)
    }
}
