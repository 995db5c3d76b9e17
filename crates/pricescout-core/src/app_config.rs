use std::str::FromStr;

use crate::ConfigError;

/// How a search page is obtained from the target site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain GET of the site's search page; the response is markup.
    Direct,
    /// POST a job to a realtime scraping service; the response is a JSON
    /// envelope that wraps markup or a pre-parsed object.
    ScraperApi,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Direct => write!(f, "direct"),
            FetchMode::ScraperApi => write!(f, "scraper-api"),
        }
    }
}

impl FromStr for FetchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(FetchMode::Direct),
            "scraper-api" | "scraper_api" | "api" => Ok(FetchMode::ScraperApi),
            other => Err(ConfigError::InvalidEnvVar {
                var: "PRICESCOUT_FETCH_MODE".to_string(),
                reason: format!("unknown fetch mode \"{other}\" (expected direct or scraper-api)"),
            }),
        }
    }
}

/// Basic-auth credentials for the scraping service.
#[derive(Clone)]
pub struct ScraperApiCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ScraperApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperApiCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub base_url: String,
    pub price_ceiling: f64,
    pub max_results: usize,
    pub structured_max_results: usize,
    pub min_query_len: usize,
    pub debounce_ms: u64,
    pub fetch_mode: FetchMode,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub scraper_api_url: String,
    pub scraper_api_credentials: Option<ScraperApiCredentials>,
    pub render_mode: String,
    pub geo_location: String,
    pub scraper_api_parse: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("base_url", &self.base_url)
            .field("price_ceiling", &self.price_ceiling)
            .field("max_results", &self.max_results)
            .field("structured_max_results", &self.structured_max_results)
            .field("min_query_len", &self.min_query_len)
            .field("debounce_ms", &self.debounce_ms)
            .field("fetch_mode", &self.fetch_mode)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("scraper_api_url", &self.scraper_api_url)
            .field(
                "scraper_api_credentials",
                &self.scraper_api_credentials.as_ref().map(|_| "[redacted]"),
            )
            .field("render_mode", &self.render_mode)
            .field("geo_location", &self.geo_location)
            .field("scraper_api_parse", &self.scraper_api_parse)
            .finish()
    }
}
