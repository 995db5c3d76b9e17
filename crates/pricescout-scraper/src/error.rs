use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("scraper service credentials are not configured")]
    MissingCredentials,
}

impl ScraperError {
    /// Short, user-facing description of the failure for the presentation
    /// layer. Timeouts and connection failures are called out explicitly.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ScraperError::Http(e) if e.is_timeout() => {
                "Search failed: the request timed out".to_string()
            }
            ScraperError::Http(e) if e.is_connect() => {
                "Search failed: could not connect to the store".to_string()
            }
            other => format!("Search failed: {other}"),
        }
    }
}
