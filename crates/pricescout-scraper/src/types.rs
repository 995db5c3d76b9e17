//! Request and response shapes exchanged with the fetch collaborator.

use serde_json::Value;

/// One page fetch, described independently of how it is carried out.
///
/// In `direct` mode only `target_url` is used. The scraping service also
/// honours the render mode, the geo hint and optional parsing instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    pub target_url: String,
    /// e.g. `"html"` to have the service execute JavaScript before returning.
    pub render_mode: Option<String>,
    /// e.g. `"United States"`.
    pub geo_location: Option<String>,
    /// Service-side parsing instructions; when present the service returns a
    /// parsed object instead of markup.
    pub parsing_instructions: Option<Value>,
}

impl ScrapeRequest {
    #[must_use]
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            render_mode: None,
            geo_location: None,
            parsing_instructions: None,
        }
    }
}

/// The unprocessed payload returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// A document to scan for listing containers.
    Markup(String),
    /// A nested object graph with listing entries somewhere inside it.
    Structured(Value),
}

impl RawResponse {
    /// Classifies a response body. Bodies that look like JSON and parse as
    /// JSON are structured; everything else is markup.
    #[must_use]
    pub fn detect(body: String) -> Self {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return RawResponse::Structured(value);
            }
        }
        RawResponse::Markup(body)
    }

    /// Size of the payload in bytes, for logging.
    #[must_use]
    pub fn approx_len(&self) -> usize {
        match self {
            RawResponse::Markup(body) => body.len(),
            RawResponse::Structured(value) => value.to_string().len(),
        }
    }

    /// Renders the payload back to text, e.g. for writing a debug dump.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            RawResponse::Markup(body) => body.clone(),
            RawResponse::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}
