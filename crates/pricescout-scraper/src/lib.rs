pub mod client;
pub mod error;
pub mod instructions;
pub mod normalize;
pub mod price;
pub mod search;
pub mod types;
pub mod urls;

mod rate_limit;

pub use client::ScrapeClient;
pub use error::ScraperError;
pub use normalize::{
    extract, normalize, EntryOutcome, Extraction, NormalizeOptions, PayloadShape, SkipReason,
};
pub use price::extract_price;
pub use search::{EmptyReason, ProductSearch, SearchOutcome};
pub use types::{RawResponse, ScrapeRequest};
