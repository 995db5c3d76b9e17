use std::future::Future;

use pricescout_scraper::{ProductSearch, ScraperError, SearchOutcome};

/// Something that can run one complete search for a query.
///
/// Implementations are shared with worker tasks, so they must be `Send +
/// Sync` and their futures `Send`.
pub trait SearchBackend: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchOutcome, ScraperError>> + Send;
}

impl SearchBackend for ProductSearch {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchOutcome, ScraperError>> + Send {
        ProductSearch::search(self, query)
    }
}
