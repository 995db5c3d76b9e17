use pricescout_core::ProductRecord;
use pricescout_scraper::EmptyReason;

/// Receiver of search lifecycle signals.
///
/// Every method is called from the dispatcher task, never from a worker, so
/// implementations may own their display state without synchronization.
/// Each completed search produces exactly one of [`on_results`],
/// [`on_empty`], or [`on_error`].
///
/// [`on_results`]: Presenter::on_results
/// [`on_empty`]: Presenter::on_empty
/// [`on_error`]: Presenter::on_error
pub trait Presenter {
    /// Input is too short or was rejected; show the neutral prompt.
    fn on_idle(&mut self) {}

    /// A search for `query` has been dispatched.
    fn on_searching(&mut self, query: &str);

    /// Non-empty list of records for the latest search.
    fn on_results(&mut self, records: Vec<ProductRecord>);

    fn on_empty(&mut self, reason: EmptyReason);

    /// Human-readable description of a failed search.
    fn on_error(&mut self, message: &str);
}
