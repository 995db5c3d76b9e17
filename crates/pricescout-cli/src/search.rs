//! One-shot `search` command.

use std::path::Path;

use anyhow::Context;
use pricescout_core::AppConfig;
use pricescout_dispatch::Presenter;
use pricescout_scraper::{EmptyReason, ProductSearch, SearchOutcome};

use crate::output::TerminalPresenter;

/// Fetches and normalizes one search, printing the outcome to stdout.
///
/// When `dump_raw` is set the fetched payload is written there verbatim
/// before normalization, which is handy when a store layout change stops
/// listings from being recognized.
///
/// # Errors
///
/// Returns an error for a blank query, when the search client cannot be
/// built, when the fetch fails, or when the raw dump cannot be written.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    json: bool,
    dump_raw: Option<&Path>,
) -> anyhow::Result<()> {
    let query = query.trim();
    anyhow::ensure!(!query.is_empty(), "search query must not be empty");

    let search = ProductSearch::from_config(config)?;
    let mut presenter = TerminalPresenter::new(std::io::stdout(), json);
    presenter.on_searching(query);

    let raw = search
        .fetch_raw(query)
        .await
        .with_context(|| format!("search for \"{query}\" failed"))?;
    let Some(raw) = raw else {
        presenter.on_empty(EmptyReason::NotConfigured);
        return Ok(());
    };

    if let Some(path) = dump_raw {
        std::fs::write(path, raw.to_text())
            .with_context(|| format!("failed to write raw response to {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = raw.approx_len(), "raw response written");
    }

    match search.outcome(&raw, query) {
        SearchOutcome::Found(records) => presenter.on_results(records),
        SearchOutcome::Empty(reason) => presenter.on_empty(reason),
    }
    Ok(())
}
