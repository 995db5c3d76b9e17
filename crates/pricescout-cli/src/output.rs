//! Terminal rendering of search lifecycle signals.

use std::io::Write;

use pricescout_core::ProductRecord;
use pricescout_dispatch::Presenter;
use pricescout_scraper::EmptyReason;
use serde_json::json;

/// Presenter that writes to a terminal (or any writer).
///
/// Owns the currently displayed record list; it is cleared whenever a new
/// search starts or the input goes idle. In JSON mode each outcome is one
/// line of JSON and progress signals are not printed.
pub(crate) struct TerminalPresenter<W> {
    out: W,
    json: bool,
    records: Vec<ProductRecord>,
}

impl<W: Write> TerminalPresenter<W> {
    pub(crate) fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            records: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write search output");
        }
    }

    fn render_records(&mut self) {
        if self.json {
            match serde_json::to_string(&self.records) {
                Ok(body) => self.line(&body),
                Err(e) => tracing::warn!(error = %e, "failed to serialize records"),
            }
            return;
        }
        let mut text = format!(
            "Found {} product{}:",
            self.records.len(),
            if self.records.len() == 1 { "" } else { "s" }
        );
        for record in &self.records {
            text.push_str(&format!("\n{:>12}  {}", record.display_price(), record.name));
            if let Some(url) = &record.product_url {
                text.push_str(&format!("\n{:>12}  {url}", ""));
            }
        }
        self.line(&text);
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn on_idle(&mut self) {
        self.records.clear();
        if !self.json {
            self.line("Type a product name to search.");
        }
    }

    fn on_searching(&mut self, query: &str) {
        self.records.clear();
        if !self.json {
            self.line(&format!("Searching for \"{query}\"..."));
        }
    }

    fn on_results(&mut self, records: Vec<ProductRecord>) {
        self.records = records;
        self.render_records();
    }

    fn on_empty(&mut self, reason: EmptyReason) {
        self.records.clear();
        if self.json {
            self.line(&json!({ "empty": reason.to_string() }).to_string());
        } else {
            self.line(&reason.to_string());
        }
    }

    fn on_error(&mut self, message: &str) {
        self.records.clear();
        if self.json {
            self.line(&json!({ "error": message }).to_string());
        } else {
            self.line(message);
        }
    }
}
