//! Turning one raw scrape response into a list of [`ProductRecord`]s.
//!
//! Two payload shapes are understood: structured envelopes (see
//! [`structured`]) and markup documents (see [`markup`]). Both shapes reduce
//! each raw entry to the same [`RawFields`] through ordered field rules, and
//! every entry then goes through the same acceptance check. Nothing in here
//! returns an error: malformed entries are skipped and an unrecognized
//! payload simply produces no records.

mod markup;
mod structured;

use std::collections::HashSet;

use pricescout_core::{ProductRecord, DEFAULT_BASE_URL, DEFAULT_PRICE_CEILING, MAX_RESULT_CAP};

use crate::types::RawResponse;
use crate::urls::resolve_url;

/// Default number of structured entries scanned per response.
pub const DEFAULT_STRUCTURED_CAP: usize = 10;

/// Knobs for a normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Origin relative image/product URLs are resolved against.
    pub base_url: String,
    /// Exclusive upper bound on accepted prices.
    pub price_ceiling: f64,
    /// Raw markup containers scanned at most.
    pub max_markup_entries: usize,
    /// Raw structured entries scanned at most.
    pub max_structured_entries: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            price_ceiling: DEFAULT_PRICE_CEILING,
            max_markup_entries: MAX_RESULT_CAP,
            max_structured_entries: DEFAULT_STRUCTURED_CAP,
        }
    }
}

impl NormalizeOptions {
    #[must_use]
    pub fn with_price_ceiling(mut self, price_ceiling: f64) -> Self {
        self.price_ceiling = price_ceiling;
        self
    }
}

/// Which payload shape a response turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// A document in which one of the known container selectors matched.
    Markup { selector: &'static str },
    /// A structured envelope with an entry list.
    Structured,
    /// A structured envelope whose `content` carried a markup document.
    StructuredMarkup { selector: &'static str },
    /// The scraping backend reported a non-success status for the job.
    Rejected { status: u16 },
    /// Neither a known container nor a known entry list was found.
    Unrecognized,
}

/// Why a raw entry did not become a record.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// A structured entry that is not an object.
    NotAnEntry,
    /// No candidate field yielded a positive price.
    UnparseablePrice,
    /// The price is at or above the configured ceiling.
    AboveCeiling { price: f64 },
    /// Same product as an earlier accepted record.
    Duplicate,
}

/// Result of turning one raw entry into a record.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Accepted(ProductRecord),
    Skipped(SkipReason),
}

/// Field values pulled out of one raw entry by the shape-specific rules,
/// before fallbacks, URL resolution and acceptance.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct RawFields {
    pub(crate) name: Option<String>,
    /// `None` when no candidate carried price-like text.
    pub(crate) price: Option<f64>,
    pub(crate) image: Option<String>,
    pub(crate) url: Option<String>,
}

/// Full report of a normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub shape: PayloadShape,
    /// Raw entries looked at (bounded by the shape's cap).
    pub scanned: usize,
    /// Accepted records in raw-response order.
    pub records: Vec<ProductRecord>,
    pub skipped: Vec<SkipReason>,
}

impl Extraction {
    fn empty(shape: PayloadShape) -> Self {
        Self {
            shape,
            scanned: 0,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Normalizes `raw` into the records worth showing for `query`.
///
/// Never fails: malformed, empty, or unrecognized payloads yield an empty
/// list. See [`extract`] for the full report.
#[must_use]
pub fn normalize(raw: &RawResponse, query: &str, options: &NormalizeOptions) -> Vec<ProductRecord> {
    extract(raw, query, options).records
}

/// Normalizes `raw` and reports what was found along the way.
#[must_use]
pub fn extract(raw: &RawResponse, query: &str, options: &NormalizeOptions) -> Extraction {
    let extraction = match raw {
        RawResponse::Markup(document) => {
            match markup::extract_fields(document, options.max_markup_entries) {
                Some((selector, entries)) => {
                    collect(PayloadShape::Markup { selector }, entries, query, options)
                }
                None => Extraction::empty(PayloadShape::Unrecognized),
            }
        }
        RawResponse::Structured(value) => match structured::locate(value) {
            Some(structured::Located::Entries(items)) => {
                let entries = items
                    .iter()
                    .take(options.max_structured_entries)
                    .map(structured::extract_fields)
                    .collect();
                collect(PayloadShape::Structured, entries, query, options)
            }
            Some(structured::Located::Markup(document)) => {
                match markup::extract_fields(document, options.max_markup_entries) {
                    Some((selector, entries)) => collect(
                        PayloadShape::StructuredMarkup { selector },
                        entries,
                        query,
                        options,
                    ),
                    None => Extraction::empty(PayloadShape::Unrecognized),
                }
            }
            Some(structured::Located::Rejected(status)) => {
                tracing::warn!(status, "scraper backend reported a non-success status");
                Extraction::empty(PayloadShape::Rejected { status })
            }
            None => Extraction::empty(PayloadShape::Unrecognized),
        },
    };

    tracing::debug!(
        shape = ?extraction.shape,
        scanned = extraction.scanned,
        accepted = extraction.records.len(),
        skipped = extraction.skipped.len(),
        "normalized scrape response"
    );
    extraction
}

/// Runs every entry through [`accept`] in order, deduplicating as it goes.
fn collect(
    shape: PayloadShape,
    entries: Vec<Option<RawFields>>,
    query: &str,
    options: &NormalizeOptions,
) -> Extraction {
    let mut seen = HashSet::new();
    let mut extraction = Extraction::empty(shape);
    extraction.scanned = entries.len();

    for (idx, fields) in entries.into_iter().enumerate() {
        let outcome = match fields {
            Some(fields) => accept(fields, query, options, &mut seen),
            None => EntryOutcome::Skipped(SkipReason::NotAnEntry),
        };
        match outcome {
            EntryOutcome::Accepted(record) => extraction.records.push(record),
            EntryOutcome::Skipped(reason) => {
                tracing::debug!(entry = idx, ?reason, "skipping raw entry");
                extraction.skipped.push(reason);
            }
        }
    }
    extraction
}

/// Applies fallbacks, URL resolution and the acceptance rule to one entry.
fn accept(
    fields: RawFields,
    query: &str,
    options: &NormalizeOptions,
    seen: &mut HashSet<String>,
) -> EntryOutcome {
    let price = fields.price.unwrap_or(0.0);
    if price <= 0.0 {
        return EntryOutcome::Skipped(SkipReason::UnparseablePrice);
    }
    if price >= options.price_ceiling {
        return EntryOutcome::Skipped(SkipReason::AboveCeiling { price });
    }

    let name = fields
        .name
        .map(|n| collapse_whitespace(&n))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| placeholder_name(query));
    let image_url = fields
        .image
        .and_then(|raw| resolve_url(&raw, &options.base_url));
    let product_url = fields
        .url
        .and_then(|raw| resolve_url(&raw, &options.base_url));

    let key = product_url
        .clone()
        .unwrap_or_else(|| format!("{name}|{price}"));
    if !seen.insert(key) {
        return EntryOutcome::Skipped(SkipReason::Duplicate);
    }

    EntryOutcome::Accepted(ProductRecord {
        name,
        price,
        image_url,
        product_url,
    })
}

/// Name used when an entry has no extractable title.
fn placeholder_name(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        "Product".to_string()
    } else {
        format!("{query} - Product")
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    fn structured(value: serde_json::Value) -> RawResponse {
        RawResponse::Structured(value)
    }

    #[test]
    fn widget_entry_is_normalized() {
        let raw = structured(json!({
            "results": [{
                "title": "Widget",
                "price": "$1,234.50",
                "image": "/img/w.png",
                "url": "/p/w"
            }]
        }));
        let records = normalize(&raw, "widget", &options());
        assert_eq!(
            records,
            vec![ProductRecord {
                name: "Widget".to_owned(),
                price: 1234.5,
                image_url: Some("https://www.bestbuy.com/img/w.png".to_owned()),
                product_url: Some("https://www.bestbuy.com/p/w".to_owned()),
            }]
        );
    }

    #[test]
    fn zero_price_entry_is_excluded_even_with_placeholder_name() {
        let raw = structured(json!({
            "results": [{ "title": "", "price": "$0", "image": null, "url": null }]
        }));
        let extraction = extract(&raw, "widget", &options());
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.skipped, vec![SkipReason::UnparseablePrice]);
    }

    #[test]
    fn price_at_or_above_ceiling_is_excluded() {
        let raw = structured(json!({
            "products": [
                { "name": "Gadget", "price": "$6,500.00" },
                { "name": "Exactly", "price": "$5,995.00" }
            ]
        }));
        let extraction = extract(&raw, "gadget", &options());
        assert!(extraction.records.is_empty());
        assert!(matches!(
            extraction.skipped[0],
            SkipReason::AboveCeiling { price } if (price - 6500.0).abs() < 1e-9
        ));
        assert_eq!(extraction.skipped.len(), 2);
    }

    #[test]
    fn unrecognized_mapping_yields_nothing() {
        let raw = structured(json!({ "message": "Unauthorized", "items": [1, 2] }));
        let extraction = extract(&raw, "tv", &options());
        assert_eq!(extraction.shape, PayloadShape::Unrecognized);
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn null_and_scalar_payloads_yield_nothing() {
        for value in [json!(null), json!(42), json!("text"), json!([]), json!({})] {
            assert!(normalize(&structured(value), "tv", &options()).is_empty());
        }
        assert!(normalize(&RawResponse::Markup(String::new()), "tv", &options()).is_empty());
    }

    #[test]
    fn missing_name_falls_back_to_query_placeholder() {
        let raw = structured(json!({ "products": [{ "price": 19.99 }] }));
        let records = normalize(&raw, "  usb cable ", &options());
        assert_eq!(records[0].name, "usb cable - Product");
        assert!((records[0].price - 19.99).abs() < 1e-9);
    }

    #[test]
    fn duplicates_by_product_url_are_dropped() {
        let raw = structured(json!({
            "products": [
                { "name": "A", "price": "$10", "url": "/p/a" },
                { "name": "A again", "price": "$11", "url": "https://www.bestbuy.com/p/a" },
                { "name": "B", "price": "$12", "url": "/p/b" }
            ]
        }));
        let extraction = extract(&raw, "a", &options());
        let names: Vec<_> = extraction.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(extraction.skipped, vec![SkipReason::Duplicate]);
    }

    #[test]
    fn structured_cap_bounds_scanned_entries() {
        let products: Vec<_> = (1..=30)
            .map(|i| json!({ "name": format!("Item {i}"), "price": format!("${i}.00") }))
            .collect();
        let raw = structured(json!({ "products": products }));
        let extraction = extract(&raw, "item", &options());
        assert_eq!(extraction.scanned, 10);
        assert_eq!(extraction.records.len(), 10);
        assert_eq!(extraction.records[0].name, "Item 1");
        assert_eq!(extraction.records[9].name, "Item 10");
    }

    #[test]
    fn non_object_entries_are_skipped_not_fatal() {
        let raw = structured(json!({
            "products": [
                "garbage",
                { "name": "Real", "price": "$5" },
                null
            ]
        }));
        let extraction = extract(&raw, "real", &options());
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(
            extraction.skipped,
            vec![SkipReason::NotAnEntry, SkipReason::NotAnEntry]
        );
    }

    #[test]
    fn rejected_backend_status_yields_nothing() {
        let raw = structured(json!({
            "results": [{ "status_code": 403, "content": "<html></html>" }]
        }));
        let extraction = extract(&raw, "tv", &options());
        assert_eq!(extraction.shape, PayloadShape::Rejected { status: 403 });
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn custom_ceiling_is_honoured() {
        let raw = structured(json!({
            "products": [
                { "name": "Cheap", "price": "$49.99" },
                { "name": "Pricey", "price": "$50.00" }
            ]
        }));
        let opts = options().with_price_ceiling(50.0);
        let records = normalize(&raw, "x", &opts);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Cheap");
    }

    #[test]
    fn lazy_image_placeholder_and_script_link_are_skipped() {
        let page = r#"
            <ol><li class="sku-item">
              <img src="data:image/gif;base64,R0lGOD" data-src="/images/6501.jpg">
              <h4 class="sku-title"><a href="javascript:void(0)">Lazy TV</a></h4>
              <div class="priceView-customer-price"><span aria-hidden="true">$499.99</span></div>
            </li></ol>
        "#;
        let records = normalize(&RawResponse::Markup(page.to_string()), "tv", &options());
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].image_url.as_deref(),
            Some("https://www.bestbuy.com/images/6501.jpg")
        );
        assert_eq!(records[0].product_url, None);
    }

    #[test]
    fn names_have_whitespace_collapsed() {
        let raw = structured(json!({
            "products": [{ "name": "  Big \n  TV ", "price": "$100" }]
        }));
        assert_eq!(normalize(&raw, "tv", &options())[0].name, "Big TV");
    }
}
