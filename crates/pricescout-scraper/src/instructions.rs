//! Parsing instructions sent to the scraping service.
//!
//! When parsing is enabled the service applies these selector pipelines on
//! its side and returns `{"products": [{"title", "price", "image", "url"}]}`
//! inside the job's `content`, which the structured normalizer reads
//! directly.

use serde_json::{json, Value};

fn css_text(selector: &str) -> Value {
    json!({
        "_fns": [
            { "_fn": "css_one", "_args": [selector] },
            { "_fn": "element_text" }
        ]
    })
}

fn xpath_attr(xpath: &str) -> Value {
    json!({
        "_fns": [
            { "_fn": "xpath_one", "_args": [xpath] }
        ]
    })
}

/// Instructions that pull one object per listing container on a search page.
#[must_use]
pub fn listing_instructions() -> Value {
    json!({
        "products": {
            "_fns": [
                { "_fn": "css", "_args": ["li.sku-item"] }
            ],
            "_items": {
                "title": css_text("h4.sku-title"),
                "price": css_text("div.priceView-customer-price span"),
                "image": xpath_attr(".//img/@src"),
                "url": xpath_attr(".//h4[contains(@class, 'sku-title')]/a/@href")
            }
        }
    })
}
