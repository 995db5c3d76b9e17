//! Markup (HTML) payloads.
//!
//! A search page is scanned for repeating listing containers. Several
//! container signatures are known; they are tried in order and the first
//! one that matches anything wins. Each container is then read through
//! ordered field rules, first non-empty value per field.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{collapse_whitespace, RawFields};
use crate::price::{extract_price, looks_like_price};

/// Listing container signatures, most specific first.
const CONTAINER_SIGNATURES: &[&str] = &[
    "li.sku-item",
    "div.shop-sku-list-item",
    "div.sku-item",
    "div.product-list-item",
    "div.product-item",
];

/// Where a field value comes from inside a container.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Text content of the first matching element.
    Text,
    /// An attribute of the first matching element.
    Attr(&'static str),
}

struct Rule {
    selector: Selector,
    source: Source,
}

impl Rule {
    fn apply(&self, container: ElementRef<'_>) -> Option<String> {
        let element = container.select(&self.selector).next()?;
        let value = match self.source {
            Source::Text => collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
            Source::Attr(attr) => element.value().attr(attr)?.trim().to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

fn compile(rules: &[(&'static str, Source)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|&(css, source)| Rule {
            selector: Selector::parse(css).expect("valid field selector"),
            source,
        })
        .collect()
}

static CONTAINERS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    CONTAINER_SIGNATURES
        .iter()
        .map(|&css| (css, Selector::parse(css).expect("valid container selector")))
        .collect()
});

static NAME_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    compile(&[
        ("h4.sku-title", Source::Text),
        ("h4.sku-header", Source::Text),
        (".sku-title", Source::Text),
        ("h2.product-title", Source::Text),
        (".product-title", Source::Text),
        ("img[alt]", Source::Attr("alt")),
    ])
});

static PRICE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    compile(&[
        (
            "div.priceView-customer-price span[aria-hidden='true']",
            Source::Text,
        ),
        ("div.priceView-customer-price", Source::Text),
        ("span.priceView-layout-large", Source::Text),
        ("[data-testid='customer-price']", Source::Text),
        (".price", Source::Text),
    ])
});

static IMAGE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    compile(&[
        // Lazy-loaded thumbnails carry a data: placeholder in src.
        ("img.product-image:not([src^='data:'])", Source::Attr("src")),
        ("img[src]:not([src^='data:'])", Source::Attr("src")),
        ("img[data-src]", Source::Attr("data-src")),
    ])
});

static URL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    compile(&[
        ("a.image-link", Source::Attr("href")),
        (".sku-title a", Source::Attr("href")),
        (".sku-header a", Source::Attr("href")),
        ("a[href]:not([href^='javascript:'])", Source::Attr("href")),
    ])
});

/// Scans `document` for listing containers and reads up to `cap` of them.
///
/// Returns the selector that matched along with one entry per container, or
/// `None` when no known container signature occurs in the document.
pub(super) fn extract_fields(
    document: &str,
    cap: usize,
) -> Option<(&'static str, Vec<Option<RawFields>>)> {
    let html = Html::parse_document(document);

    CONTAINERS.iter().find_map(|(css, selector)| {
        let entries: Vec<Option<RawFields>> = html
            .select(selector)
            .take(cap)
            .map(|container| Some(read_container(container)))
            .collect();
        (!entries.is_empty()).then_some((*css, entries))
    })
}

fn read_container(container: ElementRef<'_>) -> RawFields {
    RawFields {
        name: first_value(container, &NAME_RULES),
        price: PRICE_RULES
            .iter()
            .filter_map(|rule| rule.apply(container))
            .find(|text| looks_like_price(text))
            .map(|text| extract_price(&text)),
        image: first_value(container, &IMAGE_RULES),
        url: first_value(container, &URL_RULES),
    }
}

fn first_value(container: ElementRef<'_>, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(container))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body><ol class="sku-item-list">
          <li class="sku-item">
            <a class="image-link" href="/site/tv-55/6501.p?skuId=6501">
              <img class="product-image" src="https://pisces.bbystatic.com/6501.jpg" alt="TV image">
            </a>
            <h4 class="sku-title"><a href="/site/tv-55/6501.p?skuId=6501">55" Class   4K TV</a></h4>
            <div class="priceView-customer-price">
              <span aria-hidden="true">$499.99</span>
              <span class="sr-only">Your price for this item is $499.99</span>
            </div>
          </li>
          <li class="sku-item">
            <h4 class="sku-title"><a href="/site/soundbar/7702.p">Soundbar</a></h4>
            <div class="priceView-customer-price"><span aria-hidden="true">$1,299.00</span></div>
            <img data-src="/images/7702.jpg">
          </li>
        </ol></body></html>
    "#;

    #[test]
    fn first_matching_signature_wins() {
        let (selector, entries) = extract_fields(SEARCH_PAGE, 20).unwrap();
        assert_eq!(selector, "li.sku-item");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn container_fields_are_read() {
        let (_, entries) = extract_fields(SEARCH_PAGE, 20).unwrap();
        let first = entries[0].as_ref().unwrap();
        assert_eq!(first.name.as_deref(), Some("55\" Class 4K TV"));
        assert_eq!(first.price, Some(499.99));
        assert_eq!(
            first.image.as_deref(),
            Some("https://pisces.bbystatic.com/6501.jpg")
        );
        assert_eq!(first.url.as_deref(), Some("/site/tv-55/6501.p?skuId=6501"));

        let second = entries[1].as_ref().unwrap();
        assert_eq!(second.price, Some(1299.0));
        assert_eq!(second.image.as_deref(), Some("/images/7702.jpg"));
        assert_eq!(second.url.as_deref(), Some("/site/soundbar/7702.p"));
    }

    #[test]
    fn legacy_container_signature_is_supported() {
        let doc = r#"
            <div class="shop-sku-list-item">
              <h4 class="sku-header">Laptop</h4>
              <span class="priceView-layout-large">$899.00</span>
            </div>
        "#;
        let (selector, entries) = extract_fields(doc, 20).unwrap();
        assert_eq!(selector, "div.shop-sku-list-item");
        let fields = entries[0].as_ref().unwrap();
        assert_eq!(fields.name.as_deref(), Some("Laptop"));
        assert_eq!(fields.price, Some(899.0));
        assert_eq!(fields.url, None);
    }

    #[test]
    fn cap_limits_containers_read() {
        let doc: String = (0..30)
            .map(|i| format!(r#"<li class="sku-item"><h4 class="sku-title">Item {i}</h4></li>"#))
            .collect();
        let (_, entries) = extract_fields(&doc, 20).unwrap();
        assert_eq!(entries.len(), 20);
    }

    #[test]
    fn unknown_markup_is_none() {
        assert!(extract_fields("<html><body><p>Access denied</p></body></html>", 20).is_none());
    }

    #[test]
    fn missing_price_is_none_not_zero() {
        let doc = r#"<li class="sku-item"><h4 class="sku-title">Coming soon</h4>
            <div class="priceView-customer-price">Sold Out</div></li>"#;
        let (_, entries) = extract_fields(doc, 20).unwrap();
        assert_eq!(entries[0].as_ref().unwrap().price, None);
    }
}
