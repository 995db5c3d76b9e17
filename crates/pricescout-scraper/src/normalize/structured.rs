//! Structured (JSON) payloads.
//!
//! Responses arrive in several envelopes depending on where they came from:
//!
//! - `{"products": [entry, ...]}` or `{"results": [entry, ...]}`
//! - a scraping-service job: `{"results": [{"content": ..., "status_code": 200}]}`
//!   where `content` is either the page markup or a parsed object
//! - a parsed search page: `{"content": {"results": {"organic": [entry, ...]}}}`
//!
//! [`locate`] walks these envelopes (bounded depth) to the first entry list
//! it recognizes. Entries then go through ordered field rules.

use serde_json::{Map, Value};

use super::RawFields;
use crate::price::{extract_price, looks_like_price};

/// Keys that may hold entries or a further-nested envelope, in lookup order.
const ENVELOPE_KEYS: [&str; 4] = ["products", "results", "organic", "content"];

const MAX_ENVELOPE_DEPTH: usize = 6;

/// Where the entries of a structured payload were found.
#[derive(Debug)]
pub(super) enum Located<'a> {
    Entries(&'a [Value]),
    Markup(&'a str),
    Rejected(u16),
}

/// A single way to read a logical field from an entry.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// `entry[key]`
    Key(&'static str),
    /// `entry[outer][inner]`
    Nested(&'static str, &'static str),
    /// `entry[key][0]`, or `entry[key][0][inner]` when the element is an object.
    FirstOf(&'static str, &'static str),
}

const NAME_RULES: &[Rule] = &[
    Rule::Key("title"),
    Rule::Key("name"),
    Rule::Key("product_name"),
    Rule::Nested("product", "name"),
];

const PRICE_RULES: &[Rule] = &[
    Rule::Key("price"),
    Rule::Key("price_range"),
    Rule::Key("price_str"),
    Rule::Nested("price", "current"),
    Rule::Nested("price", "value"),
    Rule::Key("sale_price"),
];

const IMAGE_RULES: &[Rule] = &[
    Rule::Key("image"),
    Rule::Key("image_url"),
    Rule::Key("thumbnail"),
    Rule::Nested("image", "url"),
    Rule::Nested("image", "src"),
    Rule::FirstOf("images", "url"),
];

const URL_RULES: &[Rule] = &[
    Rule::Key("url"),
    Rule::Key("product_url"),
    Rule::Key("link"),
    Rule::Key("href"),
];

impl Rule {
    fn apply<'a>(&self, entry: &'a Map<String, Value>) -> Option<&'a Value> {
        match *self {
            Rule::Key(key) => entry.get(key),
            Rule::Nested(outer, inner) => entry.get(outer)?.get(inner),
            Rule::FirstOf(key, inner) => {
                let first = entry.get(key)?.as_array()?.first()?;
                if first.is_object() {
                    first.get(inner)
                } else {
                    Some(first)
                }
            }
        }
    }
}

/// Finds the entry list (or markup, or a backend rejection) in `value`.
pub(super) fn locate(value: &Value) -> Option<Located<'_>> {
    locate_at(value, 0)
}

fn locate_at(value: &Value, depth: usize) -> Option<Located<'_>> {
    if depth > MAX_ENVELOPE_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            if let Some(status) = backend_status(map) {
                if !(200..300).contains(&status) {
                    return Some(Located::Rejected(status));
                }
            }
            for key in ENVELOPE_KEYS {
                let Some(child) = map.get(key) else {
                    continue;
                };
                let found = match child {
                    Value::String(document) if key == "content" => {
                        Some(Located::Markup(document.as_str()))
                    }
                    Value::Array(items) if key != "content" && items.is_empty() => {
                        Some(Located::Entries(items.as_slice()))
                    }
                    Value::Array(_) | Value::Object(_) => locate_at(child, depth + 1),
                    _ => None,
                };
                if found.is_some() {
                    return found;
                }
            }
            None
        }
        Value::Array(items) => {
            if items.iter().any(looks_like_entry) {
                return Some(Located::Entries(items.as_slice()));
            }
            items.iter().find_map(|item| locate_at(item, depth + 1))
        }
        _ => None,
    }
}

/// Job-level status reported by a scraping service, if any.
fn backend_status(map: &Map<String, Value>) -> Option<u16> {
    let status = map.get("status_code")?;
    status
        .as_u64()
        .or_else(|| status.as_str().and_then(|s| s.trim().parse().ok()))
        .and_then(|s| u16::try_from(s).ok())
}

fn looks_like_entry(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    NAME_RULES
        .iter()
        .chain(PRICE_RULES)
        .any(|rule| rule.apply(map).is_some())
}

/// Applies the field rules to one entry. Non-object entries yield `None`.
pub(super) fn extract_fields(entry: &Value) -> Option<RawFields> {
    let map = entry.as_object()?;
    Some(RawFields {
        name: first_text(map, NAME_RULES),
        price: first_price(map),
        image: first_text(map, IMAGE_RULES),
        url: first_text(map, URL_RULES),
    })
}

/// First rule whose value is a non-empty string (numbers are stringified).
fn first_text(entry: &Map<String, Value>, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| {
        let text = match rule.apply(entry)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

/// First rule whose value is price-like; numeric values are used directly,
/// text goes through [`extract_price`].
fn first_price(entry: &Map<String, Value>) -> Option<f64> {
    PRICE_RULES.iter().find_map(|rule| match rule.apply(entry)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(s) if looks_like_price(s) => Some(extract_price(s)),
        _ => None,
    })
}
