//! Price text parsing.

use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid price regex"));

/// Extracts the first decimal number from freeform price text.
///
/// Thousands separators are removed before matching, so `"$1,234.50"` yields
/// `1234.5`. Currency symbols, ranges and surrounding words are ignored; for
/// `"$10 - $20"` only the first token counts. Returns `0.0` when the text has
/// no number, which callers treat as "unparseable".
#[must_use]
pub fn extract_price(text: &str) -> f64 {
    let without_separators = text.replace(',', "");
    NUMBER_RE
        .find(&without_separators)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Whether `text` contains anything a price could be read from.
pub(crate) fn looks_like_price(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_price(text: &str, expected: f64) {
        let got = extract_price(text);
        assert!(
            (got - expected).abs() < 1e-9,
            "extract_price({text:?}) = {got}, expected {expected}"
        );
    }

    #[test]
    fn dollar_amount_with_thousands_separator() {
        assert_price("$1,234.50", 1234.5);
    }

    #[test]
    fn whole_dollar_amount() {
        assert_price("$799", 799.0);
    }

    #[test]
    fn range_uses_first_token() {
        assert_price("$10.99 - $24.99", 10.99);
    }

    #[test]
    fn surrounding_text_is_ignored() {
        assert_price("Your price for this item is $2,049.99 today", 2049.99);
    }

    #[test]
    fn trailing_dot_without_fraction() {
        assert_price("12. dollars", 12.0);
    }

    #[test]
    fn zero_amount() {
        assert_price("$0", 0.0);
    }

    #[test]
    fn no_digits_is_zero() {
        assert_price("Sold Out", 0.0);
        assert_price("", 0.0);
    }

    #[test]
    fn looks_like_price_requires_a_digit() {
        assert!(looks_like_price("$5"));
        assert!(!looks_like_price("See price in cart"));
    }
}
