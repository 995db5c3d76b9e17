use serde::{Deserialize, Serialize};

/// A single retail listing extracted from a search page, normalized for
/// display.
///
/// Records are transient: one list is built per search and discarded when
/// the next search begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Listing title. Never empty; falls back to `"{query} - Product"`.
    pub name: String,
    /// Price in the site's currency. Surfaced records always satisfy
    /// `0 < price < ceiling`.
    pub price: f64,
    /// Absolute thumbnail URL, if the listing had one.
    pub image_url: Option<String>,
    /// Absolute URL of the product page, if the listing had one.
    pub product_url: Option<String>,
}

impl ProductRecord {
    /// Formats the price with a dollar sign, thousands separators and two
    /// decimals, e.g. `"$1,234.50"`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_usd(self.price)
    }
}

/// Formats `amount` as `$#,###.##`.
#[must_use]
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
