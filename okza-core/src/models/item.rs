//! Product listing types and price coercion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Item
// ============================================================================

/// One product listing returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Listing title.
    #[serde(default)]
    pub title: String,
    /// Listing URL.
    #[serde(default)]
    pub url: String,
    /// Numeric price, `0.0` when the provider price was missing or unparsable.
    #[serde(default)]
    pub price: f64,
    /// Currency code as reported by the provider.
    #[serde(default)]
    pub currency: String,
    /// Seller name.
    #[serde(default)]
    pub seller: String,
    /// Whether `price` came from a parsed provider value.
    #[serde(default)]
    pub price_known: bool,
}

impl Item {
    /// Creates an item with a known price and empty text fields.
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            url: String::new(),
            price,
            currency: String::new(),
            seller: String::new(),
            price_known: true,
        }
    }

    /// Builds an item from one entry of the provider `items` list.
    ///
    /// Returns `None` when the entry is not a JSON object. Missing or
    /// non-string text fields become empty strings; the price goes through
    /// [`coerce_price`].
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let parsed = coerce_price(obj.get("price"));

        Some(Self {
            title: text("title"),
            url: text("url"),
            price: parsed.unwrap_or(0.0),
            currency: text("currency"),
            seller: text("seller"),
            price_known: parsed.is_some(),
        })
    }

    /// Sets the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the seller.
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = seller.into();
        self
    }

    /// Marks the price as missing and resets it to `0.0`.
    pub fn without_price(mut self) -> Self {
        self.price = 0.0;
        self.price_known = false;
        self
    }
}

// ============================================================================
// Price Coercion
// ============================================================================

/// Coerces a raw provider price into a finite number.
///
/// JSON numbers are used as-is, strings are trimmed and parsed as decimals.
/// Returns `None` for anything else, including `null`, unparsable strings,
/// and non-finite values.
pub fn coerce_price(value: Option<&Value>) -> Option<f64> {
    let price = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    price.is_finite().then_some(price)
}
