//! Wire types for the Deribit public API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;


/// Instrument kind requested from the upstream. Only options are in scope.
pub const OPTION_KIND: &str = "option";

/// One instrument as returned by `public/get_instruments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Identifier, e.g. `BTC-29AUG25-60000-C`.
    pub instrument_name: String,
    /// Expiration time in epoch milliseconds.
    pub expiration_timestamp: i64,
    /// Underlying currency.
    #[serde(default)]
    pub base_currency: String,
    /// Instrument kind (`option`).
    #[serde(default)]
    pub kind: String,
}

/// One row of `public/get_book_summary_by_currency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    /// Identifier of the instrument the row belongs to; empty when absent.
    #[serde(default)]
    pub instrument_name: String,
    /// Open interest; 0 when absent, null or not numeric.
    #[serde(default, deserialize_with = "zero_if_missing")]
    pub open_interest: f64,
    /// Price of the underlying, not reported for every row.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub underlying_price: Option<f64>,
}

/// Query of `public/get_instruments`.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentsQuery<'a> {
    /// Currency symbol.
    pub currency: &'a str,
    /// Whether expired instruments are included.
    pub expired: bool,
    /// Instrument kind.
    pub kind: &'a str,
}

/// Query of `public/get_book_summary_by_currency`.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummaryQuery<'a> {
    /// Currency symbol.
    pub currency: &'a str,
    /// Instrument kind.
    pub kind: &'a str,
}

/// Reads a number that may be encoded as a JSON number or a numeric string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|v| v.is_finite()))
}

fn zero_if_missing<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.unwrap_or(0.0))
}
