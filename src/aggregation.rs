//! Open interest bucketed by strike for one expiry.

use crate::instrument::{ExpiryKey, InstrumentError, InstrumentName, OptionType};
use deribit_client::{BookSummary, Instrument};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};


/// Strike → aggregate open interest, ascending by strike.
pub type StrikeOiMap = BTreeMap<Decimal, f64>;

/// Open interest of one currency and expiry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenInterestAggregate {
    /// Call open interest per strike.
    pub call_by_strike: StrikeOiMap,
    /// Put open interest per strike.
    pub put_by_strike: StrikeOiMap,
    /// Sum of call open interest.
    pub total_call_oi: f64,
    /// Sum of put open interest.
    pub total_put_oi: f64,
    /// First underlying price reported among the matched rows.
    pub underlying_price: Option<f64>,
}

impl OpenInterestAggregate {
    /// Every strike with call or put open interest, ascending.
    #[must_use]
    pub fn strikes(&self) -> Vec<Decimal> {
        let mut strikes: Vec<Decimal> = self
            .call_by_strike
            .keys()
            .chain(self.put_by_strike.keys())
            .copied()
            .collect();
        strikes.sort_unstable();
        strikes.dedup();
        strikes
    }

    /// Call plus put open interest.
    #[must_use]
    pub fn total_oi(&self) -> f64 {
        self.total_call_oi + self.total_put_oi
    }
}

/// Joins `book` rows to the `instruments` expiring on `expiry` and buckets
/// their open interest by strike and option type.
///
/// Rows whose option tag is neither `C` nor `P` are ignored, as are rows with
/// a malformed identifier. Neither input is modified, so aggregating the same
/// data twice yields the same maps.
#[must_use]
pub fn aggregate(
    instruments: &[Instrument],
    book: &[BookSummary],
    expiry: ExpiryKey,
) -> OpenInterestAggregate {
    let targets: HashSet<&str> = instruments
        .iter()
        .filter(|it| ExpiryKey::from_timestamp_ms(it.expiration_timestamp) == Some(expiry))
        .map(|it| it.instrument_name.as_str())
        .collect();

    let mut result = OpenInterestAggregate::default();

    for row in book {
        if !targets.contains(row.instrument_name.as_str()) {
            continue;
        }

        if result.underlying_price.is_none() {
            result.underlying_price = row.underlying_price;
        }

        let name = match InstrumentName::parse(&row.instrument_name) {
            Ok(name) => name,
            Err(InstrumentError::UnknownOptionType { name, tag }) => {
                debug!(%name, %tag, "skipping row with unknown option type");
                continue;
            }
            Err(err) => {
                warn!(error = %err, "skipping book summary row");
                continue;
            }
        };

        let bucket = match name.option_type {
            OptionType::Call => &mut result.call_by_strike,
            OptionType::Put => &mut result.put_by_strike,
        };
        *bucket.entry(name.strike).or_insert(0.0) += row.open_interest;
    }

    result.total_call_oi = result.call_by_strike.values().sum();
    result.total_put_oi = result.put_by_strike.values().sum();

    debug!(
        %expiry,
        matched = targets.len(),
        strikes = result.strikes().len(),
        "aggregated open interest"
    );
    result
}
