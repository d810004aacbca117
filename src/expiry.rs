//! Distinct expiry dates of a set of instruments.

use crate::instrument::ExpiryKey;
use deribit_client::Instrument;
use std::collections::HashMap;

/// Returns the distinct expiry days of `instruments`, earliest first.
///
/// Each day is ordered by the earliest expiration timestamp seen for it.
/// Instruments with a timestamp outside the representable range are skipped.
#[must_use]
pub fn resolve_expiries(instruments: &[Instrument]) -> Vec<ExpiryKey> {
    let mut earliest: HashMap<ExpiryKey, i64> = HashMap::new();

    for instrument in instruments {
        let ts = instrument.expiration_timestamp;
        let Some(key) = ExpiryKey::from_timestamp_ms(ts) else {
            continue;
        };
        earliest
            .entry(key)
            .and_modify(|seen| *seen = (*seen).min(ts))
            .or_insert(ts);
    }

    let mut expiries: Vec<(ExpiryKey, i64)> = earliest.into_iter().collect();
    expiries.sort_by_key(|&(key, ts)| (ts, key));
    expiries.into_iter().map(|(key, _)| key).collect()
}
