//! Instrument identifiers, currencies and expiry keys.
//!
//! Deribit encodes everything the aggregation needs in the instrument name,
//! `{CURRENCY}-{EXPIRY_CODE}-{STRIKE}-{C|P}`. [`InstrumentName::parse`] is the
//! only place that splits that string; the rest of the crate works on the typed
//! result.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;


/// Date format of an [`ExpiryKey`].
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while parsing identifiers and request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    /// Identifier is not `{CURRENCY}-{EXPIRY}-{STRIKE}-{TYPE}` with a numeric strike.
    #[error("malformed instrument identifier: {0}")]
    MalformedIdentifier(String),
    /// Option type tag is neither `C` nor `P`.
    #[error("unknown option type `{tag}` in {name}")]
    UnknownOptionType {
        /// Full identifier.
        name: String,
        /// Offending tag.
        tag: String,
    },
    /// Currency outside the supported set.
    #[error("currency must be BTC or ETH, got `{0}`")]
    InvalidCurrency(String),
    /// Expiry not in `YYYY-MM-DD` form.
    #[error("expiry must be YYYY-MM-DD, got `{0}`")]
    InvalidExpiry(String),
}

/// Currencies with listed options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    /// Bitcoin.
    Btc,
    /// Ether.
    Eth,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Currency; 2] = [Currency::Btc, Currency::Eth];

    /// Upstream symbol of the currency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Btc => "BTC",
            Self::Eth => "ETH",
        }
    }
}

impl FromStr for Currency {
    type Err = InstrumentError;

    /// Case-insensitive; `btc` is accepted and normalized to `BTC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        Self::ALL
            .into_iter()
            .find(|currency| currency.as_str().eq_ignore_ascii_case(symbol))
            .ok_or_else(|| InstrumentError::InvalidCurrency(s.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Option type encoded in the last segment of an instrument name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Call (`C`).
    Call,
    /// Put (`P`).
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Parsed form of an option instrument name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentName {
    /// Currency prefix, as written by the upstream.
    pub currency: String,
    /// Exchange expiry code, e.g. `29AUG25`.
    pub expiry_code: String,
    /// Strike price, normalized (`60000.0` and `60000` are the same key).
    pub strike: Decimal,
    /// Call or put.
    pub option_type: OptionType,
}

impl InstrumentName {
    /// Parses `BTC-29AUG25-60000-C`.
    ///
    /// # Errors
    /// Returns [`InstrumentError::MalformedIdentifier`] when the name does not
    /// have four segments or the strike is not a number, and
    /// [`InstrumentError::UnknownOptionType`] when the tag is not `C` or `P`.
    pub fn parse(name: &str) -> Result<Self, InstrumentError> {
        let malformed = || InstrumentError::MalformedIdentifier(name.to_string());

        let parts: Vec<&str> = name.split('-').collect();
        let [currency, expiry_code, strike, tag] = parts.as_slice() else {
            return Err(malformed());
        };

        if currency.is_empty() || expiry_code.is_empty() {
            return Err(malformed());
        }
        let strike = Decimal::from_str(strike).map_err(|_| malformed())?;

        let option_type = match *tag {
            "C" => OptionType::Call,
            "P" => OptionType::Put,
            other => {
                return Err(InstrumentError::UnknownOptionType {
                    name: name.to_string(),
                    tag: other.to_string(),
                });
            }
        };

        Ok(Self {
            currency: (*currency).to_string(),
            expiry_code: (*expiry_code).to_string(),
            strike: strike.normalize(),
            option_type,
        })
    }
}

/// Calendar day (UTC) an option expires on, rendered `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpiryKey(NaiveDate);

impl ExpiryKey {
    /// Truncates an epoch-millisecond timestamp to its UTC day.
    ///
    /// Returns `None` for timestamps outside the representable range.
    #[must_use]
    pub fn from_timestamp_ms(timestamp_ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(timestamp_ms).map(|dt| Self(dt.date_naive()))
    }

    /// Parses a request parameter. Only the zero-padded `YYYY-MM-DD` form of a
    /// real calendar date is accepted: `2025-8-29` is rejected.
    ///
    /// # Errors
    /// Returns [`InstrumentError::InvalidExpiry`] otherwise.
    pub fn parse(s: &str) -> Result<Self, InstrumentError> {
        let invalid = || InstrumentError::InvalidExpiry(s.to_string());

        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(s, EXPIRY_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Underlying calendar date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl FromStr for ExpiryKey {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ExpiryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(EXPIRY_FORMAT))
    }
}

impl Serialize for ExpiryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
