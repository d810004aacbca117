//! HTTP client library for the Deribit public market-data API.
//!
//! This crate provides a typed client for the two public endpoints the max pain
//! backend consumes: the list of non-expired option instruments of a currency and
//! the book summary (open interest, underlying price) of every option of a
//! currency. Every request goes through a bounded retry loop with linear backoff.
//!
//! # Example
//!
//! ```no_run
//! use deribit_client::{ClientConfig, DeribitClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), deribit_client::Error> {
//!     let client = DeribitClient::new(ClientConfig::default())?;
//!
//!     let instruments = client.get_instruments("BTC").await?;
//!     println!("{} live BTC options", instruments.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod retry;
mod types;

pub use client::{ClientConfig, DEFAULT_BASE_URL, DeribitClient};
pub use error::Error;
pub use retry::RetryPolicy;
pub use types::*;
