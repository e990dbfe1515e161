//! Upstream price and exchange-rate sources.

pub mod erapi;
pub mod goldapi;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of the spot price of one gram of 24-karat gold, in USD.
#[async_trait]
pub trait GoldPriceProvider: Send + Sync {
    async fn fetch_spot(&self) -> Result<f64>;

    /// Point-in-time price for a past calendar date.
    async fn fetch_for_date(&self, date: NaiveDate) -> Result<f64>;
}

/// Source of currency conversion rates.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Multiplier converting one unit of `base` into `quote`.
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64>;
}
