//! On-demand price lookup for past dates.

use crate::prices::PriceCache;
use crate::providers::GoldPriceProvider;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HistoricalQuote {
    /// USD per gram on the requested date.
    pub price_usd: f64,
    /// Converted with the cache's current exchange rate, which may be older
    /// than the requested date.
    pub price_local: f64,
    pub exchange_rate: f64,
}

/// Fetches the gold price for `date` and converts it with the currently
/// cached exchange rate. Historical fetches are never written back into the
/// price cache.
pub async fn lookup(
    provider: &dyn GoldPriceProvider,
    cache: &PriceCache,
    date: NaiveDate,
) -> Result<HistoricalQuote> {
    let price_usd = provider.fetch_for_date(date).await?;
    let exchange_rate = cache.get_exchange_rate(false).await;

    Ok(HistoricalQuote {
        price_usd,
        price_local: price_usd * exchange_rate,
        exchange_rate,
    })
}
