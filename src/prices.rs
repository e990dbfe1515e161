//! Time-boxed cache for the gold spot price and exchange rate.
//!
//! One snapshot holds both values. They refresh independently but share a
//! single staleness clock: a successful price fetch always re-anchors the
//! clock, a successful rate fetch only initializes it when unset. This
//! mirrors the upstream contract and is intentional, not a bug.

use crate::providers::{ExchangeRateProvider, GoldPriceProvider};
use chrono::Local;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Last-known upstream values plus the shared fetch clock.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    /// Price of one gram of 24k gold in USD.
    pub gold_price_usd: Option<f64>,
    /// USD to local currency multiplier.
    pub exchange_rate: Option<f64>,
    /// Instant of the anchoring fetch; `None` until the first success.
    pub fetched_at: Option<SystemTime>,
    /// Human-readable instant of the last price fetch.
    pub last_updated: Option<String>,
    /// Set when the most recent rate lookup had to fall back to the fixed
    /// constant instead of live data.
    pub rate_is_fallback: bool,
}

impl PriceSnapshot {
    pub fn unix_timestamp(&self) -> Option<f64> {
        self.fetched_at
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
    }
}

/// Refresh-or-serve-cached front for the upstream providers. The snapshot is
/// behind a mutex held across refresh, so concurrent requests cannot
/// interleave partial updates.
pub struct PriceCache {
    gold: Arc<dyn GoldPriceProvider>,
    rates: Arc<dyn ExchangeRateProvider>,
    ttl: Duration,
    fallback_rate: f64,
    quote_currency: String,
    snapshot: Mutex<PriceSnapshot>,
}

impl PriceCache {
    pub fn new(
        gold: Arc<dyn GoldPriceProvider>,
        rates: Arc<dyn ExchangeRateProvider>,
        ttl: Duration,
        fallback_rate: f64,
        quote_currency: &str,
    ) -> Self {
        PriceCache {
            gold,
            rates,
            ttl,
            fallback_rate,
            quote_currency: quote_currency.to_string(),
            snapshot: Mutex::new(PriceSnapshot::default()),
        }
    }

    fn is_fresh(&self, snapshot: &PriceSnapshot) -> bool {
        snapshot
            .fetched_at
            .and_then(|t| t.elapsed().ok())
            .is_some_and(|age| age < self.ttl)
    }

    /// Cached gold price when fresh, otherwise one upstream fetch attempt.
    /// Returns `None` when the fetch fails; the cached value is left in
    /// place for later calls.
    pub async fn get_gold_price_usd(&self, force_refresh: bool) -> Option<f64> {
        let mut snapshot = self.snapshot.lock().await;

        if !force_refresh && self.is_fresh(&snapshot) {
            if let Some(price) = snapshot.gold_price_usd {
                debug!("Using cached gold price");
                return Some(price);
            }
        }

        info!("Fetching fresh gold price data");
        match self.gold.fetch_spot().await {
            Ok(price) => {
                snapshot.gold_price_usd = Some(price);
                snapshot.fetched_at = Some(SystemTime::now());
                snapshot.last_updated =
                    Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
                Some(price)
            }
            Err(e) => {
                warn!(error = %e, "Gold price fetch failed");
                None
            }
        }
    }

    /// Cached rate when fresh, otherwise one upstream fetch attempt. A
    /// failed fetch yields the fixed fallback constant; this never errors.
    pub async fn get_exchange_rate(&self, force_refresh: bool) -> f64 {
        let mut snapshot = self.snapshot.lock().await;

        if !force_refresh && self.is_fresh(&snapshot) {
            if let Some(rate) = snapshot.exchange_rate {
                debug!("Using cached exchange rate");
                return rate;
            }
        }

        info!("Fetching fresh exchange rate data");
        match self.rates.fetch_rate("USD", &self.quote_currency).await {
            Ok(rate) => {
                snapshot.exchange_rate = Some(rate);
                if snapshot.fetched_at.is_none() {
                    snapshot.fetched_at = Some(SystemTime::now());
                }
                snapshot.rate_is_fallback = false;
                rate
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = self.fallback_rate,
                    "Exchange rate fetch failed, using fallback rate"
                );
                snapshot.rate_is_fallback = true;
                self.fallback_rate
            }
        }
    }

    pub async fn snapshot(&self) -> PriceSnapshot {
        self.snapshot.lock().await.clone()
    }
}
