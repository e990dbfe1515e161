use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::GoldPriceProvider;

/// Grams in one troy ounce, for quotes published per ounce.
pub const TROY_OUNCE_GRAMS: f64 = 31.1035;

/// GoldAPI (goldapi.io) client. Authenticates with an access token header.
pub struct GoldApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoldApiProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("goldtrack/0.1")
            .timeout(timeout)
            .build()?;
        Ok(GoldApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn fetch_quote(&self, url: &str) -> Result<f64> {
        debug!("Requesting gold price data from {}", url);

        let response = self
            .client
            .get(url)
            .header("x-access-token", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {e} for URL: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("API Error: {status} - {body}"));
        }

        let quote = response.json::<GoldQuote>().await?;
        quote
            .price_per_gram()
            .ok_or_else(|| anyhow!("Gold price data not available in API response"))
    }
}

#[derive(Debug, Deserialize)]
struct GoldQuote {
    price_gram_24k: Option<f64>,
    price: Option<f64>,
}

impl GoldQuote {
    /// Prefers the per-gram 24k field; falls back to converting the
    /// per-ounce price.
    fn price_per_gram(&self) -> Option<f64> {
        self.price_gram_24k
            .or_else(|| self.price.map(|p| p / TROY_OUNCE_GRAMS))
    }
}

#[async_trait]
impl GoldPriceProvider for GoldApiProvider {
    #[instrument(name = "GoldSpotFetch", skip(self))]
    async fn fetch_spot(&self) -> Result<f64> {
        self.fetch_quote(&format!("{}/XAU/USD", self.base_url)).await
    }

    #[instrument(name = "GoldHistoricalFetch", skip(self), fields(date = %date))]
    async fn fetch_for_date(&self, date: NaiveDate) -> Result<f64> {
        let url = format!("{}/XAU/USD/{}", self.base_url, date.format("%Y%m%d"));
        self.fetch_quote(&url).await
    }
}
