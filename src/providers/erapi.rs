use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::ExchangeRateProvider;

/// open.er-api.com client. Unauthenticated; returns all rates for a base
/// currency in one call.
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("goldtrack/0.1")
            .timeout(timeout)
            .build()?;
        Ok(OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl ExchangeRateProvider for OpenErApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {e} for URL: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("API Error: {status}"));
        }

        let data = response.json::<RatesResponse>().await?;
        data.rates
            .get(quote)
            .copied()
            .ok_or_else(|| anyhow!("No {quote} rate in API response"))
    }
}
