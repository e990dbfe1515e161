pub mod api;
pub mod config;
pub mod history;
pub mod log;
pub mod prices;
pub mod providers;
pub mod store;
pub mod transfer;
pub mod valuation;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Gold tracker starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let store: Arc<dyn store::PurchaseStore> =
        Arc::new(store::disk::DiskStore::open(&data_path.join("purchases"))?);
    let state = build_state(&config, store)?;

    let app = api::create_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {addr}");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Wires providers and the price cache onto the given store.
pub fn build_state(
    config: &config::AppConfig,
    store: Arc<dyn store::PurchaseStore>,
) -> Result<api::AppState> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let gold: Arc<dyn providers::GoldPriceProvider> =
        Arc::new(providers::goldapi::GoldApiProvider::new(
            config.goldapi_base_url(),
            &config.gold_api_key(),
            timeout,
        )?);
    let rates: Arc<dyn providers::ExchangeRateProvider> = Arc::new(
        providers::erapi::OpenErApiProvider::new(config.exchange_base_url(), timeout)?,
    );

    let prices = Arc::new(prices::PriceCache::new(
        Arc::clone(&gold),
        rates,
        Duration::from_secs(config.cache_ttl_secs),
        config.fallback_rate,
        &config.currency,
    ));

    Ok(api::AppState {
        store,
        prices,
        gold,
        currency: config.currency.clone(),
    })
}
