//! Current and historical price handlers

use super::{AppState, error::ApiError};
use crate::history;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub async fn current_price(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Value>, ApiError> {
    let price_usd = state
        .prices
        .get_gold_price_usd(query.refresh)
        .await
        .ok_or_else(|| ApiError::Upstream("Failed to get gold price data".to_string()))?;
    let exchange_rate = state.prices.get_exchange_rate(query.refresh).await;
    let snapshot = state.prices.snapshot().await;

    let price = price_usd * exchange_rate;
    info!(
        price,
        currency = %state.currency,
        refreshed = query.refresh,
        "Serving current gold price"
    );

    Ok(Json(json!({
        "success": true,
        "price": price,
        "price_usd": price_usd,
        "currency": state.currency,
        "exchange_rate": exchange_rate,
        "timestamp": snapshot.unix_timestamp(),
        "last_updated": snapshot.last_updated,
        "cached": !query.refresh && snapshot.fetched_at.is_some(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoricalQuery {
    pub date: Option<String>,
}

pub async fn historical_price(
    State(state): State<AppState>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Date parameter is required".to_string()))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date format: {date}")))?;

    let quote = history::lookup(state.gold.as_ref(), &state.prices, date)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    info!(%date, price = quote.price_local, "Serving historical gold price");

    Ok(Json(json!({
        "success": true,
        "price": quote.price_local,
        "price_usd": quote.price_usd,
        "currency": state.currency,
        "exchange_rate": quote.exchange_rate,
        "date": date.format("%Y-%m-%d").to_string(),
    })))
}
