//! Purchase collection handlers

use super::{AppState, error::ApiError, prices::RefreshQuery};
use crate::store::{NewPurchase, Purchase};
use crate::valuation::{self, Valuation};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Serialize)]
struct PurchaseRow {
    #[serde(flatten)]
    purchase: Purchase,
    #[serde(flatten)]
    valuation: Valuation,
    current_price: f64,
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Value>, ApiError> {
    let purchases = state.store.list_all();

    let price_usd = state
        .prices
        .get_gold_price_usd(query.refresh)
        .await
        .ok_or_else(|| ApiError::Upstream("Failed to get gold price data".to_string()))?;
    let exchange_rate = state.prices.get_exchange_rate(query.refresh).await;
    let current_price = price_usd * exchange_rate;
    let snapshot = state.prices.snapshot().await;

    let mut valuations = Vec::with_capacity(purchases.len());
    let mut rows = Vec::with_capacity(purchases.len());
    for purchase in purchases {
        let valuation = valuation::evaluate(purchase.purchase_price, current_price, purchase.grams);
        valuations.push(valuation.clone());
        rows.push(PurchaseRow {
            purchase,
            valuation,
            current_price,
        });
    }
    let totals = valuation::aggregate(&valuations);

    info!(
        count = rows.len(),
        total_profit_loss = totals.total_profit_loss,
        "Calculated purchases profit/loss"
    );

    Ok(Json(json!({
        "success": true,
        "purchases": rows,
        "summary": {
            "total_investment": totals.total_investment,
            "total_current_value": totals.total_current_value,
            "total_profit_loss": totals.total_profit_loss,
            "total_profit_loss_percentage": totals.total_profit_loss_percentage,
            "is_profit": totals.is_profit,
            "current_price": current_price,
            "exchange_rate": exchange_rate,
            "last_updated": snapshot.last_updated,
            "cached": !query.refresh && snapshot.fetched_at.is_some(),
        },
    })))
}

fn coerce_number(value: Option<&Value>, field: &str) -> Result<f64, ApiError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::BadRequest(format!("Invalid number for field: {field}")))
}

pub async fn add_purchase(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let purchase_date = body
        .get("purchase_date")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    NaiveDate::parse_from_str(&purchase_date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid purchase_date: {purchase_date}")))?;

    let purchase_price = coerce_number(body.get("purchase_price"), "purchase_price")?;
    let grams = coerce_number(body.get("grams"), "grams")?;
    let description = body
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let purchase = state
        .store
        .add(NewPurchase {
            purchase_date,
            purchase_price,
            grams,
            description,
        })
        .map_err(ApiError::from)?;

    info!(
        id = %purchase.id,
        grams = purchase.grams,
        price = purchase.purchase_price,
        "Added new purchase"
    );

    Ok(Json(json!({ "success": true, "purchase": purchase })))
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.store.delete(&id).map_err(ApiError::from)?;

    if deleted {
        info!(%id, "Deleted purchase");
        Ok(Json(json!({ "success": true })))
    } else {
        warn!(%id, "Purchase not found for deletion");
        Err(ApiError::NotFound(format!(
            "Purchase not found with ID: {id}"
        )))
    }
}
