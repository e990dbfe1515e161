//! HTTP route layer. Thin request/response mapping over the price cache,
//! valuation engine, and purchase store.

pub mod error;
mod health;
mod prices;
mod purchases;
mod transfer;

use crate::prices::PriceCache;
use crate::providers::GoldPriceProvider;
use crate::store::PurchaseStore;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PurchaseStore>,
    pub prices: Arc<PriceCache>,
    pub gold: Arc<dyn GoldPriceProvider>,
    pub currency: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/current-price", get(prices::current_price))
        .route("/api/historical-price", get(prices::historical_price))
        .route(
            "/api/purchases",
            get(purchases::list_purchases).post(purchases::add_purchase),
        )
        .route("/api/purchases/:id", delete(purchases::delete_purchase))
        .route("/api/export", get(transfer::export_purchases))
        .route("/api/import", post(transfer::import_purchases))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
