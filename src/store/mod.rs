//! Durable storage for purchase records.

pub mod disk;
pub mod memory;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded gold purchase. Immutable once stored; removed only by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchase {
    pub id: String,
    /// Calendar date of the purchase, ISO 8601 (YYYY-MM-DD).
    pub purchase_date: String,
    /// Price per gram in the local currency at time of purchase.
    pub purchase_price: f64,
    pub grams: f64,
    #[serde(default)]
    pub description: String,
}

/// Purchase fields supplied by a caller; the store assigns the id.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPurchase {
    pub purchase_date: String,
    pub purchase_price: f64,
    pub grams: f64,
    #[serde(default)]
    pub description: String,
}

impl NewPurchase {
    fn into_purchase(self) -> Purchase {
        Purchase {
            id: Uuid::new_v4().to_string(),
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            grams: self.grams,
            description: self.description,
        }
    }
}

/// Owns the durable purchase collection. Callers get copies, never the
/// store's internal state. Every mutating call persists the entire
/// collection; concurrent writers race with last-write-wins.
pub trait PurchaseStore: Send + Sync {
    /// All records in insertion order. Absent or unreadable storage reads as
    /// empty rather than failing.
    fn list_all(&self) -> Vec<Purchase>;

    /// Assigns a fresh id, appends, persists, and returns the stored record.
    fn add(&self, fields: NewPurchase) -> Result<Purchase>;

    /// Removes the record with the given id. Returns whether anything was
    /// deleted.
    fn delete(&self, id: &str) -> Result<bool>;
}
