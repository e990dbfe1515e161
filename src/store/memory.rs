use super::{NewPurchase, Purchase, PurchaseStore};
use anyhow::Result;
use std::sync::RwLock;

/// In-memory purchase store, used in tests and ephemeral setups.
#[derive(Default)]
pub struct MemoryStore {
    purchases: RwLock<Vec<Purchase>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PurchaseStore for MemoryStore {
    fn list_all(&self) -> Vec<Purchase> {
        self.purchases.read().unwrap().clone()
    }

    fn add(&self, fields: NewPurchase) -> Result<Purchase> {
        let purchase = fields.into_purchase();
        self.purchases.write().unwrap().push(purchase.clone());
        Ok(purchase)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut purchases = self.purchases.write().unwrap();
        let initial_count = purchases.len();
        purchases.retain(|p| p.id != id);
        Ok(purchases.len() < initial_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPurchase {
        NewPurchase {
            purchase_date: "2024-01-15".to_string(),
            purchase_price: 250.0,
            grams: 10.0,
            description: String::new(),
        }
    }

    #[test]
    fn test_add_list_delete_round_trip() {
        let store = MemoryStore::new();
        assert!(store.list_all().is_empty());

        let stored = store.add(sample()).unwrap();
        assert!(!stored.id.is_empty());

        let all = store.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], stored);

        assert!(store.delete(&stored.id).unwrap());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_delete_unknown_id_returns_false() {
        let store = MemoryStore::new();
        store.add(sample()).unwrap();

        assert!(!store.delete("no-such-id").unwrap());
        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn test_generated_ids_are_unique_and_order_is_preserved() {
        let store = MemoryStore::new();
        let first = store.add(sample()).unwrap();
        let second = store.add(sample()).unwrap();

        assert_ne!(first.id, second.id);
        let all = store.list_all();
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }
}
