use super::{NewPurchase, Purchase, PurchaseStore};
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, warn};

const COLLECTION_KEY: &str = "purchases";

/// Purchase store backed by a fjall keyspace. The whole collection is kept
/// as one JSON value so insertion order survives and each write replaces the
/// full set.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open purchase storage at {}", path.display()))?;
        let partition = keyspace
            .open_partition("purchases", PartitionCreateOptions::default())
            .context("Failed to open purchases partition")?;
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn load(&self) -> Vec<Purchase> {
        match self.partition.get(COLLECTION_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(error = %e, "Purchase data corrupt, treating as empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Purchase storage unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, purchases: &[Purchase]) -> Result<()> {
        let bytes = serde_json::to_vec(purchases).context("Failed to serialize purchases")?;
        self.partition
            .insert(COLLECTION_KEY, bytes)
            .context("Failed to write purchases")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist purchases")?;
        debug!(count = purchases.len(), "Persisted purchase collection");
        Ok(())
    }
}

impl PurchaseStore for DiskStore {
    fn list_all(&self) -> Vec<Purchase> {
        self.load()
    }

    fn add(&self, fields: NewPurchase) -> Result<Purchase> {
        let purchase = fields.into_purchase();
        let mut purchases = self.load();
        purchases.push(purchase.clone());
        self.save(&purchases)?;
        Ok(purchase)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut purchases = self.load();
        let initial_count = purchases.len();
        purchases.retain(|p| p.id != id);

        if purchases.len() < initial_count {
            self.save(&purchases)?;
            return Ok(true);
        }
        Ok(false)
    }
}
