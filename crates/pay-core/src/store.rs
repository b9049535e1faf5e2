//! # Transaction Store
//!
//! Process-local map of order reference to [`Transaction`].
//! Nothing is persisted; entries live until the process exits.

use crate::transaction::{Transaction, TransactionStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared in-memory transaction store.
///
/// Cloning is cheap and every clone sees the same map. Writes to an existing
/// key overwrite the previous record.
#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    inner: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the record stored under `key`
    pub async fn get(&self, key: &str) -> Option<Transaction> {
        self.inner.read().await.get(key).cloned()
    }

    /// Insert or overwrite the record stored under `key`
    pub async fn set(&self, key: impl Into<String>, transaction: Transaction) {
        let key = key.into();
        info!(
            reference = %key,
            status = %transaction.status,
            amount = %transaction.amount.display(),
            "Database entry updated"
        );
        self.inner.write().await.insert(key, transaction);
    }

    /// Change the status of an existing record.
    ///
    /// Returns the updated record, or `None` if no record exists for `key`.
    pub async fn update_status(
        &self,
        key: &str,
        status: TransactionStatus,
        psp_reference: Option<String>,
    ) -> Option<Transaction> {
        let mut map = self.inner.write().await;
        let tx = map.get_mut(key)?;
        tx.status = status;
        if psp_reference.is_some() {
            tx.psp_reference = psp_reference;
        }
        tx.updated_at = Utc::now();
        info!(reference = %key, status = %status, "Database entry updated");
        Some(tx.clone())
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Amount;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = TransactionStore::new();
        assert!(store.is_empty().await);

        store
            .set("order-1", Transaction::pending("order-1", Amount::new("EUR", 1000)))
            .await;

        let tx = store.get("order-1").await.unwrap();
        assert_eq!(tx.payment_reference, "order-1");
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() {
        let store = TransactionStore::new();
        store
            .set("order-1", Transaction::pending("order-1", Amount::new("EUR", 1000)))
            .await;
        store
            .set("order-1", Transaction::pending("order-1", Amount::new("EUR", 2500)))
            .await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("order-1").await.unwrap().amount.value, 2500);
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = TransactionStore::new();
        store
            .set("order-1", Transaction::pending("order-1", Amount::new("EUR", 1000)))
            .await;

        let updated = store
            .update_status("order-1", TransactionStatus::Authorized, Some("PSP123".into()))
            .await
            .unwrap();
        assert_eq!(updated.status, TransactionStatus::Authorized);
        assert_eq!(updated.psp_reference.as_deref(), Some("PSP123"));

        // A later update without a psp reference keeps the known one
        let updated = store
            .update_status("order-1", TransactionStatus::Refunded, None)
            .await
            .unwrap();
        assert_eq!(updated.psp_reference.as_deref(), Some("PSP123"));
    }

    #[tokio::test]
    async fn test_update_status_missing_key() {
        let store = TransactionStore::new();
        let result = store
            .update_status("nope", TransactionStatus::Authorized, None)
            .await;
        assert!(result.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = TransactionStore::new();
        let other = store.clone();
        other
            .set("order-9", Transaction::pending("order-9", Amount::new("EUR", 500)))
            .await;
        assert!(store.get("order-9").await.is_some());
    }
}
