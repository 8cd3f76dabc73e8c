//! In-memory storage implementation for testing and embedding

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// In-memory transaction store keyed by id, indexed by source batch and shift
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    transactions: HashMap<Uuid, Transaction>,
    by_batch: HashMap<String, HashSet<Uuid>>,
    by_shift: HashMap<Uuid, HashSet<Uuid>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&mut self) {
        self.transactions.clear();
        self.by_batch.clear();
        self.by_shift.clear();
    }

    fn index(&mut self, transaction: &Transaction) {
        self.by_batch
            .entry(transaction.source_batch.clone())
            .or_default()
            .insert(transaction.id);
        if let Some(shift_id) = transaction.shift_id {
            self.by_shift
                .entry(shift_id)
                .or_default()
                .insert(transaction.id);
        }
    }

    fn unindex(&mut self, transaction: &Transaction) {
        if let Some(ids) = self.by_batch.get_mut(&transaction.source_batch) {
            ids.remove(&transaction.id);
            if ids.is_empty() {
                self.by_batch.remove(&transaction.source_batch);
            }
        }
        if let Some(shift_id) = transaction.shift_id {
            if let Some(ids) = self.by_shift.get_mut(&shift_id) {
                ids.remove(&transaction.id);
                if ids.is_empty() {
                    self.by_shift.remove(&shift_id);
                }
            }
        }
    }

    fn upsert(&mut self, transaction: Transaction) {
        if let Some(previous) = self.transactions.remove(&transaction.id) {
            self.unindex(&previous);
        }
        self.index(&transaction);
        self.transactions.insert(transaction.id, transaction);
    }

    fn remove(&mut self, id: &Uuid) -> Option<Transaction> {
        let removed = self.transactions.remove(id)?;
        self.unindex(&removed);
        Some(removed)
    }

    fn collect_sorted<'a, I>(&self, ids: I) -> Vec<Transaction>
    where
        I: IntoIterator<Item = &'a Uuid>,
    {
        let mut found: Vec<Transaction> = ids
            .into_iter()
            .filter_map(|id| self.transactions.get(id))
            .cloned()
            .collect();
        sort_by_date(&mut found);
        found
    }
}

fn sort_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then(a.id.cmp(&b.id))
    });
}

#[async_trait]
impl TransactionStorage for MemoryStorage {
    async fn save(&mut self, transaction: &Transaction) -> StoreResult<()> {
        self.upsert(transaction.clone());
        Ok(())
    }

    async fn save_batch(&mut self, transactions: &[Transaction]) -> StoreResult<()> {
        for transaction in transactions {
            self.upsert(transaction.clone());
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        Ok(self.transactions.get(&id).cloned())
    }

    async fn all(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.collect_sorted(self.transactions.keys()))
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.transactions.len())
    }

    async fn assign(&mut self, ids: &[Uuid], shift_id: Uuid) -> StoreResult<usize> {
        let mut assigned = 0;
        for id in ids {
            let Some(mut transaction) = self.transactions.get(id).cloned() else {
                debug!(%id, "skipping assignment of unknown transaction");
                continue;
            };
            transaction.shift_id = Some(shift_id);
            self.upsert(transaction);
            assigned += 1;
        }
        Ok(assigned)
    }

    async fn orphans(&self, range: Option<DateRange>) -> StoreResult<Vec<Transaction>> {
        let mut orphans: Vec<Transaction> = self
            .transactions
            .values()
            .filter(|t| t.is_orphan())
            .filter(|t| range.is_none_or(|r| r.contains(t.transaction_date)))
            .cloned()
            .collect();
        sort_by_date(&mut orphans);
        Ok(orphans)
    }

    async fn replace_source_batch(
        &mut self,
        batch_tag: &str,
        transactions: Vec<Transaction>,
    ) -> StoreResult<Vec<Transaction>> {
        let stale: Vec<Uuid> = self
            .by_batch
            .get(batch_tag)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        for id in &stale {
            self.remove(id);
        }

        let mut stored = Vec::with_capacity(transactions.len());
        for mut transaction in transactions {
            if self.transactions.contains_key(&transaction.id) {
                let fresh = Uuid::new_v4();
                warn!(
                    old = %transaction.id,
                    new = %fresh,
                    batch = batch_tag,
                    "transaction id already stored, re-keying"
                );
                transaction.id = fresh;
            }
            transaction.source_batch = batch_tag.to_string();
            transaction.shift_id = None;
            stored.push(transaction.clone());
            self.upsert(transaction);
        }

        debug!(
            batch = batch_tag,
            removed = stale.len(),
            inserted = stored.len(),
            "source batch replaced"
        );
        sort_by_date(&mut stored);
        Ok(stored)
    }

    async fn delete_where(
        &mut self,
        predicate: &(dyn for<'t> Fn(&'t Transaction) -> bool + Send + Sync),
    ) -> StoreResult<usize> {
        let doomed: Vec<Uuid> = self
            .transactions
            .values()
            .filter(|&t| predicate(t))
            .map(|t| t.id)
            .collect();
        for id in &doomed {
            self.remove(id);
        }
        Ok(doomed.len())
    }

    async fn delete_ids(&mut self, ids: &[Uuid]) -> StoreResult<usize> {
        Ok(ids.iter().filter_map(|id| self.remove(id)).count())
    }

    async fn statement_periods(&self) -> StoreResult<Vec<String>> {
        let periods: BTreeSet<&String> = self.by_batch.keys().collect();
        Ok(periods.into_iter().cloned().collect())
    }

    async fn affected_shift_ids(&self, batch_tag: &str) -> StoreResult<Vec<Uuid>> {
        let shifts: BTreeSet<Uuid> = self
            .by_batch
            .get(batch_tag)
            .into_iter()
            .flatten()
            .filter_map(|id| self.transactions.get(id))
            .filter_map(|t| t.shift_id)
            .collect();
        Ok(shifts.into_iter().collect())
    }

    async fn transactions_in_batch(&self, batch_tag: &str) -> StoreResult<Vec<Transaction>> {
        Ok(self.collect_sorted(self.by_batch.get(batch_tag).into_iter().flatten()))
    }

    async fn transactions_for_shift(&self, shift_id: Uuid) -> StoreResult<Vec<Transaction>> {
        Ok(self.collect_sorted(self.by_shift.get(&shift_id).into_iter().flatten()))
    }
}

/// In-memory flag store for tests and shells without persistent settings
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: HashSet<String>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MigrationFlagStore for MemoryFlagStore {
    fn is_set(&self, key: &str) -> bool {
        self.flags.contains(key)
    }

    fn set(&mut self, key: &str) {
        self.flags.insert(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn txn(batch: &str, day: u32) -> Transaction {
        Transaction::new(
            at(day, 12),
            "UberX".to_string(),
            BigDecimal::from(10),
            batch.to_string(),
        )
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let mut storage = MemoryStorage::new();
        let mut transaction = txn("a", 13);
        storage.save(&transaction).await.unwrap();

        transaction.amount = BigDecimal::from(12);
        storage.save(&transaction).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
        let stored = storage.get(transaction.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, BigDecimal::from(12));
    }

    #[tokio::test]
    async fn test_save_batch_moves_batch_index() {
        let mut storage = MemoryStorage::new();
        let mut transaction = txn("a", 13);
        storage.save_batch(&[transaction.clone()]).await.unwrap();

        transaction.source_batch = "b".to_string();
        storage.save_batch(&[transaction.clone()]).await.unwrap();

        assert_eq!(storage.statement_periods().await.unwrap(), vec!["b".to_string()]);
        assert!(storage.transactions_in_batch("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assign_skips_unknown_ids() {
        let mut storage = MemoryStorage::new();
        let transaction = txn("a", 13);
        storage.save(&transaction).await.unwrap();
        let shift_id = Uuid::new_v4();

        let assigned = storage
            .assign(&[transaction.id, Uuid::new_v4()], shift_id)
            .await
            .unwrap();

        assert_eq!(assigned, 1);
        assert_eq!(storage.transactions_for_shift(shift_id).await.unwrap().len(), 1);
        assert!(storage.orphans(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reassign_updates_shift_index() {
        let mut storage = MemoryStorage::new();
        let transaction = txn("a", 13);
        storage.save(&transaction).await.unwrap();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        storage.assign(&[transaction.id], first).await.unwrap();
        storage.assign(&[transaction.id], second).await.unwrap();

        assert!(storage.transactions_for_shift(first).await.unwrap().is_empty());
        assert_eq!(storage.transactions_for_shift(second).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_orphans_range_is_half_open() {
        let mut storage = MemoryStorage::new();
        storage
            .save_batch(&[txn("a", 13), txn("a", 14), txn("a", 15)])
            .await
            .unwrap();

        let orphans = storage
            .orphans(Some(DateRange::new(at(13, 12), at(15, 12))))
            .await
            .unwrap();

        assert_eq!(orphans.len(), 2);
        assert!(orphans[0].transaction_date < orphans[1].transaction_date);
    }

    #[tokio::test]
    async fn test_replace_source_batch_leaves_other_batches_alone() {
        let mut storage = MemoryStorage::new();
        let shift_a = Uuid::new_v4();
        let shift_mixed = Uuid::new_v4();

        let old_a = txn("a", 13);
        let mixed_a = txn("a", 14);
        let mixed_b = txn("b", 14);
        let other_b = txn("b", 20);
        storage
            .save_batch(&[old_a.clone(), mixed_a.clone(), mixed_b.clone(), other_b.clone()])
            .await
            .unwrap();
        storage.assign(&[old_a.id], shift_a).await.unwrap();
        storage
            .assign(&[mixed_a.id, mixed_b.id], shift_mixed)
            .await
            .unwrap();
        let before_b = storage.transactions_in_batch("b").await.unwrap();

        assert_eq!(
            storage.affected_shift_ids("a").await.unwrap().len(),
            2
        );

        let stored = storage
            .replace_source_batch("a", vec![txn("ignored", 13), txn("ignored", 16)])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|t| t.source_batch == "a" && t.is_orphan()));
        assert_eq!(storage.transactions_in_batch("b").await.unwrap(), before_b);
        assert!(storage.transactions_for_shift(shift_a).await.unwrap().is_empty());
        let mixed = storage.transactions_for_shift(shift_mixed).await.unwrap();
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].id, mixed_b.id);
        assert!(storage.affected_shift_ids("a").await.unwrap().is_empty());
        assert_eq!(storage.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_replace_rekeys_ids_owned_by_other_batches() {
        let mut storage = MemoryStorage::new();
        let existing = txn("b", 14);
        storage.save(&existing).await.unwrap();

        let stored = storage
            .replace_source_batch("a", vec![existing.clone()])
            .await
            .unwrap();

        assert_ne!(stored[0].id, existing.id);
        assert_eq!(
            storage.get(existing.id).await.unwrap().unwrap().source_batch,
            "b"
        );
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_replace_with_same_batch_twice_is_idempotent() {
        let mut storage = MemoryStorage::new();
        let batch = vec![txn("a", 13), txn("a", 14)];

        storage.replace_source_batch("a", batch.clone()).await.unwrap();
        storage.replace_source_batch("a", batch).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_predicate_and_ids() {
        let mut storage = MemoryStorage::new();
        let keep = txn("a", 13);
        let drop = txn("a", 14);
        let other = txn("b", 15);
        storage
            .save_batch(&[keep.clone(), drop.clone(), other.clone()])
            .await
            .unwrap();

        let removed = storage
            .delete_where(&|t: &Transaction| t.source_batch == "b")
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let removed = storage
            .delete_ids(&[drop.id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(removed, 1);

        assert_eq!(storage.all().await.unwrap(), vec![keep]);
        assert_eq!(storage.statement_periods().await.unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_store_operations_are_noops() {
        let mut storage = MemoryStorage::new();

        assert_eq!(storage.assign(&[Uuid::new_v4()], Uuid::new_v4()).await.unwrap(), 0);
        assert_eq!(storage.delete_ids(&[]).await.unwrap(), 0);
        assert!(storage.replace_source_batch("a", Vec::new()).await.unwrap().is_empty());
        assert!(storage.statement_periods().await.unwrap().is_empty());
        assert!(storage.affected_shift_ids("a").await.unwrap().is_empty());
    }

    #[test]
    fn test_flag_store() {
        let mut flags = MemoryFlagStore::new();
        assert!(!flags.is_set("k"));
        flags.set("k");
        assert!(flags.is_set("k"));
    }
}
