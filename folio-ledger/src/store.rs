//! Data-access seam for owner-scoped transaction rows.

use chrono::{DateTime, Utc};
use folio_core::{NewTransaction, OwnerId, StoreError, Transaction, TransactionUpdate};
use tracing::debug;

use crate::balance::sort_chronologically;

/// Persistence collaborator. Implementations assign ids and creation
/// timestamps; every call is scoped to one owner.
///
/// Listings come back in ledger order (date, then id) and date ranges are
/// inclusive on both ends.
pub trait TransactionStore {
    fn insert(&mut self, owner: &OwnerId, txn: NewTransaction) -> Result<Transaction, StoreError>;

    fn update(
        &mut self,
        owner: &OwnerId,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction, StoreError>;

    fn delete(&mut self, owner: &OwnerId, id: i64) -> Result<(), StoreError>;

    fn list_by_date_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError>;

    fn list_all(&self, owner: &OwnerId) -> Result<Vec<Transaction>, StoreError>;
}

/// In-process store backing the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<(OwnerId, Transaction)>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with rows that already carry ids, e.g. loaded from CSV. Later
    /// inserts continue after the largest id seen. A repeated id is rejected.
    pub fn with_transactions(
        owner: &OwnerId,
        txns: impl IntoIterator<Item = Transaction>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for txn in txns {
            if store.rows.iter().any(|(_, t)| t.id == txn.id) {
                return Err(StoreError::Rejected(format!(
                    "duplicate transaction id {}",
                    txn.id
                )));
            }
            store.next_id = store.next_id.max(txn.id);
            store.rows.push((owner.clone(), txn));
        }
        debug!(owner = %owner, rows = store.rows.len(), "seeded memory store");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn owned<'a>(&'a self, owner: &'a OwnerId) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.rows
            .iter()
            .filter(move |(o, _)| o == owner)
            .map(|(_, t)| t)
    }

    fn collect_sorted<'a>(rows: impl Iterator<Item = &'a Transaction>) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = rows.cloned().collect();
        sort_chronologically(&mut out);
        out
    }
}

impl TransactionStore for MemoryStore {
    fn insert(&mut self, owner: &OwnerId, txn: NewTransaction) -> Result<Transaction, StoreError> {
        self.next_id += 1;
        let row = txn.into_transaction(self.next_id, Utc::now());
        self.rows.push((owner.clone(), row.clone()));
        Ok(row)
    }

    fn update(
        &mut self,
        owner: &OwnerId,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction, StoreError> {
        let (_, row) = self
            .rows
            .iter_mut()
            .find(|(o, t)| o == owner && t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        update.apply(row);
        Ok(row.clone())
    }

    fn delete(&mut self, owner: &OwnerId, id: i64) -> Result<(), StoreError> {
        let before = self.rows.len();
        self.rows.retain(|(o, t)| !(o == owner && t.id == id));
        if self.rows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn list_by_date_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        Ok(Self::collect_sorted(self.owned(owner).filter(|t| {
            start <= t.transaction_date && t.transaction_date <= end
        })))
    }

    fn list_all(&self, owner: &OwnerId) -> Result<Vec<Transaction>, StoreError> {
        Ok(Self::collect_sorted(self.owned(owner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use folio_core::TransactionType;
    use rust_decimal::Decimal;

    fn new_txn(day: u32, amount: i64) -> NewTransaction {
        NewTransaction::new(
            Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap(),
            Decimal::new(amount, 0),
            "coffee",
            TransactionType::Expenditure,
        )
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let owner = OwnerId::from("alice");
        let mut store = MemoryStore::new();
        let a = store.insert(&owner, new_txn(3, 4)).unwrap();
        let b = store.insert(&owner, new_txn(1, 6)).unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let all = store.list_all(&owner).unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_rows_are_owner_scoped() {
        let alice = OwnerId::from("alice");
        let bob = OwnerId::from("bob");
        let mut store = MemoryStore::new();
        let row = store.insert(&alice, new_txn(3, 4)).unwrap();
        assert!(store.list_all(&bob).unwrap().is_empty());
        assert_eq!(store.delete(&bob, row.id), Err(StoreError::NotFound(row.id)));
        assert_eq!(
            store.update(&bob, row.id, &TransactionUpdate::default()),
            Err(StoreError::NotFound(row.id))
        );
        assert!(store.delete(&alice, row.id).is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_range_is_inclusive() {
        let owner = OwnerId::from("alice");
        let mut store = MemoryStore::new();
        let edge = store.insert(&owner, new_txn(10, 1)).unwrap();
        store.insert(&owner, new_txn(11, 1)).unwrap();
        let got = store
            .list_by_date_range(&owner, edge.transaction_date, edge.transaction_date)
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, edge.id);
    }

    #[test]
    fn test_update_applies_partial_fields() {
        let owner = OwnerId::from("alice");
        let mut store = MemoryStore::new();
        let row = store
            .insert(&owner, new_txn(3, 4).with_category("Food"))
            .unwrap();
        let update = TransactionUpdate {
            amount: Some(Decimal::new(9, 0)),
            category: Some(None),
            ..Default::default()
        };
        let updated = store.update(&owner, row.id, &update).unwrap();
        assert_eq!(updated.amount, Decimal::new(9, 0));
        assert_eq!(updated.category, None);
        assert_eq!(updated.description, "coffee");
    }

    #[test]
    fn test_seeded_ids_continue() {
        let owner = OwnerId::from("alice");
        let seeded = new_txn(1, 5).into_transaction(41, Utc::now());
        let mut store = MemoryStore::with_transactions(&owner, vec![seeded]).unwrap();
        let next = store.insert(&owner, new_txn(2, 5)).unwrap();
        assert_eq!(next.id, 42);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_seeding_rejects_repeated_id() {
        let owner = OwnerId::from("alice");
        let rows = vec![
            new_txn(5, 200).into_transaction(1, Utc::now()),
            new_txn(10, 50).into_transaction(1, Utc::now()),
        ];
        let err = MemoryStore::with_transactions(&owner, rows).unwrap_err();
        assert_eq!(err, StoreError::Rejected("duplicate transaction id 1".into()));
    }
}
