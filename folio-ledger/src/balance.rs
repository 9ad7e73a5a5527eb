//! Running balances.
//!
//! Two separate semantics live here and must not be mixed:
//! - [`BalanceTable::fold`] walks the whole history from the seed balance;
//!   statements are built from it.
//! - [`window_balances`] restarts from a caller-supplied baseline and only
//!   looks at transactions inside one window.

use std::collections::HashMap;

use folio_core::{DateRange, Transaction, TransactionWithBalance};
use rust_decimal::Decimal;

/// Ledger order: transaction date, then id so same-instant rows stay stable.
pub fn sort_chronologically(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then(a.id.cmp(&b.id))
    });
}

/// Balance immediately after each transaction, keyed by transaction id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceTable {
    after: HashMap<i64, Decimal>,
}

impl BalanceTable {
    /// Fold `sorted` (already in ledger order) starting from `initial`.
    pub fn fold(sorted: &[Transaction], initial: Decimal) -> Self {
        let (after, _) = sorted.iter().fold(
            (HashMap::with_capacity(sorted.len()), initial),
            |(mut table, balance), txn| {
                let balance = balance + txn.balance_effect();
                table.insert(txn.id, balance);
                (table, balance)
            },
        );
        Self { after }
    }

    pub fn after(&self, id: i64) -> Option<Decimal> {
        self.after.get(&id).copied()
    }

    /// Balance just before `txn` was applied: its own effect reversed out.
    pub fn before(&self, txn: &Transaction) -> Option<Decimal> {
        self.after(txn.id).map(|balance| balance - txn.balance_effect())
    }

    pub fn len(&self) -> usize {
        self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.after.is_empty()
    }
}

/// Pair each of `sorted` with its balance from `table`.
pub fn decorate(sorted: &[Transaction], table: &BalanceTable) -> Vec<TransactionWithBalance> {
    sorted
        .iter()
        .filter_map(|txn| {
            table.after(txn.id).map(|running_balance| TransactionWithBalance {
                transaction: txn.clone(),
                running_balance,
            })
        })
        .collect()
}

/// Running balance over the transactions inside `window` only, starting
/// fresh from `baseline`. Anything outside the window is ignored, even if
/// the caller passed it in.
pub fn window_balances(
    txns: &[Transaction],
    window: &DateRange,
    baseline: Decimal,
) -> Vec<TransactionWithBalance> {
    let mut inside: Vec<Transaction> = txns
        .iter()
        .filter(|t| window.contains(t.transaction_date))
        .cloned()
        .collect();
    sort_chronologically(&mut inside);

    inside
        .into_iter()
        .scan(baseline, |balance, transaction| {
            *balance += transaction.balance_effect();
            Some(TransactionWithBalance {
                running_balance: *balance,
                transaction,
            })
        })
        .collect()
}
