//! Owner-scoped operations over a [`TransactionStore`].

use chrono::{DateTime, Utc};
use folio_core::{
    BankStatement, DateRange, FolioError, NewTransaction, OwnerId, StatementId, Transaction,
    TransactionUpdate, TransactionWithBalance,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::balance::window_balances;
use crate::statements::Ledger;
use crate::store::TransactionStore;

pub struct StatementService<S> {
    store: S,
    initial_balance: Decimal,
}

impl<S: TransactionStore> StatementService<S> {
    /// `initial_balance` seeds whole-history folds and any window that has
    /// no earlier statement to start from.
    pub fn new(store: S, initial_balance: Decimal) -> Self {
        Self {
            store,
            initial_balance,
        }
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn record(
        &mut self,
        owner: &OwnerId,
        txn: NewTransaction,
    ) -> Result<Transaction, FolioError> {
        txn.validate()?;
        Ok(self.store.insert(owner, txn)?)
    }

    pub fn amend(
        &mut self,
        owner: &OwnerId,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction, FolioError> {
        update.validate()?;
        Ok(self.store.update(owner, id, update)?)
    }

    pub fn remove(&mut self, owner: &OwnerId, id: i64) -> Result<(), FolioError> {
        Ok(self.store.delete(owner, id)?)
    }

    /// Snapshot of the owner's full history.
    pub fn ledger(&self, owner: &OwnerId) -> Result<Ledger, FolioError> {
        Ok(Ledger::new(self.store.list_all(owner)?, self.initial_balance))
    }

    /// Monthly statements, most recent first, then the overall statement.
    pub fn statements(&self, owner: &OwnerId) -> Result<Vec<BankStatement>, FolioError> {
        Ok(self.ledger(owner)?.statements())
    }

    /// Transactions dated inside `[start, end]` with a running balance that
    /// starts at `baseline` (or the configured initial balance). Earlier
    /// history is not consulted.
    pub fn transactions_in_range(
        &self,
        owner: &OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        baseline: Option<Decimal>,
    ) -> Result<Vec<TransactionWithBalance>, FolioError> {
        let window = DateRange::new(start, end)?;
        let txns = self.store.list_by_date_range(owner, window.start, window.end)?;
        Ok(window_balances(
            &txns,
            &window,
            baseline.unwrap_or(self.initial_balance),
        ))
    }

    /// Transactions behind one statement id.
    ///
    /// `"overall"` returns the whole history. A `YYYY-MM` month is loaded by
    /// its date bounds and seeded with the ending balance of the latest
    /// statement before it, falling back to the initial balance.
    pub fn transactions_for_statement(
        &self,
        owner: &OwnerId,
        statement_id: &str,
    ) -> Result<Vec<TransactionWithBalance>, FolioError> {
        let key = match statement_id.parse::<StatementId>()? {
            StatementId::Overall => return Ok(self.ledger(owner)?.with_running_balance()),
            StatementId::Month(key) => key,
        };

        let bounds = key.bounds();
        let seed = self
            .ledger(owner)?
            .monthly_statements()
            .into_iter()
            .filter(|s| s.date_range.start < bounds.start)
            .max_by_key(|s| s.date_range.start)
            .map(|s| s.ending_balance)
            .unwrap_or(self.initial_balance);
        debug!(month = %key, %seed, "seeding statement window");

        let txns = self.store.list_by_date_range(owner, bounds.start, bounds.end)?;
        Ok(window_balances(&txns, &bounds, seed))
    }
}
