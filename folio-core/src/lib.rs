//! folio-core: ledger data model, error taxonomy and UTC calendar helpers

pub mod error;
pub mod statement;
pub mod time;
pub mod transaction;

pub use error::{FolioError, StoreError};
pub use statement::{BankStatement, StatementId};
pub use time::{DateRange, MonthKey, end_of_day, start_of_day};
pub use transaction::{
    NewTransaction, OwnerId, Transaction, TransactionType, TransactionUpdate,
    TransactionWithBalance,
};

/// Seed balance used when no earlier balance is known.
pub const DEFAULT_INITIAL_BALANCE: rust_decimal::Decimal = rust_decimal::Decimal::ONE_THOUSAND;
