//! folio-ledger: running balances, monthly and overall statements, and the
//! owner-scoped store seam they are read through.

pub mod balance;
pub mod import;
pub mod service;
pub mod statements;
pub mod store;

pub use balance::{BalanceTable, decorate, sort_chronologically, window_balances};
pub use import::{load_transactions_csv, read_transactions_csv};
pub use service::StatementService;
pub use statements::Ledger;
pub use store::{MemoryStore, TransactionStore};
