//! Error taxonomy shared by the ingest and ledger crates.
//!
//! Empty inputs are never errors: an empty ledger yields no statements and an
//! empty page yields an empty `ParsedPage`. Only malformed caller input and
//! failures reported by the data-access collaborator surface here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Failures reported by a `TransactionStore` implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// No row with the given id exists for the owner.
    #[error("transaction {0} could not be found")]
    NotFound(i64),

    /// The backend refused the read or write (constraint, permission, ...).
    #[error("the store rejected the request: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("the store is unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced to callers of the folio libraries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FolioError {
    /// A statement id that is neither `"overall"` nor a `YYYY-MM` month key.
    #[error("malformed statement id {0:?}: expected \"overall\" or YYYY-MM")]
    MalformedStatementId(String),

    /// A month key that is not `YYYY-MM` with a month in 1..=12.
    #[error("malformed month key {0:?}: expected YYYY-MM")]
    MalformedMonthKey(String),

    /// A transaction type other than expenditure, deposit or uncertain.
    #[error("unknown transaction type {0:?}")]
    UnknownTransactionType(String),

    /// Transaction amounts are magnitudes; the type carries the direction.
    #[error("transaction amounts must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A window whose start lies after its end.
    #[error("date range start {start} is after end {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The data-access collaborator failed; passed through untouched.
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl FolioError {
    /// True for errors caused by the caller's input rather than the store.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, FolioError::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_is_transparent() {
        let err: FolioError = StoreError::Unavailable("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "the store is unavailable: connection reset");
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_malformed_statement_id_message() {
        let err = FolioError::MalformedStatementId("2024-13".to_string());
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("\"2024-13\""));
    }
}
