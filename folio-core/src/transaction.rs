//! Persisted transaction types for the ledger

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Opaque owner scope. Every store read and write is filtered by it; the
/// libraries never interpret its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Direction of a transaction. `Uncertain` rows are tracked but never move
/// the balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expenditure,
    Deposit,
    Uncertain,
}

impl TransactionType {
    /// Signed change applied to the balance by a transaction of `amount`.
    pub fn balance_effect(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Expenditure => -amount,
            TransactionType::Deposit => amount,
            TransactionType::Uncertain => Decimal::ZERO,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expenditure => "expenditure",
            TransactionType::Deposit => "deposit",
            TransactionType::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expenditure" => Ok(TransactionType::Expenditure),
            "deposit" => Ok(TransactionType::Deposit),
            "uncertain" => Ok(TransactionType::Uncertain),
            _ => Err(FolioError::UnknownTransactionType(s.to_string())),
        }
    }
}

/// An authoritative, persisted transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub transaction_date: DateTime<Utc>,
    /// Always positive; `transaction_type` carries the direction.
    pub amount: Decimal,
    pub description: String,
    pub location: Option<String>,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn balance_effect(&self) -> Decimal {
        self.transaction_type.balance_effect(self.amount)
    }

    pub fn is_deposit(&self) -> bool {
        self.transaction_type == TransactionType::Deposit
    }

    pub fn is_expenditure(&self) -> bool {
        self.transaction_type == TransactionType::Expenditure
    }
}

/// Insert shape: everything except the store-assigned id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub transaction_date: DateTime<Utc>,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewTransaction {
    pub fn new(
        transaction_date: DateTime<Utc>,
        amount: Decimal,
        description: impl Into<String>,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            transaction_date,
            amount,
            description: description.into(),
            location: None,
            transaction_type,
            category: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> Result<(), FolioError> {
        ensure_positive(self.amount)
    }

    /// Materialise the row a store would return for this insert.
    pub fn into_transaction(self, id: i64, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            transaction_date: self.transaction_date,
            amount: self.amount,
            description: self.description,
            location: self.location,
            transaction_type: self.transaction_type,
            category: self.category,
            created_at,
        }
    }
}

/// Partial update; `None` leaves a field untouched. `location` and
/// `category` use a nested option so they can be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub transaction_date: Option<DateTime<Utc>>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub location: Option<Option<String>>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<Option<String>>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<(), FolioError> {
        match self.amount {
            Some(amount) => ensure_positive(amount),
            None => Ok(()),
        }
    }

    pub fn apply(&self, txn: &mut Transaction) {
        if let Some(date) = self.transaction_date {
            txn.transaction_date = date;
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(description) = &self.description {
            txn.description = description.clone();
        }
        if let Some(location) = &self.location {
            txn.location = location.clone();
        }
        if let Some(kind) = self.transaction_type {
            txn.transaction_type = kind;
        }
        if let Some(category) = &self.category {
            txn.category = category.clone();
        }
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), FolioError> {
    if amount <= Decimal::ZERO {
        return Err(FolioError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// A transaction decorated with the balance right after it was applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithBalance {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub running_balance: Decimal,
}
