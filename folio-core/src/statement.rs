//! Bank statement types. Statements are derived views, never persisted.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FolioError;
use crate::time::{DateRange, MonthKey};

/// Identifies either one calendar-month statement or the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatementId {
    Overall,
    Month(MonthKey),
}

impl StatementId {
    pub const OVERALL: &'static str = "overall";
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementId::Overall => f.write_str(Self::OVERALL),
            StatementId::Month(key) => key.fmt(f),
        }
    }
}

impl FromStr for StatementId {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::OVERALL {
            return Ok(StatementId::Overall);
        }
        s.parse::<MonthKey>()
            .map(StatementId::Month)
            .map_err(|_| FolioError::MalformedStatementId(s.to_string()))
    }
}

impl TryFrom<String> for StatementId {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatementId> for String {
    fn from(id: StatementId) -> Self {
        id.to_string()
    }
}

/// Aggregated view over a period of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankStatement {
    pub id: StatementId,
    pub date_range: DateRange,
    /// Includes uncertain transactions.
    pub transaction_count: usize,
    /// Balance immediately before the first transaction of the period.
    pub starting_balance: Decimal,
    /// Balance immediately after the last transaction of the period.
    pub ending_balance: Decimal,
    pub total_expenditures: Decimal,
    pub total_deposits: Decimal,
}

impl BankStatement {
    pub fn net_change(&self) -> Decimal {
        self.ending_balance - self.starting_balance
    }
}
