//! Load transaction rows from CSV.
//!
//! Header:
//! id,transaction_date,amount,description,location,transaction_type,category,created_at
//!
//! `location`, `category` and `created_at` may be empty or missing; an empty
//! `created_at` falls back to the transaction date. Dates are RFC 3339,
//! `YYYY-MM-DD HH:MM:SS` (UTC) or a bare `YYYY-MM-DD` (midnight UTC).

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use folio_core::{FolioError, Transaction, TransactionType};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub fn load_transactions_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    read_transactions_csv(file).with_context(|| format!("reading {}", path.as_ref().display()))
}

/// Parse every data row. Unlike a bank export these rows are authoritative,
/// so a bad row fails the whole load instead of being skipped. Ids must be
/// unique: balances are keyed by id.
pub fn read_transactions_csv<R: io::Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut txns = Vec::new();
    let mut first_seen: HashMap<i64, usize> = HashMap::new();
    for (i, result) in rdr.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let txn = columns
            .parse(&record)
            .with_context(|| format!("line {line}"))?;
        if let Some(earlier) = first_seen.insert(txn.id, line) {
            bail!(
                "line {line}: duplicate transaction id {} (first used on line {earlier})",
                txn.id
            );
        }
        txns.push(txn);
    }
    debug!(rows = txns.len(), "loaded transactions from csv");
    Ok(txns)
}

struct Columns {
    id: usize,
    transaction_date: usize,
    amount: usize,
    description: usize,
    transaction_type: usize,
    location: Option<usize>,
    category: Option<usize>,
    created_at: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let required =
            |name: &str| find(name).ok_or_else(|| anyhow!("missing required column {name:?}"));
        Ok(Self {
            id: required("id")?,
            transaction_date: required("transaction_date")?,
            amount: required("amount")?,
            description: required("description")?,
            transaction_type: required("transaction_type")?,
            location: find("location"),
            category: find("category"),
            created_at: find("created_at"),
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Transaction> {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let optional = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let id: i64 = field(self.id)
            .parse()
            .with_context(|| format!("invalid id {:?}", field(self.id)))?;
        let transaction_date = parse_timestamp(field(self.transaction_date))?;
        let amount = Decimal::from_str(field(self.amount))
            .with_context(|| format!("invalid amount {:?}", field(self.amount)))?;
        if amount <= Decimal::ZERO {
            return Err(FolioError::NonPositiveAmount(amount).into());
        }
        let transaction_type: TransactionType = field(self.transaction_type).parse()?;
        let created_at = match optional(self.created_at) {
            Some(raw) => parse_timestamp(&raw)?,
            None => transaction_date,
        };

        Ok(Transaction {
            id,
            transaction_date,
            amount,
            description: field(self.description).to_string(),
            location: optional(self.location),
            transaction_type,
            category: optional(self.category),
            created_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid timestamp {raw:?}"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}
