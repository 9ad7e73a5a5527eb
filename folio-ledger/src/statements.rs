//! Statement generation: calendar-month statements plus one overall
//! statement, all derived from a single whole-history balance fold.

use folio_core::{
    BankStatement, DateRange, MonthKey, StatementId, Transaction, TransactionWithBalance,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::balance::{BalanceTable, decorate, sort_chronologically};

/// A full transaction history with its running balances computed once.
///
/// Not incrementally updatable: rebuild after any insert, update or delete.
#[derive(Debug, Clone)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    balances: BalanceTable,
    initial_balance: Decimal,
}

impl Ledger {
    pub fn new(mut transactions: Vec<Transaction>, initial_balance: Decimal) -> Self {
        sort_chronologically(&mut transactions);
        let balances = BalanceTable::fold(&transactions, initial_balance);
        debug!(transactions = transactions.len(), %initial_balance, "built ledger");
        Self {
            transactions,
            balances,
            initial_balance,
        }
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    /// Transactions in ledger order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn balances(&self) -> &BalanceTable {
        &self.balances
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Balance after the last transaction, or the seed for an empty ledger.
    pub fn closing_balance(&self) -> Decimal {
        self.transactions
            .last()
            .and_then(|t| self.balances.after(t.id))
            .unwrap_or(self.initial_balance)
    }

    /// One statement per UTC month that has transactions, most recent first.
    pub fn monthly_statements(&self) -> Vec<BankStatement> {
        let mut statements: Vec<BankStatement> = self
            .transactions
            .chunk_by(|a, b| MonthKey::of(a.transaction_date) == MonthKey::of(b.transaction_date))
            .filter_map(|group| {
                let key = MonthKey::of(group.first()?.transaction_date);
                summarize(StatementId::Month(key), group, &self.balances)
            })
            .collect();
        statements.sort_by(|a, b| b.date_range.start.cmp(&a.date_range.start));
        debug!(months = statements.len(), "generated monthly statements");
        statements
    }

    /// Statement spanning the whole history; `None` for an empty ledger.
    pub fn overall_statement(&self) -> Option<BankStatement> {
        summarize(StatementId::Overall, &self.transactions, &self.balances)
    }

    /// Monthly statements (most recent first) followed by the overall one.
    pub fn statements(&self) -> Vec<BankStatement> {
        let mut statements = self.monthly_statements();
        statements.extend(self.overall_statement());
        statements
    }

    pub fn statement(&self, id: StatementId) -> Option<BankStatement> {
        match id {
            StatementId::Overall => self.overall_statement(),
            StatementId::Month(key) => summarize(id, self.month_slice(key), &self.balances),
        }
    }

    /// Transactions of one statement in chronological order, decorated with
    /// their whole-history running balance.
    pub fn transactions_for(&self, id: StatementId) -> Vec<TransactionWithBalance> {
        match id {
            StatementId::Overall => decorate(&self.transactions, &self.balances),
            StatementId::Month(key) => decorate(self.month_slice(key), &self.balances),
        }
    }

    pub fn with_running_balance(&self) -> Vec<TransactionWithBalance> {
        self.transactions_for(StatementId::Overall)
    }

    fn month_slice(&self, key: MonthKey) -> &[Transaction] {
        let bounds = key.bounds();
        let start = self
            .transactions
            .partition_point(|t| t.transaction_date < bounds.start);
        let end = self
            .transactions
            .partition_point(|t| t.transaction_date <= bounds.end);
        &self.transactions[start..end]
    }
}

/// Build a statement over `group`, which must be in ledger order.
fn summarize(
    id: StatementId,
    group: &[Transaction],
    balances: &BalanceTable,
) -> Option<BankStatement> {
    let first = group.first()?;
    let last = group.last()?;

    let total_of = |pick: fn(&Transaction) -> bool| -> Decimal {
        group.iter().filter(|t| pick(t)).map(|t| t.amount).sum()
    };

    Some(BankStatement {
        id,
        date_range: DateRange::covering_days(first.transaction_date, last.transaction_date),
        transaction_count: group.len(),
        starting_balance: balances.before(first)?,
        ending_balance: balances.after(last.id)?,
        total_expenditures: total_of(Transaction::is_expenditure),
        total_deposits: total_of(Transaction::is_deposit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_core::{NewTransaction, TransactionType};

    fn txn(id: i64, (y, m, d): (i32, u32, u32), kind: TransactionType, amount: i64) -> Transaction {
        let date = Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap();
        NewTransaction::new(date, Decimal::new(amount, 0), format!("txn {id}"), kind)
            .into_transaction(id, date)
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_january_scenario() {
        let ledger = Ledger::new(
            vec![
                txn(2, (2024, 1, 10), TransactionType::Expenditure, 50),
                txn(1, (2024, 1, 5), TransactionType::Deposit, 200),
            ],
            dec(1000),
        );
        let balances: Vec<_> = ledger
            .with_running_balance()
            .iter()
            .map(|t| t.running_balance)
            .collect();
        assert_eq!(balances, vec![dec(1200), dec(1150)]);

        let jan = ledger.statement("2024-01".parse().unwrap()).unwrap();
        assert_eq!(jan.starting_balance, dec(1000));
        assert_eq!(jan.ending_balance, dec(1150));
        assert_eq!(jan.total_deposits, dec(200));
        assert_eq!(jan.total_expenditures, dec(50));
        assert_eq!(jan.transaction_count, 2);
        assert_eq!(jan.date_range.start, Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
        assert_eq!(
            jan.date_range.end.date_naive(),
            jan.date_range.start.date_naive() + chrono::Days::new(5)
        );
    }

    #[test]
    fn test_empty_ledger_has_no_statements() {
        let ledger = Ledger::new(vec![], dec(1000));
        assert!(ledger.statements().is_empty());
        assert!(ledger.overall_statement().is_none());
        assert_eq!(ledger.closing_balance(), dec(1000));
    }

    #[test]
    fn test_months_listed_most_recent_first_then_overall() {
        let ledger = Ledger::new(
            vec![
                txn(1, (2023, 12, 30), TransactionType::Deposit, 100),
                txn(2, (2024, 2, 1), TransactionType::Expenditure, 20),
                txn(3, (2024, 1, 15), TransactionType::Expenditure, 10),
            ],
            dec(1000),
        );
        let ids: Vec<String> = ledger.statements().iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["2024-02", "2024-01", "2023-12", "overall"]);

        let overall = ledger.overall_statement().unwrap();
        assert_eq!(overall.starting_balance, dec(1000));
        assert_eq!(overall.ending_balance, dec(1070));
        assert_eq!(overall.transaction_count, 3);
    }

    #[test]
    fn test_month_starts_where_previous_ended() {
        let ledger = Ledger::new(
            vec![
                txn(1, (2024, 1, 5), TransactionType::Deposit, 200),
                txn(2, (2024, 2, 3), TransactionType::Expenditure, 75),
            ],
            dec(1000),
        );
        let feb = ledger.statement("2024-02".parse().unwrap()).unwrap();
        let jan = ledger.statement("2024-01".parse().unwrap()).unwrap();
        assert_eq!(feb.starting_balance, jan.ending_balance);
        assert_eq!(feb.ending_balance, dec(1125));
    }

    #[test]
    fn test_uncertain_counts_but_does_not_move_balance() {
        let ledger = Ledger::new(
            vec![
                txn(1, (2024, 1, 5), TransactionType::Deposit, 200),
                txn(2, (2024, 2, 1), TransactionType::Uncertain, 40),
                txn(3, (2024, 2, 9), TransactionType::Expenditure, 10),
            ],
            dec(1000),
        );
        let feb = ledger.statement("2024-02".parse().unwrap()).unwrap();
        assert_eq!(feb.transaction_count, 2);
        assert_eq!(feb.starting_balance, dec(1200));
        assert_eq!(feb.ending_balance, dec(1190));
        assert_eq!(feb.total_deposits, Decimal::ZERO);
        assert_eq!(feb.total_expenditures, dec(10));
    }

    #[test]
    fn test_transactions_for_month_use_history_balances() {
        let ledger = Ledger::new(
            vec![
                txn(1, (2024, 1, 5), TransactionType::Deposit, 200),
                txn(2, (2024, 2, 3), TransactionType::Expenditure, 75),
                txn(3, (2024, 2, 29), TransactionType::Deposit, 5),
            ],
            dec(1000),
        );
        let feb = ledger.transactions_for("2024-02".parse().unwrap());
        let got: Vec<(i64, Decimal)> = feb
            .iter()
            .map(|t| (t.transaction.id, t.running_balance))
            .collect();
        assert_eq!(got, vec![(2, dec(1125)), (3, dec(1130))]);
        assert!(ledger.transactions_for("2024-03".parse().unwrap()).is_empty());
        assert!(ledger.statement("2024-03".parse().unwrap()).is_none());
    }
}
