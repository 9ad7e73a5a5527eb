use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use folio_core::{BankStatement, OwnerId, TransactionWithBalance};
use folio_ingest::{
    FieldExtractor, PageRuns, PageText, TextStats, parse_document, render_document_text,
};
use folio_ledger::{MemoryStore, StatementService, load_transactions_csv};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Statement text extraction and ledger statements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild page text from positioned runs and extract transaction fields
    Extract {
        /// JSON array of pages: [{ "pageNumber": 1, "runs": [{ "text", "x", "y" }] }]
        #[arg(long)]
        runs: PathBuf,

        /// Print the parsed document as JSON instead of page-marker text
        #[arg(long)]
        json: bool,
    },

    /// Word, line and character counts for a text file
    Stats {
        #[arg(long)]
        text: PathBuf,
    },

    /// Monthly statements (most recent first) and the overall statement
    Statements {
        /// Transaction rows (id,transaction_date,amount,description,...)
        #[arg(long)]
        csv: PathBuf,

        /// Overrides [ledger] initial_balance from config.toml
        #[arg(long)]
        initial_balance: Option<Decimal>,

        #[arg(long)]
        json: bool,
    },

    /// Transactions of one statement with running balances
    Transactions {
        #[arg(long)]
        csv: PathBuf,

        /// "overall" or YYYY-MM
        #[arg(long)]
        statement: String,

        #[arg(long)]
        initial_balance: Option<Decimal>,

        #[arg(long)]
        json: bool,
    },

    /// Write ~/.folio/config.toml with default values
    InitConfig,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => config::init_config()?,

        Command::Extract { runs, json } => {
            let cfg = config::load_config()?;
            let raw = read_file(&runs)?;
            let pages: Vec<PageRuns> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", runs.display()))?;
            let extractor = FieldExtractor::new()?;
            let doc = parse_document(&pages, &cfg.layout, &extractor);
            info!(
                pages = doc.summary.total_pages,
                lines = doc.summary.total_transactions,
                "extracted"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                let texts: Vec<PageText> = doc
                    .pages
                    .iter()
                    .map(|p| PageText::Extracted {
                        page_number: p.page_number,
                        text: p.text.clone(),
                    })
                    .collect();
                println!("{}", render_document_text(&texts));
            }
        }

        Command::Stats { text } => {
            let stats = TextStats::of(&read_file(&text)?);
            println!("words: {}", stats.words);
            println!("lines: {}", stats.lines);
            println!("characters: {}", stats.characters);
            println!("characters (no spaces): {}", stats.characters_no_spaces);
        }

        Command::Statements {
            csv,
            initial_balance,
            json,
        } => {
            let (svc, owner) = open_ledger(&csv, initial_balance)?;
            let statements = svc.statements(&owner)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else if statements.is_empty() {
                println!("No transactions in {}", csv.display());
            } else {
                for s in &statements {
                    print_statement(s);
                }
            }
        }

        Command::Transactions {
            csv,
            statement,
            initial_balance,
            json,
        } => {
            let (svc, owner) = open_ledger(&csv, initial_balance)?;
            let rows = svc.transactions_for_statement(&owner, &statement)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    print_row(row);
                }
                println!("\n{} transactions in {}", rows.len(), statement);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,folio_ingest=warn,folio_ledger=warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn open_ledger(
    csv: &Path,
    initial_balance: Option<Decimal>,
) -> Result<(StatementService<MemoryStore>, OwnerId)> {
    let cfg = config::load_config()?;
    let owner = cfg.ledger.owner_id();
    let txns = load_transactions_csv(csv)?;
    info!(rows = txns.len(), owner = %owner, "loaded ledger");
    let store = MemoryStore::with_transactions(&owner, txns)?;
    let initial = initial_balance.unwrap_or(cfg.ledger.initial_balance);
    Ok((StatementService::new(store, initial), owner))
}

fn print_statement(s: &BankStatement) {
    println!(
        "{:<8} {}..{} | count={} | start={:.2} end={:.2} | deposits={:.2} expenditures={:.2}",
        s.id.to_string(),
        s.date_range.start.format("%Y-%m-%d"),
        s.date_range.end.format("%Y-%m-%d"),
        s.transaction_count,
        s.starting_balance,
        s.ending_balance,
        s.total_deposits,
        s.total_expenditures,
    );
}

fn print_row(row: &TransactionWithBalance) {
    let t = &row.transaction;
    println!(
        "{} | {:<11} | {:>10.2} | balance={:.2} | {}",
        t.transaction_date.format("%Y-%m-%d"),
        t.transaction_type,
        t.amount,
        row.running_balance,
        t.description,
    );
}
