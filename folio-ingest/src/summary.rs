//! Document statistics aggregated across pages.
//!
//! Dates come out of the extractor in several layouts, so they are normalised
//! to calendar dates before min/max. Comparing the raw strings would rank
//! "12/01/2023" after "02/15/2024".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::types::{AmountRange, DateSpan, DocumentSummary, ParsedPage};

pub fn summarize(pages: &[ParsedPage]) -> DocumentSummary {
    let dates: Vec<&str> = pages
        .iter()
        .flat_map(|p| p.identified_data.dates.iter().map(String::as_str))
        .collect();
    let amounts: Vec<&str> = pages
        .iter()
        .flat_map(|p| p.identified_data.amounts.iter().map(String::as_str))
        .collect();

    let mut locations: Vec<String> = Vec::new();
    for loc in pages.iter().flat_map(|p| &p.identified_data.locations) {
        if !locations.contains(loc) {
            locations.push(loc.clone());
        }
    }
    let mut categories: Vec<String> = Vec::new();
    for cat in pages.iter().flat_map(|p| &p.identified_data.categories) {
        if !categories.iter().any(|c| c.eq_ignore_ascii_case(cat)) {
            categories.push(cat.clone());
        }
    }

    DocumentSummary {
        total_pages: pages.len(),
        page_numbers: pages.iter().map(|p| p.page_number).collect(),
        has_content: pages.iter().any(|p| !p.text.is_empty()),
        total_transactions: pages.iter().map(|p| p.transactions.len()).sum(),
        date_range: date_span(&dates),
        amount_range: amount_range(&amounts),
        locations,
        categories,
    }
}

/// Earliest and latest by calendar date; strings that do not name a real
/// date are left out.
fn date_span(dates: &[&str]) -> Option<DateSpan> {
    let parsed: Vec<(NaiveDate, &str)> = dates
        .iter()
        .filter_map(|s| normalize_date(s).map(|d| (d, *s)))
        .collect();
    let earliest = parsed.iter().min_by_key(|(d, _)| *d)?;
    let latest = parsed.iter().max_by_key(|(d, _)| *d)?;
    Some(DateSpan {
        earliest: earliest.1.to_string(),
        latest: latest.1.to_string(),
    })
}

fn amount_range(amounts: &[&str]) -> Option<AmountRange> {
    let parsed: Vec<(Decimal, &str)> = amounts
        .iter()
        .filter_map(|s| normalize_amount(s).map(|v| (v, *s)))
        .collect();
    let min = parsed.iter().min_by_key(|(v, _)| *v)?;
    let max = parsed.iter().max_by_key(|(v, _)| *v)?;
    let total: Decimal = parsed.iter().map(|(v, _)| *v).sum();
    Some(AmountRange {
        min: min.1.to_string(),
        max: max.1.to_string(),
        total: format!("{:.2}", total),
    })
}

/// Parse any layout the date family can match. Two-digit years pivot at 69:
/// `00..=68` are 20xx, `69..=99` are 19xx.
pub fn normalize_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.split('-').next().is_some_and(|year| year.len() == 4) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }
    if s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        let cleaned = s.replace(',', " ");
        let parts: Vec<&str> = cleaned.split_whitespace().collect();
        let [name, day, year] = parts.as_slice() else {
            return None;
        };
        return NaiveDate::from_ymd_opt(year.parse().ok()?, month_number(name)?, day.parse().ok()?);
    }

    let parts: Vec<&str> = s
        .split(|c: char| c == '/' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [month, day, year] = parts.as_slice() else {
        return None;
    };
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = match year.len() {
        4 => year.parse().ok()?,
        2 => {
            let yy: i32 = year.parse().ok()?;
            if yy < 69 { 2000 + yy } else { 1900 + yy }
        }
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// 1-based month for a full or abbreviated English month name. Any prefix of
/// at least three letters counts, so `Sep`, `Sept` and `September` agree.
fn month_number(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.').to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }
    let index = MONTH_NAMES.iter().position(|m| m.starts_with(&name))?;
    u32::try_from(index + 1).ok()
}

/// Numeric value of an amount string with currency symbols, codes, words
/// and thousands separators stripped.
pub fn normalize_amount(s: &str) -> Option<Decimal> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let numeric: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(numeric.trim_end_matches('.')).ok()
}
