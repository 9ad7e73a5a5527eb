//! Field extraction: ordered regex families for dates, amounts, locations
//! and categories.
//!
//! Within a family, patterns are tried in order and the first pattern that
//! matches anywhere wins. Separators inside a match are spaces or tabs only,
//! so matches never straddle two lines of page text.

use std::ops::Range;

use anyhow::{Context, Result};
use regex::Regex;

use crate::category::CategoryBucket;
use crate::types::{IdentifiedData, ParsedTransaction};

const DATE_PATTERNS: [&str; 6] = [
    // MM/DD/YYYY or MM/DD/YY
    r"\b\d{1,2}/\d{1,2}/\d{2,4}\b",
    // MM-DD-YYYY or MM-DD-YY
    r"\b\d{1,2}-\d{1,2}-\d{2,4}\b",
    // Month DD, YYYY
    r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*[ \t]\d{1,2},?[ \t]\d{4}\b",
    // YYYY-MM-DD
    r"\b\d{4}-\d{2}-\d{2}\b",
    // MM.DD.YYYY or MM.DD.YY
    r"\b\d{1,2}\.\d{1,2}\.\d{2,4}\b",
    // MM DD YYYY or MM DD YY
    r"\b\d{1,2}[ \t]+\d{1,2}[ \t]+\d{2,4}\b",
];

const AMOUNT_PATTERNS: [&str; 4] = [
    // $1,234.56 | $45.99 | $45 | 1,234.56 | 1,234 | 45.99
    concat!(
        r"\$\d{1,3}(?:,\d{3})+(?:\.\d{2})?",
        r"|\$\d+(?:\.\d{2})?",
        r"|\b\d{1,3}(?:,\d{3})+(?:\.\d{2})?\b",
        r"|\b\d+\.\d{2}\b",
    ),
    r"(?i)\b\d+(?:\.\d{2})?[ \t]*(?:USD|EUR|GBP|CAD|AUD)\b",
    r"(?i)\b(?:USD|EUR|GBP|CAD|AUD)[ \t]*\d+(?:\.\d{2})?\b",
    r"(?i)\b\d+(?:\.\d{2})?[ \t]*(?:dollars?|euros?|pounds?)\b",
];

/// Capture group 1 holds the location.
const LOCATION_PATTERNS: [&str; 4] = [
    r"\b(?:at|in|from|to|near|by)[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)\b",
    concat!(
        r"\b([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)[ \t]+",
        r"(?:Store|Shop|Market|Restaurant|Hotel|Bank|Office|Center|Mall|Location|Branch)\b",
    ),
    r"\b([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)[ \t]+(?:LLC|Inc|Corp|Company|Co|Ltd)\b",
    concat!(
        r"\b([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)[ \t]+",
        r"(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Place|Pl|Court|Ct)\b",
    ),
];

/// Characters treated as column separators when cleaning a description.
const SEPARATORS: &[char] = &['-', '|', ',', ';', ':', '–', '—'];

/// A matched substring and where it sits in the searched text.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub text: String,
    pub span: Range<usize>,
}

/// Compiled pattern families. Build once and reuse across lines and pages.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    dates: Vec<Regex>,
    amounts: Vec<Regex>,
    locations: Vec<Regex>,
    categories: Vec<(CategoryBucket, Regex)>,
}

impl FieldExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dates: compile(&DATE_PATTERNS)?,
            amounts: compile(&AMOUNT_PATTERNS)?,
            locations: compile(&LOCATION_PATTERNS)?,
            categories: CategoryBucket::ALL
                .into_iter()
                .map(|bucket| {
                    let pattern = bucket.pattern();
                    Regex::new(&pattern)
                        .with_context(|| format!("compile category pattern {pattern}"))
                        .map(|re| (bucket, re))
                })
                .collect::<Result<_>>()?,
        })
    }

    /// Every date in `text`, pattern order first, de-duplicated.
    pub fn dates(&self, text: &str) -> Vec<String> {
        dedup(self.date_matches(text).into_iter().map(|m| m.text))
    }

    /// Every amount in `text`. Digits that belong to a date are never
    /// reported as amounts.
    pub fn amounts(&self, text: &str) -> Vec<String> {
        dedup(self.amount_matches(text).into_iter().map(|m| m.text))
    }

    pub fn locations(&self, text: &str) -> Vec<String> {
        dedup(self.location_matches(text).into_iter().map(|m| m.text))
    }

    /// Every category keyword in `text`, de-duplicated case-insensitively
    /// while keeping the first spelling seen.
    pub fn categories(&self, text: &str) -> Vec<(String, CategoryBucket)> {
        let mut seen: Vec<String> = Vec::new();
        let mut out = Vec::new();
        for (bucket, re) in &self.categories {
            for m in re.find_iter(text) {
                let folded = m.as_str().to_lowercase();
                if !seen.contains(&folded) {
                    seen.push(folded);
                    out.push((m.as_str().to_string(), *bucket));
                }
            }
        }
        out
    }

    pub fn first_date(&self, text: &str) -> Option<FieldMatch> {
        self.date_matches(text).into_iter().next()
    }

    pub fn first_amount(&self, text: &str) -> Option<FieldMatch> {
        self.amount_matches(text).into_iter().next()
    }

    pub fn first_location(&self, text: &str) -> Option<FieldMatch> {
        self.location_matches(text).into_iter().next()
    }

    pub fn first_category(&self, text: &str) -> Option<(String, CategoryBucket)> {
        self.categories
            .iter()
            .find_map(|(bucket, re)| re.find(text).map(|m| (m.as_str().to_string(), *bucket)))
    }

    /// Extract one provisional record from a logical line.
    ///
    /// Blank lines yield a placeholder so numbering survives the round trip
    /// back to the source document.
    pub fn parse_line(&self, line: &str, line_number: usize) -> ParsedTransaction {
        let line = line.trim();
        if line.is_empty() {
            return ParsedTransaction::blank(line_number);
        }

        let date = self.first_date(line);
        let amount = self.first_amount(line);
        let category = self.first_category(line);

        let mut consumed: Vec<Range<usize>> = date
            .iter()
            .chain(amount.iter())
            .map(|m| m.span.clone())
            .collect();
        consumed.sort_by_key(|r| r.start);
        let description = clean_description(line, &consumed);

        ParsedTransaction {
            date: date.map(|m| m.text),
            amount: amount.map(|m| m.text),
            location: self.first_location(line).map(|m| m.text),
            category_bucket: category.as_ref().map(|(_, bucket)| *bucket),
            category: category.map(|(text, _)| text),
            description,
            raw_text: line.to_string(),
            line_number,
            is_new_line: true,
        }
    }

    /// Page-level sweep used for `ParsedPage::identified_data`.
    pub fn identify(&self, text: &str) -> IdentifiedData {
        IdentifiedData {
            dates: self.dates(text),
            amounts: self.amounts(text),
            locations: self.locations(text),
            categories: self.categories(text).into_iter().map(|(c, _)| c).collect(),
        }
    }

    fn date_matches(&self, text: &str) -> Vec<FieldMatch> {
        self.dates
            .iter()
            .flat_map(|re| re.find_iter(text))
            .map(|m| FieldMatch {
                text: m.as_str().to_string(),
                span: m.range(),
            })
            .collect()
    }

    fn amount_matches(&self, text: &str) -> Vec<FieldMatch> {
        let date_spans: Vec<Range<usize>> =
            self.date_matches(text).into_iter().map(|m| m.span).collect();
        self.amounts
            .iter()
            .flat_map(|re| re.find_iter(text))
            .filter(|m| !date_spans.iter().any(|d| overlaps(d, &m.range())))
            .map(|m| FieldMatch {
                text: m.as_str().to_string(),
                span: m.range(),
            })
            .collect()
    }

    fn location_matches(&self, text: &str) -> Vec<FieldMatch> {
        self.locations
            .iter()
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| FieldMatch {
                text: m.as_str().to_string(),
                span: m.range(),
            })
            .collect()
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("compile pattern {p}")))
        .collect()
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn is_separator_token(token: &str) -> bool {
    token.chars().all(|c| SEPARATORS.contains(&c))
}

/// Remove the consumed spans from `line` and tidy the leftovers: repeated
/// separator tokens collapse to one and separators at either end are dropped.
/// Falls back to the whole line when nothing meaningful is left.
fn clean_description(line: &str, consumed: &[Range<usize>]) -> String {
    let mut remaining = String::with_capacity(line.len());
    let mut cursor = 0;
    for span in consumed {
        if span.start < cursor {
            continue;
        }
        remaining.push_str(&line[cursor..span.start]);
        remaining.push(' ');
        cursor = span.end;
    }
    remaining.push_str(&line[cursor..]);

    let mut tokens: Vec<&str> = Vec::new();
    for token in remaining.split_whitespace() {
        let token = if is_separator_token(token) {
            token
        } else {
            token.trim_end_matches(',')
        };
        if token.is_empty() {
            continue;
        }
        let prev_is_separator = tokens.last().is_none_or(|t| is_separator_token(t));
        if is_separator_token(token) && prev_is_separator {
            continue;
        }
        tokens.push(token);
    }
    while tokens.last().is_some_and(|t| is_separator_token(t)) {
        tokens.pop();
    }

    if tokens.is_empty() {
        line.to_string()
    } else {
        tokens.join(" ")
    }
}
