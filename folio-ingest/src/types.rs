use serde::{Deserialize, Serialize};

use crate::category::CategoryBucket;

/// One positioned text run as supplied by the document viewer.
///
/// Page coordinates grow upward, so a larger `y` is higher on the page.
/// Runs without a usable origin are skipped during reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

impl TextRun {
    pub fn at(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x: Some(x),
            y: Some(y),
        }
    }

    pub fn unpositioned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: None,
            y: None,
        }
    }

    /// `(x, y)` when both coordinates are present and finite.
    pub fn origin(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        }
    }
}

/// All runs for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRuns {
    pub page_number: u32,
    pub runs: Vec<TextRun>,
}

/// Provisional record extracted from one logical line. Never authoritative:
/// a review step decides which of these become persisted transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_bucket: Option<CategoryBucket>,
    /// Empty only for blank-line placeholders.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub raw_text: String,
    /// 1-based line number within the page text.
    pub line_number: usize,
    pub is_new_line: bool,
}

impl ParsedTransaction {
    /// Placeholder for a blank line; keeps line numbering aligned with the source.
    pub fn blank(line_number: usize) -> Self {
        Self {
            line_number,
            is_new_line: true,
            ..Default::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.raw_text.is_empty()
    }
}

/// Every distinct date/amount/location/category found in a block of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedData {
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub locations: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPage {
    pub page_number: u32,
    pub text: String,
    pub paragraphs: Vec<String>,
    pub transactions: Vec<ParsedTransaction>,
    pub identified_data: IdentifiedData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSpan {
    pub earliest: String,
    pub latest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: String,
    pub max: String,
    /// Sum of every identified amount, two decimals.
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub total_pages: usize,
    pub page_numbers: Vec<u32>,
    pub has_content: bool,
    pub total_transactions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_range: Option<AmountRange>,
    pub locations: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub pages: Vec<ParsedPage>,
    pub summary: DocumentSummary,
}
