//! Document-level assembly: pages to `ParsedDocument`, the page-marker text
//! form handed to reviewers, and plain text statistics.

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::FieldExtractor;
use crate::layout::{LayoutOptions, collapse_blank_lines, reconstruct, split_paragraphs};
use crate::summary::summarize;
use crate::types::{PageRuns, ParsedDocument, ParsedPage};

const PAGE_ERROR_PLACEHOLDER: &str = "[Could not extract text from this page]";

impl ParsedPage {
    /// Build a page from already-reconstructed text. Every line, blank ones
    /// included, yields one record numbered from 1.
    pub fn from_text(page_number: u32, text: &str, extractor: &FieldExtractor) -> Self {
        let text = text.trim().to_string();
        let transactions = text
            .lines()
            .enumerate()
            .map(|(i, line)| extractor.parse_line(line, i + 1))
            .collect();
        Self {
            page_number,
            paragraphs: split_paragraphs(&text),
            transactions,
            identified_data: extractor.identify(&text),
            text,
        }
    }
}

/// Reconstruct one page from positioned runs and extract its fields.
pub fn parse_page(page: &PageRuns, opts: &LayoutOptions, extractor: &FieldExtractor) -> ParsedPage {
    let layout = reconstruct(&page.runs, opts);
    ParsedPage::from_text(page.page_number, &layout.text, extractor)
}

impl ParsedDocument {
    pub fn from_pages(pages: Vec<ParsedPage>) -> Self {
        let summary = summarize(&pages);
        Self { pages, summary }
    }
}

/// Parse every page of a document. Pages carry no shared state, so callers
/// may equally run `parse_page` per page in parallel and use `from_pages`.
pub fn parse_document(
    pages: &[PageRuns],
    opts: &LayoutOptions,
    extractor: &FieldExtractor,
) -> ParsedDocument {
    let parsed: Vec<ParsedPage> = pages
        .iter()
        .map(|page| parse_page(page, opts, extractor))
        .collect();
    debug!(pages = parsed.len(), "parsed document");
    ParsedDocument::from_pages(parsed)
}

/// One page's contribution to the page-marker text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PageText {
    #[serde(rename_all = "camelCase")]
    Extracted { page_number: u32, text: String },
    /// The viewer could not supply this page.
    #[serde(rename_all = "camelCase")]
    Failed { page_number: u32 },
}

/// Join pages as `--- Page N ---` blocks. Pages without text are omitted;
/// failed pages keep a visible placeholder.
pub fn render_document_text(pages: &[PageText]) -> String {
    let blocks: Vec<String> = pages
        .iter()
        .filter_map(|page| match page {
            PageText::Extracted { page_number, text } => {
                let text = text.trim();
                (!text.is_empty()).then(|| format!("--- Page {page_number} ---\n\n{text}"))
            }
            PageText::Failed { page_number } => Some(format!(
                "--- Page {page_number} (Error) ---\n\n{PAGE_ERROR_PLACEHOLDER}"
            )),
        })
        .collect();
    blocks.join("\n\n")
}

/// Split page-marker text back into pages and extract fields from each.
///
/// Text before the first marker counts as a page of its own. Sections that
/// are blank are dropped, as on the rendering side.
pub fn parse_document_text(text: &str, extractor: &FieldExtractor) -> Result<ParsedDocument> {
    let marker = Regex::new(r"(?m)^--- Page (\d+)(?: \(Error\))? ---[ \t]*$")?;

    let mut sections: Vec<(Option<u32>, &str)> = Vec::new();
    let mut cursor = 0;
    let mut pending_number: Option<u32> = None;
    for caps in marker.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        sections.push((pending_number, &text[cursor..whole.start()]));
        pending_number = caps.get(1).and_then(|n| n.as_str().parse().ok());
        cursor = whole.end();
    }
    sections.push((pending_number, &text[cursor..]));

    let pages: Vec<ParsedPage> = sections
        .into_iter()
        .filter(|(_, body)| !body.trim().is_empty())
        .enumerate()
        .map(|(i, (number, body))| {
            let page_number = number.unwrap_or(i as u32 + 1);
            ParsedPage::from_text(page_number, &collapse_blank_lines(body), extractor)
        })
        .collect();
    Ok(ParsedDocument::from_pages(pages))
}

/// Word, line and character counts for extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub words: usize,
    pub lines: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            lines: text.split('\n').count(),
            characters: text.chars().count(),
            characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextRun;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new().unwrap()
    }

    #[test]
    fn test_page_from_text_keeps_blank_lines() {
        let page = ParsedPage::from_text(
            2,
            "01/05/2024 Deposit $200.00\n\n01/10/2024 Grocery $50.00",
            &extractor(),
        );
        assert_eq!(page.transactions.len(), 3);
        assert!(page.transactions[1].is_blank());
        assert_eq!(page.transactions[1].line_number, 2);
        assert_eq!(page.transactions[2].line_number, 3);
        assert_eq!(page.transactions[2].amount.as_deref(), Some("$50.00"));
        assert_eq!(page.paragraphs.len(), 2);
        assert!(page.transactions.iter().all(|t| t.is_new_line));
    }

    #[test]
    fn test_parse_document_from_runs() {
        let pages = vec![
            PageRuns {
                page_number: 1,
                runs: vec![
                    TextRun::at("03/15/2024", 0.0, 700.0),
                    TextRun::at("$45.99", 80.0, 700.0),
                    TextRun::at("Grocery shopping", 140.0, 700.0),
                    TextRun::at("03/16/2024", 0.0, 688.0),
                    TextRun::at("$12.50", 80.0, 688.0),
                    TextRun::at("Parking", 140.0, 688.0),
                ],
            },
            PageRuns {
                page_number: 2,
                runs: vec![TextRun::unpositioned("nothing placed")],
            },
        ];
        let doc = parse_document(&pages, &LayoutOptions::default(), &extractor());
        assert_eq!(
            doc.pages[0].text,
            "03/15/2024 $45.99 Grocery shopping\n03/16/2024 $12.50 Parking"
        );
        assert_eq!(doc.pages[1].text, "");
        assert!(doc.pages[1].paragraphs.is_empty());
        assert_eq!(doc.summary.total_pages, 2);
        assert_eq!(doc.summary.page_numbers, vec![1, 2]);
        assert!(doc.summary.has_content);
        assert_eq!(doc.summary.total_transactions, 2);
    }

    #[test]
    fn test_empty_document_has_no_content() {
        let pages = vec![PageRuns {
            page_number: 1,
            runs: vec![],
        }];
        let doc = parse_document(&pages, &LayoutOptions::default(), &extractor());
        assert!(!doc.summary.has_content);
        assert_eq!(doc.summary.total_transactions, 0);
        assert!(doc.summary.date_range.is_none());
        assert!(doc.summary.amount_range.is_none());
    }

    #[test]
    fn test_render_and_parse_page_marker_text() {
        let rendered = render_document_text(&[
            PageText::Extracted {
                page_number: 1,
                text: "01/05/2024 Paycheck $200.00".to_string(),
            },
            PageText::Extracted {
                page_number: 2,
                text: "   ".to_string(),
            },
            PageText::Failed { page_number: 3 },
            PageText::Extracted {
                page_number: 4,
                text: "01/10/2024 Taxi $50.00".to_string(),
            },
        ]);
        assert_eq!(
            rendered,
            "--- Page 1 ---\n\n01/05/2024 Paycheck $200.00\n\n\
             --- Page 3 (Error) ---\n\n[Could not extract text from this page]\n\n\
             --- Page 4 ---\n\n01/10/2024 Taxi $50.00"
        );

        let doc = parse_document_text(&rendered, &extractor()).unwrap();
        assert_eq!(doc.summary.page_numbers, vec![1, 3, 4]);
        assert_eq!(doc.pages[2].transactions[0].category.as_deref(), Some("Taxi"));
    }

    #[test]
    fn test_parse_text_without_markers() {
        let doc = parse_document_text("just one line $5.00", &extractor()).unwrap();
        assert_eq!(doc.summary.page_numbers, vec![1]);
        assert_eq!(doc.pages[0].transactions[0].amount.as_deref(), Some("$5.00"));
    }

    #[test]
    fn test_text_stats() {
        let stats = TextStats::of("two words\nthird");
        assert_eq!(
            stats,
            TextStats {
                words: 3,
                lines: 2,
                characters: 15,
                characters_no_spaces: 13,
            }
        );
        assert_eq!(TextStats::of("").lines, 1);
    }
}
