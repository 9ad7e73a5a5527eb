//! folio-ingest: positioned page text to logical lines, and lines to
//! provisional transaction records.

pub mod category;
pub mod document;
pub mod fields;
pub mod layout;
pub mod summary;
pub mod types;

pub use category::CategoryBucket;
pub use document::{
    PageText, TextStats, parse_document, parse_document_text, parse_page, render_document_text,
};
pub use fields::{FieldExtractor, FieldMatch};
pub use layout::{LayoutOptions, PageLayout, reconstruct};
pub use types::{
    AmountRange, DateSpan, DocumentSummary, IdentifiedData, PageRuns, ParsedDocument, ParsedPage,
    ParsedTransaction, TextRun,
};
