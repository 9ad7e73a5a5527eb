//! Layout reconstruction: positioned text runs to ordered lines and
//! paragraph-separated page text.
//!
//! The thresholds are heuristics tuned for statement PDFs. They are kept as
//! named constants so tests can pin exact boundaries, and bundled into
//! [`LayoutOptions`] so callers can override them from config.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::TextRun;

/// Runs whose `y` differ by at most this much share a line.
pub const SAME_LINE_TOLERANCE: f64 = 5.0;
/// Vertical deltas at or below this are ignored when estimating line height.
pub const LINE_HEIGHT_NOISE: f64 = 5.0;
/// Horizontal distance between run origins above which a space may be inserted.
pub const SPACE_GAP: f64 = 5.0;
/// Line height assumed when the sample yields no usable deltas.
pub const DEFAULT_LINE_HEIGHT: f64 = 12.0;
/// A line gap above `factor * line height` starts a new paragraph.
pub const PARAGRAPH_GAP_FACTOR: f64 = 1.5;
/// Number of leading runs sampled for the line height estimate.
pub const LINE_HEIGHT_SAMPLES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub same_line_tolerance: f64,
    pub line_height_noise: f64,
    pub space_gap: f64,
    pub default_line_height: f64,
    pub paragraph_gap_factor: f64,
    pub line_height_samples: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            same_line_tolerance: SAME_LINE_TOLERANCE,
            line_height_noise: LINE_HEIGHT_NOISE,
            space_gap: SPACE_GAP,
            default_line_height: DEFAULT_LINE_HEIGHT,
            paragraph_gap_factor: PARAGRAPH_GAP_FACTOR,
            line_height_samples: LINE_HEIGHT_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Placed<'a> {
    text: &'a str,
    x: f64,
    y: f64,
}

/// Fragments believed to sit on the same row, left to right.
#[derive(Debug)]
struct LogicalLine<'a> {
    y: f64,
    fragments: Vec<Placed<'a>>,
}

impl LogicalLine<'_> {
    fn text(&self, opts: &LayoutOptions) -> String {
        let mut out = String::new();
        let mut prev: Option<&Placed> = None;
        for frag in &self.fragments {
            if let Some(p) = prev {
                if frag.x - p.x > opts.space_gap && needs_space(p.text, frag.text) {
                    out.push(' ');
                }
            }
            out.push_str(frag.text);
            prev = Some(frag);
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Result of reconstructing one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Lines top to bottom, paragraphs separated by one blank line.
    pub text: String,
    pub paragraphs: Vec<String>,
    pub line_height: f64,
    pub skipped_runs: usize,
}

/// Suppress the synthetic space across hyphenated words and decimal points.
fn needs_space(prev: &str, next: &str) -> bool {
    let (Some(last), Some(first)) = (prev.chars().last(), next.chars().next()) else {
        return false;
    };
    if last.is_whitespace() || first.is_whitespace() {
        return false;
    }
    let second = next.chars().nth(1);
    match (last, first) {
        // "multi-" + "word"
        ('-', f) if f.is_lowercase() => false,
        // "self" + "-service"
        (l, '-') if l.is_alphabetic() && second.is_some_and(char::is_alphabetic) => false,
        // "12." + "50"
        ('.', f) if f.is_ascii_digit() => false,
        // "12" + ".50"
        (l, '.') if l.is_ascii_digit() && second.is_some_and(|c| c.is_ascii_digit()) => false,
        _ => true,
    }
}

/// Average of consecutive vertical deltas above the noise threshold within
/// the leading sample, or the configured default.
fn estimate_line_height(runs: &[Placed], opts: &LayoutOptions) -> f64 {
    let sample: Vec<f64> = runs
        .iter()
        .take(opts.line_height_samples)
        .map(|r| r.y)
        .collect();
    let deltas: Vec<f64> = sample
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| *d > opts.line_height_noise)
        .collect();
    if deltas.is_empty() {
        opts.default_line_height
    } else {
        deltas.iter().sum::<f64>() / deltas.len() as f64
    }
}

/// Top-to-bottom rows; each row keeps the `y` of its first (highest) run.
fn group_lines<'a>(mut runs: Vec<Placed<'a>>, opts: &LayoutOptions) -> Vec<LogicalLine<'a>> {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<LogicalLine<'a>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if (line.y - run.y).abs() <= opts.same_line_tolerance => {
                line.fragments.push(run)
            }
            _ => lines.push(LogicalLine {
                y: run.y,
                fragments: vec![run],
            }),
        }
    }
    for line in &mut lines {
        line.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Reconstruct reading order for one page's runs, given in any order.
pub fn reconstruct(runs: &[TextRun], opts: &LayoutOptions) -> PageLayout {
    let mut skipped_runs = 0;
    let placed: Vec<Placed> = runs
        .iter()
        .filter_map(|run| match run.origin() {
            Some((x, y)) => Some(Placed {
                text: run.text.as_str(),
                x,
                y,
            }),
            None => {
                skipped_runs += 1;
                None
            }
        })
        .filter(|p| !p.text.is_empty())
        .collect();
    if skipped_runs > 0 {
        warn!(skipped_runs, "skipping text runs without position data");
    }

    let line_height = estimate_line_height(&placed, opts);
    let paragraph_gap = line_height * opts.paragraph_gap_factor;
    let lines = group_lines(placed, opts);

    let mut paragraphs: Vec<Vec<String>> = Vec::new();
    let mut prev_y: Option<f64> = None;
    let mut pending_break = false;
    for line in &lines {
        if let Some(py) = prev_y {
            if py - line.y > paragraph_gap {
                pending_break = true;
            }
        }
        prev_y = Some(line.y);

        let text = line.text(opts);
        if text.is_empty() {
            continue;
        }
        match paragraphs.last_mut() {
            Some(current) if !pending_break => current.push(text),
            _ => paragraphs.push(vec![text]),
        }
        pending_break = false;
    }

    let paragraphs: Vec<String> = paragraphs.into_iter().map(|p| p.join("\n")).collect();
    let text = collapse_blank_lines(&paragraphs.join("\n\n"));

    debug!(
        runs = runs.len(),
        skipped_runs,
        line_height,
        lines = lines.len(),
        paragraphs = paragraphs.len(),
        "reconstructed page layout"
    );

    PageLayout {
        text,
        paragraphs,
        line_height,
        skipped_runs,
    }
}

/// Collapse three or more consecutive newlines to exactly two.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }
    out
}

/// Paragraphs of already-reconstructed text: blocks separated by blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_string());
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> LayoutOptions {
        LayoutOptions::default()
    }

    #[test]
    fn test_space_inserted_across_gap() {
        let runs = vec![TextRun::at("100", 0.0, 0.0), TextRun::at("-50", 20.0, 0.0)];
        assert_eq!(reconstruct(&runs, &opts()).text, "100 -50");
    }

    #[test]
    fn test_hyphen_continuation_joins() {
        let runs = vec![TextRun::at("multi-", 0.0, 0.0), TextRun::at("word", 20.0, 0.0)];
        assert_eq!(reconstruct(&runs, &opts()).text, "multi-word");
    }

    #[test]
    fn test_decimal_point_joins_both_directions() {
        let trailing = vec![TextRun::at("12.", 0.0, 0.0), TextRun::at("50", 20.0, 0.0)];
        assert_eq!(reconstruct(&trailing, &opts()).text, "12.50");
        let leading = vec![TextRun::at("12", 0.0, 0.0), TextRun::at(".50", 20.0, 0.0)];
        assert_eq!(reconstruct(&leading, &opts()).text, "12.50");
    }

    #[test]
    fn test_gap_at_threshold_adds_no_space() {
        let runs = vec![TextRun::at("ab", 0.0, 0.0), TextRun::at("cd", SPACE_GAP, 0.0)];
        assert_eq!(reconstruct(&runs, &opts()).text, "abcd");
        let runs = vec![TextRun::at("ab", 0.0, 0.0), TextRun::at("cd", SPACE_GAP + 0.5, 0.0)];
        assert_eq!(reconstruct(&runs, &opts()).text, "ab cd");
    }

    #[test]
    fn test_orders_top_to_bottom_left_to_right() {
        // arbitrary input order, y grows upward
        let runs = vec![
            TextRun::at("second", 0.0, 688.0),
            TextRun::at("line", 40.0, 688.0),
            TextRun::at("one", 40.0, 701.0),
            TextRun::at("Line", 0.0, 700.0),
        ];
        assert_eq!(reconstruct(&runs, &opts()).text, "Line one\nsecond line");
    }

    #[test]
    fn test_same_line_tolerance_boundary() {
        let runs = vec![
            TextRun::at("a", 0.0, 100.0),
            TextRun::at("b", 20.0, 100.0 - SAME_LINE_TOLERANCE),
        ];
        assert_eq!(reconstruct(&runs, &opts()).text, "a b");
        let runs = vec![TextRun::at("a", 0.0, 100.0), TextRun::at("b", 20.0, 94.0)];
        assert_eq!(reconstruct(&runs, &opts()).text, "a\nb");
    }

    #[test]
    fn test_paragraph_gap_factor_boundary() {
        // Only the first three runs are sampled, so the estimate stays at 12
        // and the break threshold is exactly 18.
        let opts = LayoutOptions {
            line_height_samples: 3,
            ..opts()
        };
        let runs = vec![
            TextRun::at("a", 0.0, 100.0),
            TextRun::at("b", 0.0, 88.0),
            TextRun::at("c", 0.0, 76.0),
            TextRun::at("at threshold", 0.0, 76.0 - 18.0),
            TextRun::at("past threshold", 0.0, 58.0 - 18.5),
        ];
        let layout = reconstruct(&runs, &opts);
        assert_eq!(layout.line_height, 12.0);
        assert_eq!(layout.line_height * PARAGRAPH_GAP_FACTOR, 18.0);
        assert_eq!(layout.text, "a\nb\nc\nat threshold\n\npast threshold");
        assert_eq!(layout.paragraphs.len(), 2);
    }

    #[test]
    fn test_paragraph_break_on_large_gap() {
        let runs = vec![
            TextRun::at("Header", 0.0, 700.0),
            TextRun::at("first", 0.0, 688.0),
            TextRun::at("second", 0.0, 676.0),
            TextRun::at("after gap", 0.0, 640.0),
        ];
        let layout = reconstruct(&runs, &opts());
        assert_eq!(layout.line_height, 20.0);
        assert_eq!(layout.text, "Header\nfirst\nsecond\n\nafter gap");
        assert_eq!(layout.paragraphs, vec!["Header\nfirst\nsecond", "after gap"]);
    }

    #[test]
    fn test_line_height_defaults_without_samples() {
        let runs = vec![TextRun::at("only", 0.0, 10.0), TextRun::at("row", 30.0, 12.0)];
        assert_eq!(reconstruct(&runs, &opts()).line_height, DEFAULT_LINE_HEIGHT);
    }

    #[test]
    fn test_unpositioned_runs_are_skipped() {
        let runs = vec![
            TextRun::at("kept", 0.0, 0.0),
            TextRun::unpositioned("lost"),
            TextRun::at("too", 20.0, 0.0),
        ];
        let layout = reconstruct(&runs, &opts());
        assert_eq!(layout.text, "kept too");
        assert_eq!(layout.skipped_runs, 1);
    }

    #[test]
    fn test_empty_page() {
        let layout = reconstruct(&[], &opts());
        assert_eq!(layout.text, "");
        assert!(layout.paragraphs.is_empty());
    }

    #[test]
    fn test_collapse_and_split_paragraphs() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\nc"), "a\n\nb\nc");
        assert_eq!(split_paragraphs("a\nb\n\n\nc\n"), vec!["a\nb", "c"]);
    }
}
