//! Positioned text, visual rows and column layout detection

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::statement::normalize::{clean_date, parse_clock_time};
use crate::types::{ParseError, ParseResult, StatementPeriod};

fn period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)(?:statement\s+period:?\s*)?",
            r"(?P<start>[A-Za-z]{3,9}\.?\s+\d{1,2},\s*\d{4})",
            r"(?:\s+(?P<start_time>\d{1,2}(?::\d{2})?\s*[AP]\.?M\.?))?",
            r"\s*[-\u{2013}]\s*",
            r"(?P<end>[A-Za-z]{3,9}\.?\s+\d{1,2},\s*\d{4})",
            r"(?:\s+(?P<end_time>\d{1,2}(?::\d{2})?\s*[AP]\.?M\.?))?",
        ))
        .expect("invalid statement period regex")
    })
}

fn page_footer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^page\s+\d+(\s+of\s+\d+)?$").expect("invalid page footer regex")
    })
}

/// A piece of text at a position on a page, as produced by PDF text extraction.
///
/// `y` grows downwards: a larger `y` is further down the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// All fragments extracted from a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub fragments: Vec<TextFragment>,
}

impl PageText {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }
}

/// A full statement, page by page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementDocument {
    pub pages: Vec<PageText>,
}

impl StatementDocument {
    pub fn new(pages: Vec<PageText>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.fragments.is_empty())
    }
}

/// Fragments sharing one visual line, ordered left to right
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRow {
    pub fragments: Vec<TextFragment>,
}

impl VisualRow {
    /// Space-joined text of the row
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_page_footer(&self) -> bool {
        page_footer_re().is_match(self.text().trim())
    }
}

/// Cluster a page's fragments into visual rows.
///
/// A fragment joins the current row while its `y` is within `tolerance` of the
/// row's first fragment; rows come out top to bottom.
pub fn group_rows(page: &PageText, tolerance: f32) -> Vec<VisualRow> {
    let mut fragments: Vec<TextFragment> = page
        .fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .cloned()
        .collect();
    fragments.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<VisualRow> = Vec::new();
    let mut anchor_y = f32::NEG_INFINITY;

    for fragment in fragments {
        match rows.last_mut() {
            Some(row) if (fragment.y - anchor_y).abs() <= tolerance => {
                row.fragments.push(fragment);
            }
            _ => {
                anchor_y = fragment.y;
                rows.push(VisualRow {
                    fragments: vec![fragment],
                });
            }
        }
    }

    for row in &mut rows {
        row.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    rows
}

/// Number of amount columns in the transaction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    /// Earnings, payouts, balance
    FiveColumn,
    /// Earnings, refunds & expenses (tolls), payouts, balance
    SixColumn,
}

impl LayoutKind {
    /// Amount cells a complete leading row carries
    pub fn amount_slots(&self) -> usize {
        match self {
            LayoutKind::FiveColumn => 3,
            LayoutKind::SixColumn => 4,
        }
    }

    pub fn has_toll_column(&self) -> bool {
        matches!(self, LayoutKind::SixColumn)
    }
}

/// Amount-bearing columns of the transaction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountColumn {
    Earnings,
    RefundsExpenses,
    Payouts,
    Balance,
}

impl AmountColumn {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("balance") {
            Some(AmountColumn::Balance)
        } else if label.contains("payout") {
            Some(AmountColumn::Payouts)
        } else if label.contains("refund") || label.contains("expense") {
            Some(AmountColumn::RefundsExpenses)
        } else if label.contains("earning") || label.contains("amount") {
            Some(AmountColumn::Earnings)
        } else {
            None
        }
    }
}

/// Detected table layout with the horizontal position of each amount column label
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub kind: LayoutKind,
    pub anchors: Vec<(AmountColumn, f32)>,
}

impl ColumnLayout {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            anchors: Vec::new(),
        }
    }

    /// Column whose label sits closest to `x`
    pub fn nearest_column(&self, x: f32) -> Option<AmountColumn> {
        self.anchors
            .iter()
            .filter(|(column, _)| {
                self.kind.has_toll_column() || *column != AmountColumn::RefundsExpenses
            })
            .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
            .map(|(column, _)| *column)
    }
}

/// Whether a row is the transaction table's column header.
///
/// The balance label and an earnings or payouts label must be separate
/// fragments, so description text mentioning both words is not a header.
pub fn is_column_header(row: &VisualRow) -> bool {
    let labels: HashSet<AmountColumn> = row
        .fragments
        .iter()
        .filter_map(|f| AmountColumn::from_label(&f.text))
        .collect();
    labels.contains(&AmountColumn::Balance)
        && (labels.contains(&AmountColumn::Payouts) || labels.contains(&AmountColumn::Earnings))
}

/// Read the column layout from the first column header row.
///
/// A "refunds/expenses" label selects the six-column layout. No header row at
/// all means the statement cannot be mapped to columns.
pub fn detect_layout<'a, I>(rows: I) -> ParseResult<ColumnLayout>
where
    I: IntoIterator<Item = &'a VisualRow>,
{
    let header = rows
        .into_iter()
        .find(|row| is_column_header(row))
        .ok_or_else(|| {
            ParseError::UnrecognizedLayout("no transaction column header found".to_string())
        })?;

    let text = header.text().to_lowercase();
    let kind = if text.contains("refund") || text.contains("expense") {
        LayoutKind::SixColumn
    } else {
        LayoutKind::FiveColumn
    };

    let mut layout = ColumnLayout::new(kind);
    for fragment in &header.fragments {
        if let Some(column) = AmountColumn::from_label(&fragment.text) {
            if !layout.anchors.iter().any(|(c, _)| *c == column) {
                layout.anchors.push((column, fragment.x));
            }
        }
    }

    Ok(layout)
}

/// Find the `Statement period: <start> - <end>` header.
pub fn find_statement_period<'a, I>(rows: I) -> ParseResult<StatementPeriod>
where
    I: IntoIterator<Item = &'a VisualRow>,
{
    for row in rows {
        let text = row.text();
        if let Some(caps) = period_re().captures(&text) {
            let start = period_point(&caps["start"], caps.name("start_time").map(|m| m.as_str()))?;
            let end = period_point(&caps["end"], caps.name("end_time").map(|m| m.as_str()))?;
            return Ok(StatementPeriod::new(start, end));
        }
    }

    Err(ParseError::UnrecognizedLayout(
        "no statement period header found".to_string(),
    ))
}

fn period_point(date_text: &str, time_text: Option<&str>) -> ParseResult<NaiveDateTime> {
    let date = clean_date(date_text, Some("%b %d, %Y"))?.date();
    let time = match time_text {
        Some(t) => parse_clock_time(t)?,
        None => chrono::NaiveTime::from_hms_opt(0, 0, 0)
            .ok_or_else(|| ParseError::MalformedDate(date_text.to_string()))?,
    };
    Ok(date.and_time(time))
}
