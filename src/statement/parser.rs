//! Statement parser: positioned page text to transaction records
//!
//! Each page is grouped into visual rows, every row is classified into a
//! [`RowKind`], and a small state machine folds the rows into transactions:
//!
//! 1. a leading row (date, time, description, amount cells) opens a transaction
//! 2. an event-stamp row directly beneath it supplies the event date; its
//!    amounts are the restated balance and are never read
//! 3. continuation rows append their text to the description verbatim
//!
//! A row that cannot be parsed is reported as a [`RowDiagnostic`] and its
//! continuation rows are skipped; the rest of the statement still parses.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::config::ReconcileConfig;
use crate::statement::category::{categorize, Category};
use crate::statement::layout::{
    detect_layout, find_statement_period, group_rows, is_column_header, AmountColumn,
    ColumnLayout, LayoutKind, StatementDocument, TextFragment, VisualRow,
};
use crate::statement::normalize::{
    clean_amount, looks_like_amount, parse_clock_time, parse_month_day,
    parse_statement_timestamp,
};
use crate::types::*;

/// Role of a visual row inside the transaction table
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// Date/time pair followed by description text and amount cells
    Leading {
        date: String,
        time: String,
        cells: Vec<TextFragment>,
    },
    /// Date/time pair followed only by amounts (or nothing)
    EventStamp { date: String, time: String },
    /// Free text that may extend the open transaction's description
    Continuation,
    /// Column headers and page footers
    Ignored,
}

/// Classify a visual row by its leading fragments
pub fn classify_row(row: &VisualRow) -> RowKind {
    if is_column_header(row) || row.is_page_footer() {
        return RowKind::Ignored;
    }

    let Some((date, time, consumed)) = split_timestamp(&row.fragments) else {
        return RowKind::Continuation;
    };

    let cells: Vec<TextFragment> = row.fragments[consumed..].to_vec();
    if cells.iter().all(|cell| looks_like_amount(&cell.text)) {
        RowKind::EventStamp { date, time }
    } else {
        RowKind::Leading { date, time, cells }
    }
}

/// Split a leading `Oct 19` + `7:49 PM` pair (two fragments, or one combined fragment)
fn split_timestamp(fragments: &[TextFragment]) -> Option<(String, String, usize)> {
    let first = fragments.first()?.text.trim();

    if let Some(second) = fragments.get(1) {
        let second = second.text.trim();
        if parse_month_day(first).is_ok() && parse_clock_time(second).is_ok() {
            return Some((first.to_string(), second.to_string(), 2));
        }
    }

    let tokens: Vec<&str> = first.split_whitespace().collect();
    if tokens.len() >= 3 {
        let date = tokens[..2].join(" ");
        let time = tokens[2..].join(" ");
        if parse_month_day(&date).is_ok() && parse_clock_time(&time).is_ok() {
            return Some((date, time, 1));
        }
    }

    None
}

/// Output of parsing one statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedStatement {
    /// `None` only for an empty document
    pub period: Option<StatementPeriod>,
    pub layout: Option<LayoutKind>,
    pub transactions: Vec<Transaction>,
    /// `(page, row)` of each transaction's leading row, parallel to `transactions`
    pub origins: Vec<(usize, usize)>,
    pub diagnostics: Vec<RowDiagnostic>,
}

impl ParsedStatement {
    fn close(&mut self, draft: Draft) {
        self.transactions.push(draft.transaction);
        self.origins.push(draft.origin);
    }

    pub fn batch_tag(&self) -> Option<String> {
        self.period.map(|p| p.batch_tag())
    }

    pub fn parsed_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn failed_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Transaction being assembled from its visual rows
#[derive(Debug)]
struct Draft {
    transaction: Transaction,
    /// x of the leading row's first fragment; text starting there ends the transaction
    date_column_x: f32,
    rows_seen: usize,
    origin: (usize, usize),
}

#[derive(Debug)]
enum ParserState {
    Idle,
    Open(Draft),
    /// Discarding continuation rows of a failed transaction
    Skipping,
}

/// Statement parser for ride-platform weekly statements
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    config: ReconcileConfig,
}

impl StatementParser {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Parse a whole statement.
    ///
    /// Fails only when the statement period or the column header cannot be
    /// found; row-level problems are collected in `diagnostics`.
    pub fn parse(&self, document: &StatementDocument) -> ParseResult<ParsedStatement> {
        if document.is_empty() {
            debug!("empty statement document");
            return Ok(ParsedStatement::default());
        }

        let pages: Vec<Vec<VisualRow>> = document
            .pages
            .iter()
            .map(|page| group_rows(page, self.config.row_tolerance))
            .collect();

        let period = find_statement_period(pages.iter().flatten())?;
        let layout = detect_layout(pages.iter().flatten())?;
        let batch_tag = period.batch_tag();
        debug!(batch = %batch_tag, layout = ?layout.kind, "statement layout detected");

        let mut parsed = ParsedStatement {
            period: Some(period),
            layout: Some(layout.kind),
            ..Default::default()
        };

        for (page_index, rows) in pages.iter().enumerate() {
            let mut state = ParserState::Idle;

            for (row_index, row) in rows.iter().enumerate() {
                state = self.step(
                    state,
                    row,
                    (page_index, row_index),
                    &layout,
                    &period,
                    &batch_tag,
                    &mut parsed,
                );
            }

            // A page break closes any open transaction
            if let ParserState::Open(draft) = state {
                parsed.close(draft);
            }
        }

        info!(
            batch = %batch_tag,
            parsed = parsed.parsed_count(),
            failed = parsed.failed_count(),
            total = %sum_amounts(&parsed.transactions),
            "statement parsed"
        );

        Ok(parsed)
    }

    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        state: ParserState,
        row: &VisualRow,
        (page, row_index): (usize, usize),
        layout: &ColumnLayout,
        period: &StatementPeriod,
        batch_tag: &str,
        parsed: &mut ParsedStatement,
    ) -> ParserState {
        match classify_row(row) {
            RowKind::Leading { date, time, cells } => {
                if let ParserState::Open(draft) = state {
                    parsed.close(draft);
                }

                match self.parse_leading_row(&date, &time, &cells, layout, period.anchor(), batch_tag)
                {
                    Ok(transaction) => ParserState::Open(Draft {
                        transaction,
                        date_column_x: row.fragments.first().map(|f| f.x).unwrap_or_default(),
                        rows_seen: 1,
                        origin: (page, row_index),
                    }),
                    Err(error) => {
                        warn!(page, row = row_index, %error, "statement row failed to parse");
                        parsed.diagnostics.push(RowDiagnostic {
                            page: Some(page),
                            row: row_index,
                            row_text: row.text(),
                            error,
                        });
                        ParserState::Skipping
                    }
                }
            }
            RowKind::EventStamp { date, time } => match state {
                ParserState::Open(mut draft) if draft.rows_seen == 1 => {
                    match parse_statement_timestamp(&date, &time, period.anchor()) {
                        Ok(event_date) => draft.transaction.event_date = Some(event_date),
                        Err(error) => debug!(page, row = row_index, %error, "unreadable event date"),
                    }
                    draft.rows_seen += 1;
                    ParserState::Open(draft)
                }
                other => {
                    debug!(page, row = row_index, "event stamp outside a transaction ignored");
                    other
                }
            },
            RowKind::Continuation => match state {
                ParserState::Open(mut draft) => {
                    let starts_in_date_column = row
                        .fragments
                        .first()
                        .is_some_and(|f| f.x <= draft.date_column_x + self.config.row_tolerance);

                    if starts_in_date_column {
                        debug!(page, row = row_index, text = %row.text(), "non-table row closes transaction");
                        parsed.close(draft);
                        ParserState::Idle
                    } else {
                        draft.transaction.event_type.push(' ');
                        draft.transaction.event_type.push_str(&row.text());
                        draft.rows_seen += 1;
                        ParserState::Open(draft)
                    }
                }
                ParserState::Idle => {
                    debug!(page, row = row_index, text = %row.text(), "text outside a transaction ignored");
                    ParserState::Idle
                }
                ParserState::Skipping => ParserState::Skipping,
            },
            RowKind::Ignored => {
                if is_column_header(row) {
                    if let ParserState::Open(draft) = state {
                        parsed.close(draft);
                    }
                    ParserState::Idle
                } else {
                    state
                }
            }
        }
    }

    fn parse_leading_row(
        &self,
        date: &str,
        time: &str,
        cells: &[TextFragment],
        layout: &ColumnLayout,
        anchor: NaiveDate,
        batch_tag: &str,
    ) -> ParseResult<Transaction> {
        let row_text = || {
            let mut parts = vec![date.to_string(), time.to_string()];
            parts.extend(cells.iter().map(|c| c.text.clone()));
            parts.join(" ")
        };

        let transaction_date: NaiveDateTime = parse_statement_timestamp(date, time, anchor)?;

        let amount_start = cells
            .iter()
            .rposition(|cell| !looks_like_amount(&cell.text))
            .map(|i| i + 1)
            .unwrap_or(0);
        let (description, amount_cells) = cells.split_at(amount_start);

        let event_type = description
            .iter()
            .map(|c| c.text.trim())
            .collect::<Vec<_>>()
            .join(" ");

        let resolved = resolve_amounts(amount_cells, layout).ok_or_else(|| {
            ParseError::RowParseFailure {
                row: row_text(),
                reason: format!(
                    "cannot map {} amount cells onto the {:?} layout",
                    amount_cells.len(),
                    layout.kind
                ),
            }
        })?;

        let amount = clean_amount(&resolved.amount.text)?;
        let category = categorize(&event_type);
        let toll_reimbursement = match (&resolved.toll, category) {
            (Some(cell), Category::NetFare) => Some(clean_amount(&cell.text)?),
            _ => None,
        };

        let mut transaction =
            Transaction::new(transaction_date, event_type, amount, batch_tag.to_string());
        transaction.toll_reimbursement = toll_reimbursement;
        transaction.needs_manual_verification = resolved.used_fallback;

        Ok(transaction)
    }
}

#[derive(Debug)]
struct ResolvedAmounts<'a> {
    amount: &'a TextFragment,
    toll: Option<&'a TextFragment>,
    used_fallback: bool,
}

/// Map a leading row's trailing amount cells onto columns.
///
/// With exactly the layout's number of cells the slots are read right to left
/// (balance, payout, then toll for six columns) and the leftmost cell is the
/// amount. Any other count snaps each cell to the nearest header label.
fn resolve_amounts<'a>(cells: &'a [TextFragment], layout: &ColumnLayout) -> Option<ResolvedAmounts<'a>> {
    let slots = layout.kind.amount_slots();

    if cells.len() == slots {
        let toll = layout
            .kind
            .has_toll_column()
            .then(|| &cells[slots - 3]);
        return Some(ResolvedAmounts {
            amount: &cells[0],
            toll,
            used_fallback: false,
        });
    }

    if cells.is_empty() || layout.anchors.is_empty() {
        return None;
    }

    let closest = |column: AmountColumn| -> Option<&'a TextFragment> {
        let anchor_x = layout
            .anchors
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, x)| *x)?;
        cells
            .iter()
            .filter(|cell| layout.nearest_column(cell.x) == Some(column))
            .min_by(|a, b| (a.x - anchor_x).abs().total_cmp(&(b.x - anchor_x).abs()))
    };

    let amount = closest(AmountColumn::Earnings)?;
    let toll = if layout.kind.has_toll_column() {
        closest(AmountColumn::RefundsExpenses)
    } else {
        None
    };

    Some(ResolvedAmounts {
        amount,
        toll,
        used_fallback: true,
    })
}

/// Sum of the parsed amounts, regardless of category
pub fn sum_amounts(transactions: &[Transaction]) -> BigDecimal {
    transactions.iter().map(|t| &t.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::layout::PageText;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    /// Lay cells out on one line at the given x positions
    fn line(y: f32, cells: &[(&str, f32)]) -> Vec<TextFragment> {
        cells
            .iter()
            .map(|(text, x)| TextFragment::new(*text, *x, y))
            .collect()
    }

    fn six_column_header(y: f32) -> Vec<TextFragment> {
        line(
            y,
            &[
                ("Processed", 10.0),
                ("Event", 120.0),
                ("Earnings", 300.0),
                ("Refunds & Expenses", 360.0),
                ("Payouts", 430.0),
                ("Balance", 500.0),
            ],
        )
    }

    fn five_column_header(y: f32) -> Vec<TextFragment> {
        line(
            y,
            &[
                ("Processed", 10.0),
                ("Event", 120.0),
                ("Earnings", 300.0),
                ("Payouts", 430.0),
                ("Balance", 500.0),
            ],
        )
    }

    fn period_line(y: f32) -> Vec<TextFragment> {
        line(
            y,
            &[
                ("Statement period:", 10.0),
                ("Oct 13, 2025 4 AM - Oct 20, 2025 4 AM", 150.0),
            ],
        )
    }

    fn document(pages: Vec<Vec<Vec<TextFragment>>>) -> StatementDocument {
        StatementDocument::new(
            pages
                .into_iter()
                .map(|lines| PageText::new(lines.into_iter().flatten().collect()))
                .collect(),
        )
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_six_column_ride_row() {
        let doc = document(vec![vec![
            period_line(20.0),
            six_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 19", 10.0),
                    ("7:49 PM", 50.0),
                    ("UberX", 120.0),
                    ("$21.55", 300.0),
                    ("$2.71", 360.0),
                    ("$0.00", 430.0),
                    ("$448.32", 500.0),
                ],
            ),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.layout, Some(LayoutKind::SixColumn));
        assert_eq!(parsed.batch_tag().as_deref(), Some("2025-10-13..2025-10-20"));
        assert_eq!(parsed.transactions.len(), 1);
        let txn = &parsed.transactions[0];
        assert_eq!(txn.event_type, "UberX");
        assert_eq!(txn.amount, dec("21.55"));
        assert_eq!(txn.toll_reimbursement, Some(dec("2.71")));
        assert_eq!(txn.transaction_date, at(2025, 10, 19, 19, 49));
        assert_eq!(categorize(&txn.event_type), Category::NetFare);
        assert!(!txn.needs_manual_verification);
        assert!(txn.is_orphan());
    }

    #[test]
    fn test_event_stamp_row_never_leaks_balance() {
        let doc = document(vec![vec![
            period_line(20.0),
            six_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 19", 10.0),
                    ("7:49 PM", 50.0),
                    ("UberX", 120.0),
                    ("$21.55", 300.0),
                    ("$2.71", 360.0),
                    ("$0.00", 430.0),
                    ("$448.32", 500.0),
                ],
            ),
            line(
                92.0,
                &[("Oct 19", 10.0), ("7:21 PM", 50.0), ("$448.32", 360.0)],
            ),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();
        let txn = &parsed.transactions[0];

        assert_eq!(txn.event_date, Some(at(2025, 10, 19, 19, 21)));
        assert_eq!(txn.toll_reimbursement, Some(dec("2.71")));
        assert_eq!(txn.amount, dec("21.55"));
        assert_eq!(txn.event_type, "UberX");
    }

    #[test]
    fn test_continuation_rows_keep_embedded_amounts_in_description() {
        let doc = document(vec![vec![
            period_line(20.0),
            five_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 18", 10.0),
                    ("4:00 AM", 50.0),
                    ("Quest", 120.0),
                    ("$30.00", 300.0),
                    ("$0.00", 430.0),
                    ("$478.32", 500.0),
                ],
            ),
            line(92.0, &[("Oct 18", 10.0), ("4:00 AM", 50.0), ("$478.32", 500.0)]),
            line(104.0, &[("Complete 40 trips, get", 120.0), ("$30.00", 260.0)]),
            line(116.0, &[("extra (was $25.00)", 120.0)]),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.transactions.len(), 1);
        let txn = &parsed.transactions[0];
        assert_eq!(
            txn.event_type,
            "Quest Complete 40 trips, get $30.00 extra (was $25.00)"
        );
        assert_eq!(txn.amount, dec("30.00"));
        assert_eq!(txn.toll_reimbursement, None);
        assert_eq!(categorize(&txn.event_type), Category::Promotion);
    }

    #[test]
    fn test_continuation_mentioning_balance_stays_in_description() {
        let doc = document(vec![vec![
            period_line(20.0),
            five_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 18", 10.0),
                    ("4:00 AM", 50.0),
                    ("Quest", 120.0),
                    ("$30.00", 300.0),
                    ("$0.00", 430.0),
                    ("$478.32", 500.0),
                ],
            ),
            line(92.0, &[("Bonus earnings added to your balance", 120.0)]),
            line(104.0, &[("after 40 trips", 120.0)]),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(
            parsed.transactions[0].event_type,
            "Quest Bonus earnings added to your balance after 40 trips"
        );
        assert_eq!(parsed.origins, vec![(0, 2)]);
    }

    #[test]
    fn test_page_break_closes_transaction() {
        let doc = document(vec![
            vec![
                period_line(20.0),
                five_column_header(60.0),
                line(
                    80.0,
                    &[
                        ("Oct 18", 10.0),
                        ("4:00 AM", 50.0),
                        ("Quest", 120.0),
                        ("$30.00", 300.0),
                        ("$0.00", 430.0),
                        ("$478.32", 500.0),
                    ],
                ),
            ],
            vec![line(20.0, &[("after 40 trips", 120.0)])],
        ]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.transactions[0].event_type, "Quest");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_five_column_has_no_toll_slot() {
        let doc = document(vec![vec![
            period_line(20.0),
            five_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 19", 10.0),
                    ("7:49 PM", 50.0),
                    ("UberX", 120.0),
                    ("$21.55", 300.0),
                    ("$0.00", 430.0),
                    ("$448.32", 500.0),
                ],
            ),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();
        let txn = &parsed.transactions[0];

        assert_eq!(parsed.layout, Some(LayoutKind::FiveColumn));
        assert_eq!(txn.amount, dec("21.55"));
        assert_eq!(txn.toll_reimbursement, None);
    }

    #[test]
    fn test_missing_cells_fall_back_to_header_positions() {
        let doc = document(vec![vec![
            period_line(20.0),
            six_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 19", 10.0),
                    ("8:02 PM", 50.0),
                    ("Tip", 120.0),
                    ("$5.00", 302.0),
                    ("$453.32", 498.0),
                ],
            ),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();
        let txn = &parsed.transactions[0];

        assert_eq!(txn.amount, dec("5.00"));
        assert_eq!(txn.toll_reimbursement, None);
        assert!(txn.needs_manual_verification);
    }

    #[test]
    fn test_bad_row_does_not_abort_statement() {
        let doc = document(vec![vec![
            period_line(20.0),
            six_column_header(60.0),
            line(
                80.0,
                &[("Feb 30", 10.0), ("7:49 PM", 50.0), ("UberX", 120.0), ("$1.00", 300.0)],
            ),
            line(92.0, &[("orphaned continuation", 120.0)]),
            line(
                104.0,
                &[
                    ("Oct 19", 10.0),
                    ("7:49 PM", 50.0),
                    ("UberX", 120.0),
                    ("$21.55", 300.0),
                    ("$2.71", 360.0),
                    ("$0.00", 430.0),
                    ("$448.32", 500.0),
                ],
            ),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.parsed_count(), 1);
        assert_eq!(parsed.failed_count(), 1);
        assert!(matches!(
            parsed.diagnostics[0].error,
            ParseError::MalformedDate(_)
        ));
        assert_eq!(parsed.transactions[0].event_type, "UberX");
    }

    #[test]
    fn test_row_without_amount_reports_failure() {
        let doc = document(vec![vec![
            period_line(20.0),
            five_column_header(60.0),
            line(80.0, &[("Oct 19", 10.0), ("7:49 PM", 50.0), ("UberX", 120.0)]),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.parsed_count(), 0);
        assert!(matches!(
            parsed.diagnostics[0].error,
            ParseError::RowParseFailure { .. }
        ));
    }

    #[test]
    fn test_totals_line_at_left_margin_closes_transaction() {
        let doc = document(vec![vec![
            period_line(20.0),
            five_column_header(60.0),
            line(
                80.0,
                &[
                    ("Oct 19", 10.0),
                    ("7:49 PM", 50.0),
                    ("UberX", 120.0),
                    ("$21.55", 300.0),
                    ("$0.00", 430.0),
                    ("$448.32", 500.0),
                ],
            ),
            line(100.0, &[("Total earnings", 10.0), ("$21.55", 300.0)]),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.transactions[0].event_type, "UberX");
    }

    #[test]
    fn test_december_rows_in_january_statement() {
        let doc = document(vec![vec![
            line(
                20.0,
                &[("Statement period: Dec 29, 2025 4 AM - Jan 5, 2026 4 AM", 10.0)],
            ),
            five_column_header(60.0),
            line(
                80.0,
                &[
                    ("Dec 31", 10.0),
                    ("11:58 PM", 50.0),
                    ("UberX", 120.0),
                    ("$12.00", 300.0),
                    ("$0.00", 430.0),
                    ("$12.00", 500.0),
                ],
            ),
            line(
                100.0,
                &[
                    ("Jan 1 12:10 AM", 10.0),
                    ("Tip", 120.0),
                    ("$3.00", 300.0),
                    ("$0.00", 430.0),
                    ("$15.00", 500.0),
                ],
            ),
        ]]);

        let parsed = StatementParser::default().parse(&doc).unwrap();

        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.transactions[0].transaction_date, at(2025, 12, 31, 23, 58));
        assert_eq!(parsed.transactions[1].transaction_date, at(2026, 1, 1, 0, 10));
        assert_eq!(sum_amounts(&parsed.transactions), dec("15.00"));
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let doc = document(vec![vec![
            period_line(20.0),
            line(80.0, &[("Oct 19", 10.0), ("7:49 PM", 50.0), ("UberX", 120.0)]),
        ]]);

        assert!(matches!(
            StatementParser::default().parse(&doc),
            Err(ParseError::UnrecognizedLayout(_))
        ));
    }

    #[test]
    fn test_empty_document_is_not_an_error() {
        let parsed = StatementParser::default()
            .parse(&StatementDocument::default())
            .unwrap();
        assert_eq!(parsed.parsed_count(), 0);
        assert!(parsed.period.is_none());
    }

    #[test]
    fn test_classify_rows() {
        let row = |cells: &[(&str, f32)]| VisualRow {
            fragments: line(0.0, cells),
        };

        assert!(matches!(
            classify_row(&row(&[("Oct 19", 10.0), ("7:49 PM", 50.0), ("UberX", 120.0)])),
            RowKind::Leading { .. }
        ));
        assert!(matches!(
            classify_row(&row(&[("Oct 19", 10.0), ("7:49 PM", 50.0), ("$4.00", 500.0)])),
            RowKind::EventStamp { .. }
        ));
        assert_eq!(
            classify_row(&row(&[("Complete 40 trips", 120.0)])),
            RowKind::Continuation
        );
        assert_eq!(classify_row(&row(&[("Page 1 of 3", 10.0)])), RowKind::Ignored);
    }
}
