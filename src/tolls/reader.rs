//! Toll-authority CSV exports
//!
//! Exports carry a transaction date/time, a location, a plate and an amount.
//! Some include a header row, some don't; some wrap cells in spreadsheet
//! formulas. Charges are usually exported as negatives; the reader keeps the
//! magnitude.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::statement::normalize::{clean_amount, clean_date};
use crate::types::*;

/// Column positions of the fields a charge is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TollColumns {
    date: usize,
    location: Option<usize>,
    plate: Option<usize>,
    amount: usize,
}

impl TollColumns {
    /// Order used by exports without a header row
    const POSITIONAL: Self = Self {
        date: 0,
        location: Some(1),
        plate: Some(2),
        amount: 3,
    };

    fn from_header(record: &StringRecord) -> Option<Self> {
        let (mut date, mut location, mut plate, mut amount) = (None, None, None, None);

        for (i, field) in record.iter().enumerate() {
            let name = field.to_lowercase();
            if name.contains("amount") {
                amount.get_or_insert(i);
            } else if name.contains("plate") || name.contains("tag") {
                plate.get_or_insert(i);
            } else if name.contains("date") || name.contains("time") {
                date.get_or_insert(i);
            } else if ["location", "plaza", "description", "facility"]
                .iter()
                .any(|k| name.contains(k))
            {
                location.get_or_insert(i);
            }
        }

        Some(Self {
            date: date?,
            location,
            plate,
            amount: amount?,
        })
    }

    fn looks_like_data(record: &StringRecord) -> bool {
        record.len() >= 4
            && clean_date(&record[0], None).is_ok()
            && clean_amount(&record[3]).is_ok()
    }

    /// Positional row with at least one readable date or amount cell
    fn looks_like_bad_data(record: &StringRecord) -> bool {
        record.len() >= 4
            && (clean_date(&record[0], None).is_ok() || clean_amount(&record[3]).is_ok())
    }

    fn charge(&self, record: &StringRecord) -> ParseResult<TollCharge> {
        let cell = |i: usize| record.get(i).unwrap_or("");
        let date_text = record.get(self.date).ok_or_else(|| missing(record, "date"))?;
        let amount_text = record
            .get(self.amount)
            .ok_or_else(|| missing(record, "amount"))?;

        Ok(TollCharge {
            date: clean_date(date_text, None)?,
            location: self.location.map(cell).unwrap_or_default().to_string(),
            plate: self.plate.map(cell).unwrap_or_default().to_string(),
            amount: clean_amount(amount_text)?.abs(),
        })
    }
}

fn missing(record: &StringRecord, column: &str) -> ParseError {
    ParseError::RowParseFailure {
        row: row_text(record),
        reason: format!("missing {column} column"),
    }
}

fn row_text(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

/// Charges read from a toll CSV plus the rows that could not be read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTollCsv {
    pub charges: Vec<TollCharge>,
    pub diagnostics: Vec<RowDiagnostic>,
}

impl ParsedTollCsv {
    pub fn parsed_count(&self) -> usize {
        self.charges.len()
    }

    pub fn failed_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Read toll charges from CSV text.
///
/// Empty input yields an empty result. A first record that is neither a
/// recognizable header nor shaped like a positional data row is an
/// [`ParseError::UnrecognizedLayout`].
/// Bad data rows become diagnostics and never abort the read.
pub fn parse_toll_csv(text: &str) -> ReconcileResult<ParsedTollCsv> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let mut parsed = ParsedTollCsv::default();
    let mut columns: Option<TollColumns> = None;

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let layout = match columns {
            Some(layout) => layout,
            None => {
                if TollColumns::looks_like_data(&record) {
                    debug!("toll CSV has no header row, using positional columns");
                    columns = Some(TollColumns::POSITIONAL);
                    TollColumns::POSITIONAL
                } else if let Some(layout) = TollColumns::from_header(&record) {
                    debug!(?layout, "toll CSV header detected");
                    columns = Some(layout);
                    continue;
                } else if TollColumns::looks_like_bad_data(&record) {
                    debug!("toll CSV starts with an unreadable data row, using positional columns");
                    columns = Some(TollColumns::POSITIONAL);
                    TollColumns::POSITIONAL
                } else {
                    return Err(ParseError::UnrecognizedLayout(format!(
                        "toll CSV header not recognized: {}",
                        row_text(&record)
                    ))
                    .into());
                }
            }
        };

        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);
        match layout.charge(&record) {
            Ok(charge) => parsed.charges.push(charge),
            Err(error) => {
                warn!(row, %error, "skipping toll CSV row");
                parsed.diagnostics.push(RowDiagnostic {
                    page: None,
                    row,
                    row_text: row_text(&record),
                    error,
                });
            }
        }
    }

    Ok(parsed)
}
