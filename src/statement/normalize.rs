//! Normalization of loosely formatted amount and date text
//!
//! Statement and toll exports wrap values in spreadsheet formulas, mix
//! currency symbols and print month/day rows without a year. These helpers
//! turn that text into `BigDecimal` and chrono values.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::types::{ParseError, ParseResult};

/// Date-time formats tried after the caller's hint
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%b %d, %Y %I:%M %p",
];

/// Date-only formats; these resolve to midnight
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y"];

const CURRENCY_SYMBOLS: &[&str] = &["US$", "USD", "\u{FF04}", "$"];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn formula_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)^=\s*(?:TEXT\(\s*"(?P<text>[^"]*)"\s*,\s*"[^"]*"\s*\)|"(?P<quoted>[^"]*)")$"#,
        )
        .expect("invalid formula regex")
    })
}

fn month_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<month>[A-Za-z]{3,9})\.?\s+(?P<day>\d{1,2})$")
            .expect("invalid month/day regex")
    })
}

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?\s*(?P<meridiem>[AaPp])\.?[Mm]\.?$")
            .expect("invalid clock regex")
    })
}

/// Month and day printed on a statement row, before a year is inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }
}

/// Strip a `=TEXT("value","fmt")` or `="value"` wrapper, returning the inner value
pub fn unwrap_formula(text: &str) -> &str {
    let trimmed = text.trim();
    match formula_re().captures(trimmed) {
        Some(caps) => caps
            .name("text")
            .or_else(|| caps.name("quoted"))
            .map(|m| m.as_str().trim())
            .unwrap_or(trimmed),
        None => trimmed,
    }
}

/// Parse a currency amount such as `$21.55`, `-$3.00`, `($3.00)` or
/// `=TEXT("$1,234.5678901234567","$0.00")` without losing precision
pub fn clean_amount(text: &str) -> ParseResult<BigDecimal> {
    let mut cleaned = unwrap_formula(text).replace('\u{2212}', "-");
    for symbol in CURRENCY_SYMBOLS {
        cleaned = cleaned.replace(symbol, "");
    }
    cleaned.retain(|c| !c.is_whitespace() && c != ',');

    let (negative, digits) = match cleaned
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };
    let digits = digits.strip_prefix('+').unwrap_or(digits);

    if digits.is_empty()
        || !digits.chars().any(|c| c.is_ascii_digit())
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(ParseError::MalformedAmount(text.trim().to_string()));
    }

    let value = BigDecimal::from_str(digits)
        .map_err(|_| ParseError::MalformedAmount(text.trim().to_string()))?;

    Ok(if negative { -value } else { value })
}

/// Whether a fragment reads as a standalone currency amount
pub fn looks_like_amount(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.contains('$') || trimmed.starts_with('=')) && clean_amount(trimmed).is_ok()
}

/// Parse a date or date-time, trying `format_hint` first and then the known formats
pub fn clean_date(text: &str, format_hint: Option<&str>) -> ParseResult<NaiveDateTime> {
    let value = unwrap_formula(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let hinted = format_hint.into_iter();
    for format in hinted.clone().chain(DATETIME_FORMATS.iter().copied()) {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&value, format) {
            return Ok(parsed);
        }
    }
    for format in hinted.chain(DATE_FORMATS.iter().copied()) {
        if let Some(midnight) = NaiveDate::parse_from_str(&value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(midnight);
        }
    }

    Err(ParseError::MalformedDate(text.trim().to_string()))
}

/// Parse a month/day fragment such as `Oct 19` or `Sept 3`
pub fn parse_month_day(text: &str) -> ParseResult<MonthDay> {
    let malformed = || ParseError::MalformedDate(text.trim().to_string());
    let caps = month_day_re().captures(text.trim()).ok_or_else(malformed)?;

    let month_name = caps["month"].to_ascii_lowercase();
    let month = MONTHS
        .iter()
        .position(|m| month_name.starts_with(m))
        .ok_or_else(malformed)? as u32
        + 1;
    let day: u32 = caps["day"].parse().map_err(|_| malformed())?;

    if !(1..=31).contains(&day) {
        return Err(malformed());
    }

    Ok(MonthDay::new(month, day))
}

/// Parse a 12-hour clock time such as `7:49 PM`, `4 AM` or `11:05pm`
pub fn parse_clock_time(text: &str) -> ParseResult<NaiveTime> {
    let malformed = || ParseError::MalformedDate(text.trim().to_string());
    let caps = clock_re().captures(text.trim()).ok_or_else(malformed)?;

    let hour: u32 = caps["hour"].parse().map_err(|_| malformed())?;
    let minute: u32 = caps
        .name("minute")
        .map(|m| m.as_str().parse::<u32>())
        .transpose()
        .map_err(|_| malformed())?
        .unwrap_or(0);

    if !(1..=12).contains(&hour) {
        return Err(malformed());
    }

    let pm = caps["meridiem"].eq_ignore_ascii_case("p");
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0).ok_or_else(malformed)
}

/// Resolve the year of a month/day row against the statement's end date.
///
/// Rows take the anchor's year, except a row whose month is later than the
/// anchor's month belongs to the previous year (a December row inside a
/// statement that ends in January).
pub fn infer_year(month_day: MonthDay, anchor_end: NaiveDate) -> ParseResult<NaiveDate> {
    let year = if month_day.month > anchor_end.month() {
        anchor_end.year() - 1
    } else {
        anchor_end.year()
    };

    NaiveDate::from_ymd_opt(year, month_day.month, month_day.day).ok_or_else(|| {
        ParseError::MalformedDate(format!(
            "{}/{} does not exist in {}",
            month_day.month, month_day.day, year
        ))
    })
}

/// Combine a statement row's `Oct 19` and `7:49 PM` fragments into a timestamp
pub fn parse_statement_timestamp(
    date_text: &str,
    time_text: &str,
    anchor_end: NaiveDate,
) -> ParseResult<NaiveDateTime> {
    let month_day = parse_month_day(date_text)?;
    let time = parse_clock_time(time_text)?;
    Ok(infer_year(month_day, anchor_end)?.and_time(time))
}
