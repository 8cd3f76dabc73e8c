//! Core types and data structures for statement reconciliation

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform-sourced earning or adjustment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identity, generated at parse time and preserved across updates
    pub id: Uuid,
    /// Ledger posting timestamp (ordering, search and shift matching)
    pub transaction_date: NaiveDateTime,
    /// Timestamp of the underlying activity, when the statement restates it
    pub event_date: Option<NaiveDateTime>,
    /// Free-text classification, including any multi-line description
    pub event_type: String,
    /// Signed amount in the canonical currency unit
    pub amount: BigDecimal,
    /// Toll reimbursement, only present for six-column statements
    pub toll_reimbursement: Option<BigDecimal>,
    /// Statement period or import file this record came from
    pub source_batch: String,
    /// Shift this transaction was reconciled against; `None` means orphan
    pub shift_id: Option<Uuid>,
    /// Set when parsing fell back to a heuristic
    pub needs_manual_verification: bool,
    /// When the record entered the store
    pub import_date: NaiveDateTime,
}

impl Transaction {
    /// Create a new orphan transaction with a fresh id
    pub fn new(
        transaction_date: NaiveDateTime,
        event_type: String,
        amount: BigDecimal,
        source_batch: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_date,
            event_date: None,
            event_type,
            amount,
            toll_reimbursement: None,
            source_batch,
            shift_id: None,
            needs_manual_verification: false,
            import_date: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.shift_id.is_none()
    }

    /// Key of the logical occurrence this record stands for
    pub fn occurrence_key(&self) -> (String, NaiveDateTime, BigDecimal, String) {
        (
            self.event_type.clone(),
            self.transaction_date,
            self.amount.clone(),
            self.source_batch.clone(),
        )
    }
}

/// Kinds of artifacts attached to a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentType {
    /// User-captured receipt
    Receipt,
    /// User-captured photo (odometer, dashboard, etc.)
    Photo,
    /// Any other user-supplied document
    Document,
    /// Generated summary of imported toll charges
    ImportedTollSummary,
}

impl AttachmentType {
    /// System-generated kinds are replaced silently by import code;
    /// user-generated kinds are never touched
    pub fn is_system_generated(&self) -> bool {
        matches!(self, AttachmentType::ImportedTollSummary)
    }
}

/// Reference to an artifact stored by the application shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub id: Uuid,
    pub attachment_type: AttachmentType,
    /// File name within the shell's artifact storage
    pub file_name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl ImageAttachment {
    pub fn new(
        attachment_type: AttachmentType,
        file_name: String,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            attachment_type,
            file_name,
            description,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Unit of driving activity, owned by the surrounding application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub start_date: NaiveDateTime,
    /// `None` while the shift is still open
    pub end_date: Option<NaiveDateTime>,
    pub start_mileage: Option<f64>,
    pub end_mileage: Option<f64>,
    /// Toll total, overwritten on each toll import for this shift
    pub tolls: Option<BigDecimal>,
    pub image_attachments: Vec<ImageAttachment>,
}

impl Shift {
    /// Create a new shift with no tolls and no attachments
    pub fn new(start_date: NaiveDateTime, end_date: Option<NaiveDateTime>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            start_mileage: None,
            end_mileage: None,
            tolls: None,
            image_attachments: Vec::new(),
        }
    }

    /// Attachments of the given type, in attachment order
    pub fn attachments_of(&self, attachment_type: AttachmentType) -> Vec<&ImageAttachment> {
        self.image_attachments
            .iter()
            .filter(|a| a.attachment_type == attachment_type)
            .collect()
    }
}

/// A single dated toll charge read from a toll-authority export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollCharge {
    pub date: NaiveDateTime,
    pub location: String,
    pub plate: String,
    /// Charge magnitude (always non-negative)
    pub amount: BigDecimal,
}

/// Half-open `[start, end)` range of timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }
}

/// Statement window taken from the "Statement period:" header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl StatementPeriod {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Anchor date used for year inference on month/day rows
    pub fn anchor(&self) -> NaiveDate {
        self.end.date()
    }

    /// Source batch tag identifying this statement, e.g. `2025-10-13..2025-10-20`
    pub fn batch_tag(&self) -> String {
        format!(
            "{}..{}",
            self.start.date().format("%Y-%m-%d"),
            self.end.date().format("%Y-%m-%d")
        )
    }
}

/// Errors raised while normalizing or parsing imported text
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed amount: {0}")]
    MalformedAmount(String),
    #[error("Malformed date: {0}")]
    MalformedDate(String),
    #[error("Unrecognized layout: {0}")]
    UnrecognizedLayout(String),
    #[error("Failed to parse row '{row}': {reason}")]
    RowParseFailure { row: String, reason: String },
}

/// Errors raised by a storage backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors raised while rendering a toll-summary artifact
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Render failed: {0}")]
    Failed(String),
}

/// Errors surfaced by import and reconciliation entry points
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A row-level failure collected during an import
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    /// Zero-based page index for statements, `None` for CSV imports
    pub page: Option<usize>,
    /// One-based record number for CSV imports, visual row index for statements
    pub row: usize,
    pub row_text: String,
    pub error: ParseError,
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
