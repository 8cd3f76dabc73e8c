//! Reconciliation engine: statement import, shift matching and totals
//!
//! The engine owns the transaction store and orchestrates a statement
//! import as parse, validate, replace the statement's batch, then match the
//! fresh orphans to shifts. Shifts belong to the application shell and are
//! passed in by reference.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::shifts::{
    migrate_legacy_toll_attachments, narrowest_containing, shift_windows, MigrationReport,
};
use crate::statement::category::{self, EarningsTotals};
use crate::statement::layout::StatementDocument;
use crate::statement::parser::{ParsedStatement, StatementParser};
use crate::tolls::{TollImportReport, TollMatcher};
use crate::traits::*;
use crate::types::*;

/// Outcome of importing one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementImportReport {
    /// `None` when the document was empty and nothing was imported
    pub batch_tag: Option<String>,
    pub parsed: usize,
    pub failed: usize,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Transactions now stored for the batch
    pub stored: usize,
    /// Stored transactions matched to a shift
    pub assigned: usize,
    /// Shifts that held batch transactions before the import or hold them now
    pub updated_shift_ids: Vec<Uuid>,
}

impl StatementImportReport {
    pub fn orphaned(&self) -> usize {
        self.stored - self.assigned
    }
}

/// Outcome of matching stored orphans to shifts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RematchReport {
    pub assigned: usize,
    pub updated_shift_ids: Vec<Uuid>,
}

/// Main reconciliation system that coordinates parsing, storage and shift matching
pub struct ReconciliationEngine<S: TransactionStorage> {
    storage: S,
    parser: StatementParser,
    config: ReconcileConfig,
    validator: Box<dyn TransactionValidator>,
}

impl<S: TransactionStorage> ReconciliationEngine<S> {
    /// Create a new engine with the given storage backend and default settings
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, ReconcileConfig::default())
    }

    /// Create a new engine with custom settings
    pub fn with_config(storage: S, config: ReconcileConfig) -> Self {
        Self {
            storage,
            parser: StatementParser::new(config.clone()),
            config,
            validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Replace the validator run on every parsed transaction
    pub fn with_validator(mut self, validator: Box<dyn TransactionValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Parse a statement without touching the store
    pub fn parse_statement(&self, document: &StatementDocument) -> ParseResult<ParsedStatement> {
        self.parser.parse(document)
    }

    /// Import a statement, replacing any earlier import of the same period.
    ///
    /// The store is only mutated after the whole document parsed, so a fatal
    /// layout error leaves it untouched. Re-importing the same statement
    /// yields the same transactions and assignments.
    pub async fn import_statement(
        &mut self,
        document: &StatementDocument,
        shifts: &[Shift],
    ) -> ReconcileResult<StatementImportReport> {
        let parsed = self.parser.parse(document)?;
        let Some(batch_tag) = parsed.batch_tag() else {
            return Ok(StatementImportReport::default());
        };

        let mut diagnostics = parsed.diagnostics;
        let mut accepted = Vec::with_capacity(parsed.transactions.len());
        for (transaction, (page, row)) in parsed.transactions.into_iter().zip(parsed.origins) {
            match self.validator.validate_transaction(&transaction) {
                Ok(()) => accepted.push(transaction),
                Err(error) => {
                    warn!(batch = %batch_tag, page, row, %error, "rejected parsed transaction");
                    diagnostics.push(RowDiagnostic {
                        page: Some(page),
                        row,
                        row_text: transaction.event_type,
                        error,
                    });
                }
            }
        }
        let parsed_count = accepted.len();

        let before = self.storage.affected_shift_ids(&batch_tag).await?;
        let stored = self
            .storage
            .replace_source_batch(&batch_tag, accepted)
            .await?;
        let assigned = self.assign_to_shifts(&stored, shifts).await?;

        let updated_shift_ids: BTreeSet<Uuid> =
            before.into_iter().chain(assigned.keys().copied()).collect();
        let report = StatementImportReport {
            batch_tag: Some(batch_tag),
            parsed: parsed_count,
            failed: diagnostics.len(),
            diagnostics,
            stored: stored.len(),
            assigned: assigned.values().sum(),
            updated_shift_ids: updated_shift_ids.into_iter().collect(),
        };

        info!(
            batch = ?report.batch_tag,
            parsed = report.parsed,
            failed = report.failed,
            assigned = report.assigned,
            shifts = report.updated_shift_ids.len(),
            "statement imported"
        );
        Ok(report)
    }

    /// Match stored orphans, optionally limited to a `transaction_date` range, to shifts
    pub async fn rematch_orphans(
        &mut self,
        shifts: &[Shift],
        range: Option<DateRange>,
    ) -> ReconcileResult<RematchReport> {
        let orphans = self.storage.orphans(range).await?;
        let assigned = self.assign_to_shifts(&orphans, shifts).await?;

        Ok(RematchReport {
            assigned: assigned.values().sum(),
            updated_shift_ids: assigned.into_keys().collect(),
        })
    }

    /// Remove every transaction of a statement, returning the shifts that lost transactions
    pub async fn remove_statement(&mut self, batch_tag: &str) -> ReconcileResult<Vec<Uuid>> {
        let affected = self.storage.affected_shift_ids(batch_tag).await?;
        let tag = batch_tag.to_string();
        let removed = self
            .storage
            .delete_where(&move |t: &Transaction| t.source_batch == tag)
            .await?;
        info!(batch = batch_tag, removed, "statement removed");
        Ok(affected)
    }

    /// Statement periods currently imported
    pub async fn statement_periods(&self) -> ReconcileResult<Vec<String>> {
        Ok(self.storage.statement_periods().await?)
    }

    /// Earnings totals over stored transactions, optionally limited to a range
    pub async fn totals(&self, range: Option<DateRange>) -> ReconcileResult<EarningsTotals> {
        let transactions = self.storage.all().await?;
        Ok(category::totals(&transactions, range))
    }

    /// Import a toll CSV against the given shifts with this engine's settings
    pub fn import_tolls(
        &self,
        csv_text: &str,
        shifts: &mut [Shift],
        renderer: &dyn TollSummaryRenderer,
    ) -> ReconcileResult<TollImportReport> {
        TollMatcher::new(self.config.clone()).import_csv(csv_text, shifts, renderer)
    }

    /// Run the one-time legacy toll summary migration
    pub fn migrate_legacy_attachments(
        &self,
        shifts: &mut [Shift],
        flags: &mut dyn MigrationFlagStore,
    ) -> MigrationReport {
        migrate_legacy_toll_attachments(shifts, flags, &self.config)
    }

    /// Assign transactions to the narrowest shift containing their date.
    ///
    /// Returns the number of transactions assigned per shift.
    async fn assign_to_shifts(
        &mut self,
        transactions: &[Transaction],
        shifts: &[Shift],
    ) -> ReconcileResult<BTreeMap<Uuid, usize>> {
        let windows = shift_windows(shifts, &self.config);
        let mut by_shift: BTreeMap<Uuid, Vec<Uuid>> = BTreeMap::new();

        for transaction in transactions {
            if let Some(window) = narrowest_containing(&windows, transaction.transaction_date) {
                by_shift
                    .entry(window.shift_id)
                    .or_default()
                    .push(transaction.id);
            }
        }

        let mut assigned = BTreeMap::new();
        for (shift_id, ids) in by_shift {
            let count = self.storage.assign(&ids, shift_id).await?;
            debug!(shift = %shift_id, count, "transactions assigned");
            assigned.insert(shift_id, count);
        }
        Ok(assigned)
    }
}
