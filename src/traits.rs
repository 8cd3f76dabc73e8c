//! Traits for storage abstraction and the collaborators the core calls out to

use async_trait::async_trait;
use uuid::Uuid;

use crate::tolls::TollSummary;
use crate::types::*;

/// Storage abstraction for imported transactions
///
/// This trait lets the reconciliation core run against any durable backend
/// (SQLite, a document store, in-memory, etc.). Operations on ids that do not
/// exist are no-ops, never errors; `StoreError` is reserved for backend
/// failures.
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Insert or replace a transaction by id
    async fn save(&mut self, transaction: &Transaction) -> StoreResult<()>;

    /// Insert or replace several transactions as one unit
    async fn save_batch(&mut self, transactions: &[Transaction]) -> StoreResult<()>;

    /// Get a transaction by id
    async fn get(&self, id: Uuid) -> StoreResult<Option<Transaction>>;

    /// All transactions, ordered by transaction date
    async fn all(&self) -> StoreResult<Vec<Transaction>>;

    /// Number of stored transactions
    async fn count(&self) -> StoreResult<usize>;

    /// Assign the given transactions to a shift, returning how many were found
    async fn assign(&mut self, ids: &[Uuid], shift_id: Uuid) -> StoreResult<usize>;

    /// Transactions without a shift, optionally limited to a half-open
    /// `transaction_date` range
    async fn orphans(&self, range: Option<DateRange>) -> StoreResult<Vec<Transaction>>;

    /// Remove every transaction tagged `batch_tag`, then insert `transactions`
    /// stamped with that tag and no shift. Returns the stored records.
    async fn replace_source_batch(
        &mut self,
        batch_tag: &str,
        transactions: Vec<Transaction>,
    ) -> StoreResult<Vec<Transaction>>;

    /// Delete every transaction matching `predicate`, returning how many were removed
    async fn delete_where(
        &mut self,
        predicate: &(dyn for<'t> Fn(&'t Transaction) -> bool + Send + Sync),
    ) -> StoreResult<usize>;

    /// Delete transactions by id, returning how many were removed
    async fn delete_ids(&mut self, ids: &[Uuid]) -> StoreResult<usize>;

    /// Distinct source batch tags currently stored, sorted
    async fn statement_periods(&self) -> StoreResult<Vec<String>>;

    /// Distinct shifts referenced by transactions of `batch_tag`, sorted
    async fn affected_shift_ids(&self, batch_tag: &str) -> StoreResult<Vec<Uuid>>;

    /// Transactions tagged `batch_tag`, ordered by transaction date
    async fn transactions_in_batch(&self, batch_tag: &str) -> StoreResult<Vec<Transaction>>;

    /// Transactions assigned to a shift, ordered by transaction date
    async fn transactions_for_shift(&self, shift_id: Uuid) -> StoreResult<Vec<Transaction>>;
}

/// Trait for implementing custom checks on freshly parsed transactions
pub trait TransactionValidator: Send + Sync {
    /// Validate a parsed transaction before it is committed
    fn validate_transaction(&self, transaction: &Transaction) -> ParseResult<()>;
}

/// Default transaction validator with the minimal import rules
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> ParseResult<()> {
        if transaction.event_type.trim().is_empty() {
            return Err(ParseError::RowParseFailure {
                row: transaction.transaction_date.to_string(),
                reason: "event type cannot be empty".to_string(),
            });
        }

        if transaction.source_batch.trim().is_empty() {
            return Err(ParseError::RowParseFailure {
                row: transaction.event_type.clone(),
                reason: "source batch cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Renders the toll-summary artifact for a shift.
///
/// Encoding and storing the image is the implementor's business; the core
/// only needs the attachment reference back.
pub trait TollSummaryRenderer: Send + Sync {
    fn render(&self, shift: &Shift, summary: &TollSummary) -> Result<ImageAttachment, RenderError>;
}

/// Persisted boolean flags (one-time migrations and the like)
pub trait MigrationFlagStore {
    fn is_set(&self, key: &str) -> bool;

    fn set(&mut self, key: &str);
}
