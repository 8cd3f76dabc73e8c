//! # Rideshare Reconcile
//!
//! A library for turning ride-platform statements and toll-authority exports
//! into reconciled driver records.
//!
//! ## Features
//!
//! - **Statement parsing**: Positioned PDF page text to transactions, for five- and six-column layouts
//! - **Normalization**: Formula-wrapped, currency-decorated amounts and dates, year inference for month/day rows
//! - **Transaction store**: Idempotent replace-by-statement-period with batch and shift indexes
//! - **Shift matching**: Statement rows and toll charges assigned to the narrowest containing shift window
//! - **Toll import**: CSV toll history summed per shift with a regenerated summary attachment
//! - **Earnings totals**: Tips, promotions and net fare buckets with transfers excluded
//! - **Storage abstraction**: Database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use rideshare_reconcile::{ReconciliationEngine, MemoryStorage, StatementDocument};
//!
//! # async fn run() -> rideshare_reconcile::ReconcileResult<()> {
//! let mut engine = ReconciliationEngine::new(MemoryStorage::new());
//! // Page text comes from the shell's PDF text extraction
//! let document = StatementDocument::default();
//! let report = engine.import_statement(&document, &[]).await?;
//! assert_eq!(report.parsed, 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reconciliation;
pub mod shifts;
pub mod statement;
pub mod tolls;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use shifts::*;
pub use statement::*;
pub use tolls::*;
pub use traits::*;
pub use types::*;
pub use utils::*;
