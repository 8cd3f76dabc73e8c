//! Tunable parameters for statement parsing and toll matching.
//!
//! Every field has a default, so the application shell only needs to
//! override what differs for its statements.

use serde::Deserialize;

/// Default vertical band (in page units) for grouping fragments into one visual row.
pub const DEFAULT_ROW_TOLERANCE: f32 = 3.0;

/// Default window length for shifts that have no end date yet.
pub const DEFAULT_OPEN_SHIFT_WINDOW_HOURS: i64 = 12;

/// Phrase every generated toll summary description starts with.
pub const DEFAULT_TOLL_SUMMARY_MARKER: &str = "Toll Summary";

/// Persisted flag guarding the one-time legacy toll attachment migration.
pub const DEFAULT_MIGRATION_FLAG_KEY: &str = "migrated_legacy_toll_summaries";

/// Settings shared by the parser, the reconciliation engine and the toll matcher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Fragments whose vertical coordinates differ by at most this much
    /// belong to the same visual row.
    pub row_tolerance: f32,

    /// Effective window of an open shift, measured from its start.
    pub open_shift_window_hours: i64,

    /// Marker phrase at the start of generated toll summaries.
    pub toll_summary_marker: String,

    /// Key of the persisted migration flag.
    pub migration_flag_key: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            open_shift_window_hours: DEFAULT_OPEN_SHIFT_WINDOW_HOURS,
            toll_summary_marker: DEFAULT_TOLL_SUMMARY_MARKER.to_string(),
            migration_flag_key: DEFAULT_MIGRATION_FLAG_KEY.to_string(),
        }
    }
}

impl ReconcileConfig {
    pub fn open_shift_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.open_shift_window_hours)
    }
}
