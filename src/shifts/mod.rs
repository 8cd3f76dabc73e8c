//! Shift windows and shift-side attachment handling
//!
//! Both toll charges and statement transactions are matched to shifts by
//! timestamp. A shift covers `[start_date, effective_end]` inclusive, where
//! the effective end is the recorded end date or, for a shift still open,
//! the start plus the configured fallback window.

pub mod attachments;
pub mod migration;

pub use attachments::*;
pub use migration::*;

use chrono::{Duration, NaiveDateTime};
use std::cmp::Reverse;
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::types::Shift;

/// Matching window of a single shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub shift_id: Uuid,
    pub start: NaiveDateTime,
    /// Inclusive end of the window
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    /// Build the window for a shift, falling back to `open_window` when it has no end date
    pub fn for_shift(shift: &Shift, open_window: Duration) -> Self {
        Self {
            shift_id: shift.id,
            start: shift.start_date,
            end: effective_end(shift, open_window),
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn width(&self) -> Duration {
        self.end - self.start
    }
}

/// End date of a shift, or `start_date + open_window` while it is still open
pub fn effective_end(shift: &Shift, open_window: Duration) -> NaiveDateTime {
    shift
        .end_date
        .unwrap_or_else(|| shift.start_date + open_window)
}

/// Windows for every shift, in the order given
pub fn shift_windows(shifts: &[Shift], config: &ReconcileConfig) -> Vec<ShiftWindow> {
    let open_window = config.open_shift_window();
    shifts
        .iter()
        .map(|shift| ShiftWindow::for_shift(shift, open_window))
        .collect()
}

/// The window that should own a timestamp when several contain it.
///
/// Narrowest window wins; equal widths go to the latest start, then the
/// lowest shift id, so the choice never depends on input order.
pub fn narrowest_containing(windows: &[ShiftWindow], at: NaiveDateTime) -> Option<&ShiftWindow> {
    windows
        .iter()
        .filter(|window| window.contains(at))
        .min_by_key(|window| (window.width(), Reverse(window.start), window.shift_id))
}
