//! Assignment of toll charges to shifts

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::shifts::{narrowest_containing, replace_system_attachment, shift_windows};
use crate::tolls::reader::parse_toll_csv;
use crate::tolls::summary::TollSummary;
use crate::traits::TollSummaryRenderer;
use crate::types::*;

/// What a toll import changed on one shift
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftTollUpdate {
    pub shift_id: Uuid,
    /// New value of `Shift::tolls`
    pub total: BigDecimal,
    pub charges: Vec<TollCharge>,
    /// Newly attached summary, `None` when rendering failed
    pub attachment: Option<ImageAttachment>,
    /// Summaries taken off the shift; the caller deletes the files
    pub removed_attachments: Vec<ImageAttachment>,
    pub render_error: Option<RenderError>,
}

/// Outcome of importing a toll CSV against a set of shifts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TollImportReport {
    pub parsed: usize,
    pub failed: usize,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Shifts that received at least one charge, in input order
    pub updated: Vec<ShiftTollUpdate>,
    /// Charges no shift window contains
    pub unmatched: Vec<TollCharge>,
}

impl TollImportReport {
    pub fn updated_shift_ids(&self) -> Vec<Uuid> {
        self.updated.iter().map(|u| u.shift_id).collect()
    }
}

/// Charges grouped by owning shift
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TollAssignment {
    pub by_shift: HashMap<Uuid, Vec<TollCharge>>,
    pub unmatched: Vec<TollCharge>,
}

/// Matches toll charges to shift windows and refreshes shift toll totals
#[derive(Debug, Clone, Default)]
pub struct TollMatcher {
    config: ReconcileConfig,
}

impl TollMatcher {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Give each charge to the narrowest shift window containing it
    pub fn match_charges(&self, charges: Vec<TollCharge>, shifts: &[Shift]) -> TollAssignment {
        let windows = shift_windows(shifts, &self.config);
        let mut assignment = TollAssignment::default();

        for charge in charges {
            match narrowest_containing(&windows, charge.date) {
                Some(window) => assignment
                    .by_shift
                    .entry(window.shift_id)
                    .or_default()
                    .push(charge),
                None => {
                    warn!(date = %charge.date, location = %charge.location, "toll charge matches no shift");
                    assignment.unmatched.push(charge);
                }
            }
        }

        assignment
    }

    /// Overwrite `tolls` and regenerate the summary on every shift with charges.
    ///
    /// Shifts without charges are not touched. When the renderer fails the
    /// total is still written and the previous summary stays attached.
    pub fn apply(
        &self,
        mut assignment: TollAssignment,
        shifts: &mut [Shift],
        renderer: &dyn TollSummaryRenderer,
    ) -> Vec<ShiftTollUpdate> {
        let mut updates = Vec::new();

        for shift in shifts.iter_mut() {
            let Some(charges) = assignment.by_shift.remove(&shift.id) else {
                continue;
            };
            let summary = TollSummary::new(self.config.toll_summary_marker.clone(), charges);
            shift.tolls = Some(summary.total.clone());

            let (attachment, removed_attachments, render_error) =
                match renderer.render(shift, &summary) {
                    Ok(mut attachment) => {
                        attachment.attachment_type = AttachmentType::ImportedTollSummary;
                        let removed = replace_system_attachment(shift, attachment.clone());
                        (Some(attachment), removed, None)
                    }
                    Err(error) => {
                        warn!(shift = %shift.id, %error, "toll summary rendering failed");
                        (None, Vec::new(), Some(error))
                    }
                };

            debug!(shift = %shift.id, total = %summary.total, charges = summary.charges.len(), "shift tolls updated");
            updates.push(ShiftTollUpdate {
                shift_id: shift.id,
                total: summary.total,
                charges: summary.charges,
                attachment,
                removed_attachments,
                render_error,
            });
        }

        updates
    }

    /// Parse a toll CSV, match its charges and update the shifts
    pub fn import_csv(
        &self,
        csv_text: &str,
        shifts: &mut [Shift],
        renderer: &dyn TollSummaryRenderer,
    ) -> ReconcileResult<TollImportReport> {
        let parsed = parse_toll_csv(csv_text)?;
        let (parsed_count, failed_count) = (parsed.parsed_count(), parsed.failed_count());

        let mut assignment = self.match_charges(parsed.charges, shifts);
        let unmatched = std::mem::take(&mut assignment.unmatched);
        let updated = self.apply(assignment, shifts, renderer);

        info!(
            parsed = parsed_count,
            failed = failed_count,
            updated = updated.len(),
            unmatched = unmatched.len(),
            "toll import complete"
        );

        Ok(TollImportReport {
            parsed: parsed_count,
            failed: failed_count,
            diagnostics: parsed.diagnostics,
            updated,
            unmatched,
        })
    }
}
