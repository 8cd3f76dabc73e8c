//! One-time conversion of toll summaries saved as plain receipts
//!
//! Older installations stored the generated toll summary as a `Receipt`.
//! Those attachments are recognized by a description that starts with the
//! summary marker and retyped in place, once per installation.

use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::traits::MigrationFlagStore;
use crate::types::{AttachmentType, ImageAttachment, Shift};

/// Outcome of the legacy toll summary migration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    /// Receipts retyped as toll summaries
    pub converted: usize,
    /// Surplus toll summaries taken off their shift, keyed by shift id
    pub removed: Vec<(Uuid, ImageAttachment)>,
}

/// Retype legacy toll-summary receipts.
///
/// Does nothing when the migration flag is already set; sets it after the
/// first run even if no attachment matched. A shift ends up with at most one
/// toll summary: one that was already system-generated wins, otherwise the
/// newest converted receipt.
pub fn migrate_legacy_toll_attachments<F>(
    shifts: &mut [Shift],
    flags: &mut F,
    config: &ReconcileConfig,
) -> MigrationReport
where
    F: MigrationFlagStore + ?Sized,
{
    let mut report = MigrationReport::default();
    if flags.is_set(&config.migration_flag_key) {
        debug!(key = %config.migration_flag_key, "legacy toll summary migration already done");
        return report;
    }

    for shift in shifts.iter_mut() {
        let existing: HashSet<Uuid> = shift
            .attachments_of(AttachmentType::ImportedTollSummary)
            .iter()
            .map(|a| a.id)
            .collect();

        let mut converted = 0;
        for attachment in shift.image_attachments.iter_mut() {
            let is_legacy_summary = attachment.attachment_type == AttachmentType::Receipt
                && attachment
                    .description
                    .as_deref()
                    .is_some_and(|d| d.starts_with(&config.toll_summary_marker));
            if is_legacy_summary {
                attachment.attachment_type = AttachmentType::ImportedTollSummary;
                converted += 1;
            }
        }
        if converted == 0 {
            continue;
        }
        report.converted += converted;

        let keep = shift
            .image_attachments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.attachment_type == AttachmentType::ImportedTollSummary)
            .max_by_key(|(i, a)| (existing.contains(&a.id), a.created_at, *i))
            .map(|(_, a)| a.id);

        let (surplus, kept): (Vec<_>, Vec<_>) =
            shift.image_attachments.drain(..).partition(|a| {
                a.attachment_type == AttachmentType::ImportedTollSummary && Some(a.id) != keep
            });
        shift.image_attachments = kept;
        if !surplus.is_empty() {
            debug!(shift = %shift.id, removed = surplus.len(), "dropped duplicate toll summaries");
        }
        let shift_id = shift.id;
        report
            .removed
            .extend(surplus.into_iter().map(|a| (shift_id, a)));
    }

    flags.set(&config.migration_flag_key);
    info!(
        converted = report.converted,
        removed = report.removed.len(),
        "migrated legacy toll summary attachments"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageAttachment;
    use crate::utils::MemoryFlagStore;
    use chrono::NaiveDate;

    fn shift_with(attachments: Vec<ImageAttachment>) -> Shift {
        let start = NaiveDate::from_ymd_opt(2025, 10, 19)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut shift = Shift::new(start, None);
        shift.image_attachments = attachments;
        shift
    }

    fn receipt(description: Option<&str>) -> ImageAttachment {
        ImageAttachment::new(
            AttachmentType::Receipt,
            "receipt.png".to_string(),
            description.map(str::to_string),
        )
    }

    #[test]
    fn test_converts_only_marked_receipts() {
        let mut shifts = vec![shift_with(vec![
            receipt(Some("Toll Summary - 2 charges, total $5.00")),
            receipt(Some("Gas station")),
            receipt(Some("Monthly toll summary")),
            receipt(None),
            ImageAttachment::new(
                AttachmentType::Photo,
                "photo.png".to_string(),
                Some("Toll Summary".to_string()),
            ),
        ])];
        let mut flags = MemoryFlagStore::new();

        let report =
            migrate_legacy_toll_attachments(&mut shifts, &mut flags, &ReconcileConfig::default());

        assert_eq!(report.converted, 1);
        assert!(report.removed.is_empty());
        let types: Vec<AttachmentType> = shifts[0]
            .image_attachments
            .iter()
            .map(|a| a.attachment_type)
            .collect();
        assert_eq!(
            types,
            vec![
                AttachmentType::ImportedTollSummary,
                AttachmentType::Receipt,
                AttachmentType::Receipt,
                AttachmentType::Receipt,
                AttachmentType::Photo,
            ]
        );
    }

    #[test]
    fn test_runs_once_per_installation() {
        let config = ReconcileConfig::default();
        let mut flags = MemoryFlagStore::new();
        let mut shifts = vec![shift_with(Vec::new())];

        assert_eq!(
            migrate_legacy_toll_attachments(&mut shifts, &mut flags, &config),
            MigrationReport::default()
        );
        assert!(flags.is_set(&config.migration_flag_key));

        shifts[0]
            .image_attachments
            .push(receipt(Some("Toll Summary for Oct 19")));
        assert_eq!(
            migrate_legacy_toll_attachments(&mut shifts, &mut flags, &config).converted,
            0
        );
        assert_eq!(
            shifts[0].image_attachments[0].attachment_type,
            AttachmentType::Receipt
        );
    }

    #[test]
    fn test_existing_system_summary_wins_over_legacy_receipt() {
        let current = ImageAttachment::new(
            AttachmentType::ImportedTollSummary,
            "toll-summary.txt".to_string(),
            Some("Toll Summary\nTotal: $5.00".to_string()),
        );
        let legacy = receipt(Some("Toll Summary\nTotal: $4.00"));
        let mut shifts = vec![shift_with(vec![current.clone(), legacy.clone()])];
        let shift_id = shifts[0].id;
        let mut flags = MemoryFlagStore::new();

        let report =
            migrate_legacy_toll_attachments(&mut shifts, &mut flags, &ReconcileConfig::default());

        assert_eq!(report.converted, 1);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].0, shift_id);
        assert_eq!(report.removed[0].1.id, legacy.id);
        assert_eq!(
            shifts[0].attachments_of(AttachmentType::ImportedTollSummary),
            vec![&current]
        );
    }

    #[test]
    fn test_several_legacy_receipts_keep_the_newest() {
        let mut older = receipt(Some("Toll Summary\nTotal: $1.00"));
        older.created_at -= chrono::Duration::days(7);
        let newer = receipt(Some("Toll Summary\nTotal: $2.00"));
        let mut shifts = vec![shift_with(vec![newer.clone(), older.clone()])];
        let mut flags = MemoryFlagStore::new();

        let report =
            migrate_legacy_toll_attachments(&mut shifts, &mut flags, &ReconcileConfig::default());

        assert_eq!(report.converted, 2);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].1.id, older.id);
        let summaries = shifts[0].attachments_of(AttachmentType::ImportedTollSummary);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, newer.id);
    }
}
