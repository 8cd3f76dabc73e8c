//! Attachment bookkeeping on shifts
//!
//! The core never deletes stored artifacts. Every function here that drops
//! an attachment from a shift hands the removed references back so the
//! application shell can delete the underlying files.

use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::types::{AttachmentType, ImageAttachment, Shift};

/// Remove every attachment of the given type, returning the removed ones
pub fn remove_attachments_of(shift: &mut Shift, attachment_type: AttachmentType) -> Vec<ImageAttachment> {
    let (removed, kept): (Vec<_>, Vec<_>) = shift
        .image_attachments
        .drain(..)
        .partition(|a| a.attachment_type == attachment_type);
    shift.image_attachments = kept;
    removed
}

/// Swap in a freshly generated system attachment.
///
/// Existing attachments of the same system-generated type are removed first,
/// so a shift holds at most one of them. User attachment types are never
/// removed; adding one of those is a plain append.
pub fn replace_system_attachment(shift: &mut Shift, attachment: ImageAttachment) -> Vec<ImageAttachment> {
    let removed = if attachment.attachment_type.is_system_generated() {
        remove_attachments_of(shift, attachment.attachment_type)
    } else {
        Vec::new()
    };
    shift.image_attachments.push(attachment);
    removed
}

/// Attachments the user marked for removal but has not saved yet.
///
/// Marking is reversible until [`PendingRemovals::commit`] applies the marks
/// to the shifts and returns the removed references for physical deletion.
#[derive(Debug, Clone, Default)]
pub struct PendingRemovals {
    marked: HashMap<Uuid, HashSet<Uuid>>,
}

impl PendingRemovals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an attachment of a shift for removal
    pub fn mark(&mut self, shift_id: Uuid, attachment_id: Uuid) {
        self.marked.entry(shift_id).or_default().insert(attachment_id);
    }

    /// Undo a mark; returns whether the attachment was marked
    pub fn unmark(&mut self, shift_id: Uuid, attachment_id: Uuid) -> bool {
        let Some(ids) = self.marked.get_mut(&shift_id) else {
            return false;
        };
        let was_marked = ids.remove(&attachment_id);
        if ids.is_empty() {
            self.marked.remove(&shift_id);
        }
        was_marked
    }

    pub fn is_marked(&self, shift_id: Uuid, attachment_id: Uuid) -> bool {
        self.marked
            .get(&shift_id)
            .is_some_and(|ids| ids.contains(&attachment_id))
    }

    pub fn len(&self) -> usize {
        self.marked.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    /// Drop all marks without touching any shift
    pub fn discard(&mut self) {
        self.marked.clear();
    }

    /// Apply the marks for one shift, returning the attachments removed from it
    pub fn commit_shift(&mut self, shift: &mut Shift) -> Vec<ImageAttachment> {
        let Some(ids) = self.marked.remove(&shift.id) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) = shift
            .image_attachments
            .drain(..)
            .partition(|a| ids.contains(&a.id));
        shift.image_attachments = kept;
        debug!(shift = %shift.id, removed = removed.len(), "committed attachment removals");
        removed
    }

    /// Apply all marks to the given shifts.
    ///
    /// Marks for shifts not in `shifts`, or for attachments no longer present,
    /// are dropped silently.
    pub fn commit(&mut self, shifts: &mut [Shift]) -> Vec<ImageAttachment> {
        let mut removed = Vec::new();
        for shift in shifts.iter_mut() {
            removed.extend(self.commit_shift(shift));
        }
        self.marked.clear();
        removed
    }
}
