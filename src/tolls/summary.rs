//! Toll summary content and the default text renderer

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::traits::TollSummaryRenderer;
use crate::types::{AttachmentType, ImageAttachment, RenderError, Shift, TollCharge};

/// Charges matched to one shift and their total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollSummary {
    /// Heading; generated descriptions start with it
    pub title: String,
    /// Charges ordered by date
    pub charges: Vec<TollCharge>,
    pub total: BigDecimal,
}

impl TollSummary {
    pub fn new(title: impl Into<String>, mut charges: Vec<TollCharge>) -> Self {
        charges.sort_by(|a, b| a.date.cmp(&b.date));
        let total = charges
            .iter()
            .fold(BigDecimal::from(0), |acc, c| acc + &c.amount);
        Self {
            title: title.into(),
            charges,
            total,
        }
    }

    /// One line per charge followed by the total
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.charges.len() + 2);
        lines.push(self.title.clone());
        for charge in &self.charges {
            lines.push(format!(
                "{}  {}  ${}",
                charge.date.format("%m/%d/%Y %I:%M %p"),
                charge.location,
                cents(&charge.amount)
            ));
        }
        lines.push(format!("Total: ${}", cents(&self.total)));
        lines.join("\n")
    }
}

fn cents(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// Renders the summary as text and references it as a `.txt` artifact.
///
/// Shells that draw an image implement [`TollSummaryRenderer`] themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSummaryRenderer;

impl TollSummaryRenderer for TextSummaryRenderer {
    fn render(&self, shift: &Shift, summary: &TollSummary) -> Result<ImageAttachment, RenderError> {
        if summary.charges.is_empty() {
            return Err(RenderError::Failed(format!(
                "no charges to summarize for shift {}",
                shift.id
            )));
        }
        Ok(ImageAttachment::new(
            AttachmentType::ImportedTollSummary,
            format!("toll-summary-{}.txt", shift.id),
            Some(summary.to_text()),
        ))
    }
}
