//! Validation utilities

use bigdecimal::BigDecimal;
use chrono::Duration;

use crate::statement::category::{categorize, Category};
use crate::traits::*;
use crate::types::*;

fn invalid(transaction: &Transaction, reason: impl Into<String>) -> ParseError {
    ParseError::RowParseFailure {
        row: transaction.event_type.clone(),
        reason: reason.into(),
    }
}

/// Validate that an event type is usable
pub fn validate_event_type(event_type: &str) -> ParseResult<()> {
    if event_type.trim().is_empty() {
        return Err(ParseError::RowParseFailure {
            row: event_type.to_string(),
            reason: "event type cannot be empty".to_string(),
        });
    }

    if event_type.len() > 2000 {
        return Err(ParseError::RowParseFailure {
            row: event_type.chars().take(80).collect(),
            reason: "event type cannot exceed 2000 characters".to_string(),
        });
    }

    Ok(())
}

/// Validate that a toll reimbursement is only carried by fare rows and is not negative
pub fn validate_toll_reimbursement(transaction: &Transaction) -> ParseResult<()> {
    let Some(toll) = &transaction.toll_reimbursement else {
        return Ok(());
    };

    if categorize(&transaction.event_type) != Category::NetFare {
        return Err(invalid(
            transaction,
            "toll reimbursement on a non-fare transaction",
        ));
    }

    if *toll < BigDecimal::from(0) {
        return Err(invalid(transaction, "toll reimbursement cannot be negative"));
    }

    Ok(())
}

/// Validate that the restated event time is close to the posting time
pub fn validate_event_date(transaction: &Transaction, max_gap: Duration) -> ParseResult<()> {
    match transaction.event_date {
        Some(event_date) if (transaction.transaction_date - event_date).abs() > max_gap => Err(
            invalid(transaction, "event date too far from transaction date"),
        ),
        _ => Ok(()),
    }
}

/// Enhanced transaction validator with detailed checks
pub struct EnhancedTransactionValidator {
    /// Largest accepted distance between event and posting timestamps
    pub max_event_gap: Duration,
}

impl Default for EnhancedTransactionValidator {
    fn default() -> Self {
        Self {
            max_event_gap: Duration::days(7),
        }
    }
}

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> ParseResult<()> {
        // Basic validation
        DefaultTransactionValidator.validate_transaction(transaction)?;

        validate_event_type(&transaction.event_type)?;
        validate_toll_reimbursement(transaction)?;
        validate_event_date(transaction, self.max_event_gap)?;

        Ok(())
    }
}
