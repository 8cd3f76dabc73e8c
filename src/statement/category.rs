//! Earnings categories and statement totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{DateRange, Transaction};

/// Earnings bucket a transaction contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Rider tips
    Tip,
    /// Quests and incentives
    Promotion,
    /// Transfers to the driver's bank account; excluded from all totals
    Ignore,
    /// Rides, deliveries and everything else
    NetFare,
}

/// Categorize an event type by its (case-insensitive) prefix
pub fn categorize(event_type: &str) -> Category {
    let text = event_type.trim().to_lowercase();

    if text.contains("transferred") {
        Category::Ignore
    } else if text.starts_with("tip") {
        Category::Tip
    } else if text.starts_with("quest") || text.starts_with("incentive") {
        Category::Promotion
    } else {
        Category::NetFare
    }
}

/// Per-category sums over a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsTotals {
    pub tips: BigDecimal,
    pub promotions: BigDecimal,
    pub net_fare: BigDecimal,
    /// Toll reimbursements, regardless of category
    pub toll_reimbursements: BigDecimal,
    /// Every transaction in range, including ignored ones
    pub count: usize,
}

impl Default for EarningsTotals {
    fn default() -> Self {
        Self {
            tips: BigDecimal::from(0),
            promotions: BigDecimal::from(0),
            net_fare: BigDecimal::from(0),
            toll_reimbursements: BigDecimal::from(0),
            count: 0,
        }
    }
}

impl EarningsTotals {
    /// Tips, promotions and net fare combined
    pub fn earnings(&self) -> BigDecimal {
        &self.tips + &self.promotions + &self.net_fare
    }
}

/// Sum transactions into category buckets, optionally restricted to a
/// half-open `transaction_date` range
pub fn totals<'a, I>(transactions: I, range: Option<DateRange>) -> EarningsTotals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = EarningsTotals::default();

    for transaction in transactions {
        if range.is_some_and(|r| !r.contains(transaction.transaction_date)) {
            continue;
        }

        totals.count += 1;

        match categorize(&transaction.event_type) {
            Category::Tip => totals.tips += &transaction.amount,
            Category::Promotion => totals.promotions += &transaction.amount,
            Category::NetFare => totals.net_fare += &transaction.amount,
            Category::Ignore => continue,
        }

        if let Some(toll) = &transaction.toll_reimbursement {
            totals.toll_reimbursements += toll;
        }
    }

    totals
}
