use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monthly spending limit for one category. Logically unique per
/// (category, month_period) pair via upsert, but deliberately not enforced
/// with a database constraint: the category rename cascade relabels budgets
/// and may land two records on the same pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub limit_amount: Decimal,
    /// Format: "YYYY-MM"
    pub month_period: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Budget {
    pub fn new(category: String, month_period: String, limit_amount: Decimal) -> Self {
        let now = super::now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category,
            limit_amount,
            month_period,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
