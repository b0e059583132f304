use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    Cash,
    Transfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::Cash => "Cash",
            Self::Transfer => "Transfer",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "card" | "credit" | "debit" => Self::Card,
            "cash" => Self::Cash,
            "transfer" | "bank transfer" => Self::Transfer,
            _ => Self::Other,
        }
    }

    pub fn all() -> &'static [PaymentMethod] {
        &[Self::Card, Self::Cash, Self::Transfer, Self::Other]
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single logged expense. `category` is a loose reference to the registry
/// by name; the storage layer does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub tags: Vec<String>,
    /// Transaction date, "YYYY-MM-DD".
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub is_tax_deductible: bool,
    /// Receipt image bytes, kept out of JSON backups.
    #[serde(skip)]
    pub receipt: Option<Vec<u8>>,
    /// Object-storage key of a remotely mirrored receipt, carried opaquely.
    pub receipt_key: Option<String>,
}

impl Expense {
    pub fn new(name: String, amount: Decimal, category: String, date: String) -> Self {
        let now = super::now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            amount,
            category,
            tags: Vec::new(),
            date,
            created_at: now.clone(),
            updated_at: now,
            notes: String::new(),
            payment_method: PaymentMethod::Card,
            is_tax_deductible: false,
            receipt: None,
            receipt_key: None,
        }
    }
}
