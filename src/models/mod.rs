mod budget;
mod category;
mod expense;

pub use budget::Budget;
pub use category::{Registry, DEFAULT_CATEGORIES, DEFAULT_ICON, ICON_SET, SYSTEM_CATEGORY};
pub use expense::{Expense, PaymentMethod};

/// Current wall-clock time as an RFC 3339 string; used for every
/// created/updated timestamp in the data model.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests;
