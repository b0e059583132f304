pub(crate) mod budgets;
pub(crate) mod categories;
pub(crate) mod dashboard;
pub(crate) mod expenses;
