//! Category lifecycle: create, rename, and delete, with the rename/delete
//! cascade across expense and budget records, plus budget upsert.
//!
//! Each operation takes the current registry, persists the outcome, and
//! returns the new registry so the caller can refresh its own cached state.
//! Cascaded record writes are individual statements with no wrapping
//! transaction: a failure partway leaves earlier writes applied.

use anyhow::{bail, Result};
use rust_decimal::Decimal;

use crate::db::Database;
use crate::models::{Budget, Registry, DEFAULT_ICON, SYSTEM_CATEGORY};

/// Rename `old_name` to `new_name` across the registry, expenses, and
/// budgets.
///
/// When `new_name` is not in the registry this is a pure rename: the entry
/// is replaced at its original position and its icon moves with it. When
/// `new_name` already exists the two merge: `old_name` disappears and
/// `new_name` keeps its own icon. Budgets are relabeled, not merged, so a
/// merge can leave two budgets on the same (category, month) pair.
pub(crate) fn rename(
    db: &Database,
    old_name: &str,
    new_name: &str,
    registry: &Registry,
) -> Result<Registry> {
    if old_name.is_empty() || new_name.is_empty() {
        bail!("Category names cannot be empty");
    }
    if old_name == new_name {
        bail!("New category name is the same as the old one");
    }
    if old_name == SYSTEM_CATEGORY {
        bail!("The '{SYSTEM_CATEGORY}' category cannot be renamed");
    }

    let mut next = registry.clone();
    if registry.contains(new_name) {
        // Merge: old entry disappears, the target keeps its own icon.
        next.categories.retain(|c| c != old_name);
        next.icons.remove(old_name);
    } else {
        for c in &mut next.categories {
            if c == old_name {
                *c = new_name.to_string();
            }
        }
        let icon = next
            .icons
            .remove(old_name)
            .unwrap_or_else(|| DEFAULT_ICON.to_string());
        next.icons.insert(new_name.to_string(), icon);
    }

    db.save_registry(&next)?;

    for expense in db.get_expenses_by_category(old_name)? {
        db.update_expense_category(&expense.id, new_name)?;
    }
    for budget in db.get_budgets_by_category(old_name)? {
        db.update_budget_category(&budget.id, new_name)?;
    }

    Ok(next)
}

/// Delete a category: its expenses move to the sentinel, its budgets are
/// removed outright. Deleting the sentinel itself is a no-op.
pub(crate) fn delete(db: &Database, name: &str, registry: &Registry) -> Result<Registry> {
    if name == SYSTEM_CATEGORY {
        return Ok(registry.clone());
    }

    let mut next = registry.clone();
    next.categories.retain(|c| c != name);
    next.icons.remove(name);

    for expense in db.get_expenses_by_category(name)? {
        db.update_expense_category(&expense.id, SYSTEM_CATEGORY)?;
    }
    for budget in db.get_budgets_by_category(name)? {
        db.delete_budget(&budget.id)?;
    }

    db.save_registry(&next)?;
    Ok(next)
}

/// Append a new category with an icon. A name that already exists is a
/// no-op; no cascade is needed since nothing references a brand-new name.
pub(crate) fn create(db: &Database, name: &str, icon: &str, registry: &Registry) -> Result<Registry> {
    if name.is_empty() {
        bail!("Category name cannot be empty");
    }
    if registry.contains(name) {
        return Ok(registry.clone());
    }

    let mut next = registry.clone();
    next.categories.push(name.to_string());
    next.icons.insert(name.to_string(), icon.to_string());
    db.save_registry(&next)?;
    Ok(next)
}

/// Change the icon of an existing category.
pub(crate) fn set_icon(db: &Database, name: &str, icon: &str, registry: &Registry) -> Result<Registry> {
    let mut next = registry.clone();
    next.icons.insert(name.to_string(), icon.to_string());
    db.save_registry(&next)?;
    Ok(next)
}

/// Set the budget for an exact (category, month) pair: update the limit in
/// place when a record exists, insert a fresh one otherwise. Idempotent on
/// the pair.
pub(crate) fn upsert_budget(
    db: &Database,
    category: &str,
    month_period: &str,
    limit: Decimal,
) -> Result<Budget> {
    if let Some(mut existing) = db.find_budget(category, month_period)? {
        existing.limit_amount = limit;
        existing.updated_at = crate::models::now_rfc3339();
        db.update_budget_limit(&existing.id, limit, &existing.updated_at)?;
        Ok(existing)
    } else {
        let budget = Budget::new(category.to_string(), month_period.to_string(), limit);
        db.insert_budget(&budget)?;
        Ok(budget)
    }
}

#[cfg(test)]
mod tests;
