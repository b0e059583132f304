mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

const CATEGORIES_KEY: &str = "categories";
const ICONS_KEY: &str = "category_icons";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_registry()?;
        db.backfill_expense_timestamps()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_registry()?;
        db.backfill_expense_timestamps()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    /// First run: persist the default category list so the registry settings
    /// rows always exist.
    fn seed_default_registry(&mut self) -> Result<()> {
        if self.get_setting(CATEGORIES_KEY)?.is_none() {
            self.save_registry(&Registry::with_defaults())?;
        }
        Ok(())
    }

    /// Databases migrated from v1 have expenses without created/updated
    /// timestamps; default them to the transaction date.
    fn backfill_expense_timestamps(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "UPDATE expenses SET created_at = date || 'T00:00:00+00:00' WHERE created_at = '';
             UPDATE expenses SET updated_at = created_at WHERE updated_at = '';",
        )?;
        Ok(())
    }

    // ── Settings ──────────────────────────────────────────────

    pub(crate) fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// Deserialize the category registry from its two settings rows.
    pub(crate) fn load_registry(&self) -> Result<Registry> {
        let categories = match self.get_setting(CATEGORIES_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).context("Corrupt category list in settings")?
            }
            None => Registry::with_defaults().categories,
        };
        let icons = match self.get_setting(ICONS_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Corrupt icon map in settings")?,
            None => Default::default(),
        };
        Ok(Registry { categories, icons })
    }

    /// Persist both registry settings rows (list first, then icon map).
    pub(crate) fn save_registry(&self, registry: &Registry) -> Result<()> {
        self.put_setting(CATEGORIES_KEY, &serde_json::to_string(&registry.categories)?)?;
        self.put_setting(ICONS_KEY, &serde_json::to_string(&registry.icons)?)?;
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<()> {
        self.conn.execute(
            "INSERT INTO expenses (id, name, amount, category, tags, date, created_at, updated_at,
                                   notes, payment_method, is_tax_deductible, receipt, receipt_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                expense.id,
                expense.name,
                expense.amount.to_string(),
                expense.category,
                serde_json::to_string(&expense.tags)?,
                expense.date,
                expense.created_at,
                expense.updated_at,
                expense.notes,
                expense.payment_method.as_str(),
                expense.is_tax_deductible,
                expense.receipt,
                expense.receipt_key,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn get_expenses(
        &self,
        limit: Option<u32>,
        category: Option<&str>,
        search: Option<&str>,
        month: Option<&str>,
    ) -> Result<Vec<Expense>> {
        let mut sql = String::from(
            "SELECT id, name, amount, category, tags, date, created_at, updated_at,
                    notes, payment_method, is_tax_deductible, receipt, receipt_key
             FROM expenses WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(cat) = category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cat.to_string()));
        }
        if let Some(s) = search {
            sql.push_str(&format!(
                " AND (name LIKE ?{0} OR notes LIKE ?{0} OR tags LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }
        if let Some(m) = month {
            sql.push_str(&format!(" AND date LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{m}%")));
        }

        // Transaction date first, then creation time for same-day entries.
        sql.push_str(" ORDER BY date DESC, created_at DESC");

        if let Some(l) = limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_by_id(&self, id: &str) -> Result<Option<Expense>> {
        let result = self.conn.query_row(
            "SELECT id, name, amount, category, tags, date, created_at, updated_at,
                    notes, payment_method, is_tax_deductible, receipt, receipt_key
             FROM expenses WHERE id = ?1",
            params![id],
            expense_from_row,
        );
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_expenses_by_category(&self, category: &str) -> Result<Vec<Expense>> {
        self.get_expenses(None, Some(category), None, None)
    }

    pub(crate) fn update_expense(&self, expense: &Expense) -> Result<()> {
        self.conn.execute(
            "UPDATE expenses SET name = ?2, amount = ?3, category = ?4, tags = ?5, date = ?6,
                    updated_at = ?7, notes = ?8, payment_method = ?9, is_tax_deductible = ?10,
                    receipt = ?11, receipt_key = ?12
             WHERE id = ?1",
            params![
                expense.id,
                expense.name,
                expense.amount.to_string(),
                expense.category,
                serde_json::to_string(&expense.tags)?,
                expense.date,
                expense.updated_at,
                expense.notes,
                expense.payment_method.as_str(),
                expense.is_tax_deductible,
                expense.receipt,
                expense.receipt_key,
            ],
        )?;
        Ok(())
    }

    /// Cascade primitive: overwrite the category field only.
    pub(crate) fn update_expense_category(&self, id: &str, category: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE expenses SET category = ?2 WHERE id = ?1",
            params![id, category],
        )?;
        Ok(())
    }

    pub(crate) fn delete_expense(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub(crate) fn get_expense_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn insert_budget(&self, budget: &Budget) -> Result<()> {
        self.conn.execute(
            "INSERT INTO budgets (id, category, limit_amount, month_period, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                budget.id,
                budget.category,
                budget.limit_amount.to_string(),
                budget.month_period,
                budget.created_at,
                budget.updated_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn get_budgets(&self, month: &str) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, limit_amount, month_period, created_at, updated_at
             FROM budgets WHERE month_period = ?1 ORDER BY category",
        )?;
        let rows = stmt.query_map(params![month], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_all_budgets(&self) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, limit_amount, month_period, created_at, updated_at
             FROM budgets ORDER BY month_period DESC, category",
        )?;
        let rows = stmt.query_map([], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_budgets_by_category(&self, category: &str) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, limit_amount, month_period, created_at, updated_at
             FROM budgets WHERE category = ?1",
        )?;
        let rows = stmt.query_map(params![category], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// The budget for an exact (category, month) pair, if one exists.
    /// When the rename cascade has produced duplicates, the oldest wins.
    pub(crate) fn find_budget(&self, category: &str, month: &str) -> Result<Option<Budget>> {
        let result = self.conn.query_row(
            "SELECT id, category, limit_amount, month_period, created_at, updated_at
             FROM budgets WHERE category = ?1 AND month_period = ?2
             ORDER BY created_at LIMIT 1",
            params![category, month],
            budget_from_row,
        );
        match result {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn update_budget_limit(
        &self,
        id: &str,
        limit: Decimal,
        updated_at: &str,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE budgets SET limit_amount = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, limit.to_string(), updated_at],
        )?;
        Ok(())
    }

    /// Cascade primitive: relabel the category only, month and limit kept.
    pub(crate) fn update_budget_category(&self, id: &str, category: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE budgets SET category = ?2 WHERE id = ?1",
            params![id, category],
        )?;
        Ok(())
    }

    pub(crate) fn delete_budget(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Analytics ─────────────────────────────────────────────

    pub(crate) fn get_spending_by_category(&self, month: &str) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, CAST(SUM(amount) AS TEXT)
             FROM expenses
             WHERE date LIKE ?1
             GROUP BY category
             ORDER BY SUM(amount) DESC",
        )?;
        let rows = stmt.query_map(params![format!("{month}%")], |row| {
            let name: String = row.get(0)?;
            let amt_str: String = row.get(1)?;
            Ok((name, Decimal::from_str(&amt_str).unwrap_or_default()))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// (total spent, expense count) for one month.
    pub(crate) fn get_monthly_totals(&self, month: &str) -> Result<(Decimal, i64)> {
        let total: String = self.conn.query_row(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS TEXT) FROM expenses WHERE date LIKE ?1",
            params![format!("{month}%")],
            |row| row.get(0),
        )?;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE date LIKE ?1",
            params![format!("{month}%")],
            |row| row.get(0),
        )?;
        Ok((Decimal::from_str(&total).unwrap_or_default(), count))
    }

    /// Total spent per month for the most recent `months`, oldest first.
    pub(crate) fn get_monthly_trend(&self, months: usize) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT substr(date, 1, 7) AS month, CAST(SUM(amount) AS TEXT)
             FROM expenses
             GROUP BY month
             ORDER BY month DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![months as i64], |row| {
            let month: String = row.get(0)?;
            let amt_str: String = row.get(1)?;
            Ok((month, Decimal::from_str(&amt_str).unwrap_or_default()))
        })?;
        let mut result: Vec<_> = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        result.reverse();
        Ok(result)
    }

    // ── Export ────────────────────────────────────────────────

    /// Write expenses (optionally one month) to a CSV file. Returns the
    /// number of rows written.
    pub(crate) fn export_to_csv(&self, path: &str, month: Option<&str>) -> Result<usize> {
        let expenses = self.get_expenses(None, None, None, month)?;
        if expenses.is_empty() {
            return Ok(0);
        }

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create export file: {path}"))?;
        writer.write_record([
            "date",
            "name",
            "category",
            "amount",
            "payment_method",
            "tax_deductible",
            "notes",
            "tags",
        ])?;
        for e in &expenses {
            writer.write_record([
                e.date.as_str(),
                e.name.as_str(),
                e.category.as_str(),
                &e.amount.to_string(),
                e.payment_method.as_str(),
                if e.is_tax_deductible { "yes" } else { "no" },
                e.notes.as_str(),
                &e.tags.join(";"),
            ])?;
        }
        writer.flush()?;
        Ok(expenses.len())
    }
}

fn expense_from_row(row: &Row) -> rusqlite::Result<Expense> {
    let amount_str: String = row.get(2)?;
    let tags_json: String = row.get(4)?;
    let method_str: String = row.get(9)?;
    Ok(Expense {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        category: row.get(3)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        notes: row.get(8)?,
        payment_method: PaymentMethod::parse(&method_str),
        is_tax_deductible: row.get(10)?,
        receipt: row.get(11)?,
        receipt_key: row.get(12)?,
    })
}

fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    let amt_str: String = row.get(2)?;
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        limit_amount: Decimal::from_str(&amt_str).unwrap_or_default(),
        month_period: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests;
