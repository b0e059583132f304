//! Full-database JSON snapshot: every expense and budget plus the category
//! registry, written as one pretty-printed document. Receipt image bytes are
//! not serialized; the remote receipt key travels with the expense instead.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{now_rfc3339, Budget, Expense};

const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct BackupFile {
    pub version: u32,
    /// RFC 3339 time the snapshot was taken.
    pub timestamp: String,
    pub data: BackupData,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct BackupData {
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<String>,
    pub category_icons: HashMap<String, String>,
}

/// Snapshot the whole database into `path`. Returns the number of expense
/// and budget records written.
pub(crate) fn write_backup(db: &Database, path: &Path) -> Result<(usize, usize)> {
    let registry = db.load_registry()?;
    let backup = BackupFile {
        version: BACKUP_VERSION,
        timestamp: now_rfc3339(),
        data: BackupData {
            expenses: db.get_expenses(None, None, None, None)?,
            budgets: db.get_all_budgets()?,
            categories: registry.categories,
            category_icons: registry.icons,
        },
    };

    let counts = (backup.data.expenses.len(), backup.data.budgets.len());
    let file = File::create(path)
        .with_context(|| format!("Failed to create backup file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &backup)
        .context("Failed to write backup")?;
    Ok(counts)
}
