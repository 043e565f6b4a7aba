mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::models::*;

/// Returned by id lookups that match nothing.
pub(crate) const NOT_FOUND: i64 = -1;

/// `(name, color)` pairs seeded into `categories` on creation and on reset.
pub(crate) type DefaultCategories<'a> = &'a [(&'a str, &'a str)];

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path, defaults: DefaultCategories<'_>) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.init(defaults).context("Database initialization failed")?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory(defaults: DefaultCategories<'_>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init(defaults)?;
        Ok(db)
    }

    /// Create the schema if this store has never been initialized, seeding the
    /// balance and `defaults` in the same transaction. An existing store is
    /// never reseeded; it is only checked for a schema version this build reads.
    pub(crate) fn init(&mut self, defaults: DefaultCategories<'_>) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master
                           WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.execute(
                "INSERT INTO finance (id, cash) VALUES (1, ?1)",
                params![amount_to_sql(Decimal::ZERO)],
            )?;
            insert_categories(&tx, defaults)?;
            tx.commit()?;
            debug!(categories = defaults.len(), "created schema and seeded defaults");
            return Ok(());
        }

        let version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;
        if version > schema::CURRENT_VERSION {
            anyhow::bail!(
                "Database schema version {version} is newer than this build supports ({})",
                schema::CURRENT_VERSION
            );
        }

        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn add_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (category, date, amount, title, color)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense.category,
                expense.date,
                amount_to_sql(expense.amount),
                expense.title,
                expense.color,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, category = %expense.category, "expense added");
        Ok(id)
    }

    /// Row id of the first expense whose five fields all match, or `NOT_FOUND`.
    /// Duplicates are not disambiguated.
    pub(crate) fn find_expense_id(&self, expense: &Expense) -> Result<i64> {
        let result = self.conn.query_row(
            "SELECT id FROM expenses
             WHERE category = ?1 AND date = ?2 AND amount = ?3 AND title = ?4 AND color = ?5
             ORDER BY id LIMIT 1",
            params![
                expense.category,
                expense.date,
                amount_to_sql(expense.amount),
                expense.title,
                expense.color,
            ],
            |row| row.get(0),
        );
        match result {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(NOT_FOUND),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_expense_by_id(&self, id: i64) -> Result<Option<Expense>> {
        let result = self.conn.query_row(
            "SELECT id, category, date, amount, title, color FROM expenses WHERE id = ?1",
            params![id],
            expense_from_row,
        );
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All expenses in storage order.
    pub(crate) fn get_expenses(&self) -> Result<Vec<Expense>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, category, date, amount, title, color FROM expenses ORDER BY id")?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// The `limit` most recently added expenses, newest first.
    pub(crate) fn get_recent_expenses(&self, limit: u32) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, date, amount, title, color FROM expenses
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    /// Overwrite every field of the expense at `id`. Unknown ids are a no-op.
    pub(crate) fn update_expense(&self, id: i64, new: &Expense) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET category = ?1, date = ?2, amount = ?3, title = ?4, color = ?5
             WHERE id = ?6",
            params![
                new.category,
                new.date,
                amount_to_sql(new.amount),
                new.title,
                new.color,
                id,
            ],
        )?;
        debug!(id, changed, "expense updated");
        Ok(())
    }

    /// Removes only the row at `id`, even when other rows hold identical values.
    pub(crate) fn delete_expense(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        debug!(id, changed, "expense deleted");
        Ok(())
    }

    pub(crate) fn update_expense_category_group(
        &self,
        old_category: &str,
        new_category: &str,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET category = ?1 WHERE category = ?2",
            params![new_category, old_category],
        )?;
        debug!(old_category, new_category, changed, "expenses moved to category");
        Ok(())
    }

    pub(crate) fn update_expense_category_color(
        &self,
        category: &str,
        new_color: &str,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET color = ?1 WHERE category = ?2",
            params![new_color, category],
        )?;
        debug!(category, new_color, changed, "expenses recolored");
        Ok(())
    }

    /// Ids of every expense in `category`, in storage order. A category with no
    /// expenses yields `[NOT_FOUND]`, never an empty list.
    pub(crate) fn search_by_category(&self, category: &str) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM expenses WHERE category = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![category], |row| row.get(0))?;
        let ids: Vec<i64> = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Ok(vec![NOT_FOUND]);
        }
        Ok(ids)
    }

    pub(crate) fn delete_by_category(&self, category: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE category = ?1", params![category])?;
        debug!(category, changed, "expenses deleted by category");
        Ok(())
    }

    /// Rename and recolor every expense of `old_category` in one statement.
    pub(crate) fn batch_category_update(
        &self,
        old_category: &str,
        new_name: &str,
        new_color: &str,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET category = ?1, color = ?2 WHERE category = ?3",
            params![new_name, new_color, old_category],
        )?;
        debug!(old_category, new_name, changed, "expenses batch updated");
        Ok(())
    }

    // ── Balance ───────────────────────────────────────────────

    pub(crate) fn get_balance(&self) -> Result<Decimal> {
        let cash: String = self
            .conn
            .query_row("SELECT cash FROM finance WHERE id = 1", [], |row| row.get(0))
            .context("Balance row is missing")?;
        Ok(Decimal::from_str(&cash).unwrap_or_default())
    }

    pub(crate) fn set_balance(&self, amount: Decimal) -> Result<()> {
        self.conn.execute(
            "UPDATE finance SET cash = ?1 WHERE id = 1",
            params![amount_to_sql(amount)],
        )?;
        debug!(%amount, "balance set");
        Ok(())
    }

    /// Set the balance from user input. Input that is not an integer or decimal
    /// number leaves the balance untouched and returns `false`.
    pub(crate) fn set_balance_input(&self, input: &str) -> Result<bool> {
        match Decimal::from_str(input.trim()) {
            Ok(amount) => {
                self.set_balance(amount)?;
                Ok(true)
            }
            Err(_) => {
                debug!(input, "ignoring non-numeric balance");
                Ok(false)
            }
        }
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn is_duplicate_category(&self, name: &str) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?)
    }

    /// Row id of the first category called `name`, or `NOT_FOUND`.
    pub(crate) fn get_category_id(&self, name: &str) -> Result<i64> {
        let result = self.conn.query_row(
            "SELECT id FROM categories WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| row.get(0),
        );
        match result {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(NOT_FOUND),
            Err(e) => Err(e.into()),
        }
    }

    /// All categories in storage order.
    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, color FROM categories WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    color: row.get(2)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn add_category(&self, name: &str, color: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, color) VALUES (?1, ?2)",
            params![name, color],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name, "category added");
        Ok(id)
    }

    /// Does not touch expenses filed under this category. Callers follow up
    /// with `delete_by_category` or `update_expense_category_group`.
    pub(crate) fn delete_category(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        debug!(id, changed, "category deleted");
        Ok(())
    }

    /// Does not touch expenses filed under the old name or color. Callers
    /// follow up with `batch_category_update`.
    pub(crate) fn update_category(&self, id: i64, new_name: &str, new_color: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1, color = ?2 WHERE id = ?3",
            params![new_name, new_color, id],
        )?;
        debug!(id, new_name, changed, "category updated");
        Ok(())
    }

    // ── Reset ─────────────────────────────────────────────────

    /// Clear all expenses, zero the balance and restore `defaults` as the only
    /// categories, then compact the file.
    pub(crate) fn reset(&mut self, defaults: DefaultCategories<'_>) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM expenses", [])?;
        tx.execute(
            "UPDATE finance SET cash = ?1 WHERE id = 1",
            params![amount_to_sql(Decimal::ZERO)],
        )?;
        tx.execute("DELETE FROM categories", [])?;
        insert_categories(&tx, defaults)?;
        tx.commit()?;
        self.conn
            .execute_batch("VACUUM")
            .context("Failed to compact database")?;
        debug!(categories = defaults.len(), "database reset");
        Ok(())
    }
}

fn insert_categories(conn: &Connection, defaults: DefaultCategories<'_>) -> Result<()> {
    let mut stmt = conn.prepare("INSERT INTO categories (name, color) VALUES (?1, ?2)")?;
    for (name, color) in defaults {
        stmt.execute(params![name, color])?;
    }
    Ok(())
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let amount_str: String = row.get(3)?;
    Ok(Expense {
        id: Some(row.get(0)?),
        category: row.get(1)?,
        date: row.get(2)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        title: row.get(4)?,
        color: row.get(5)?,
    })
}

/// Amounts are stored as normalized decimal text so `42.5` and `42.50` are the
/// same value for exact-match lookups.
fn amount_to_sql(amount: Decimal) -> String {
    amount.normalize().to_string()
}
