//! INSERT query builder.

use rusqlite::{params_from_iter, types::Value};
use tracing::debug;

use crate::{
    connection::DbConnection,
    error::Result,
    expr::{quote_identifier, Col},
    record::Attributes,
    traits::FromRow,
};

/// Builds `INSERT INTO` statements.
///
/// Columns are emitted in the order they were set. An insert without any
/// column uses `DEFAULT VALUES`.
pub struct InsertQuery {
    db: DbConnection,
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
    on_conflict: Option<String>,
}

impl InsertQuery {
    pub fn into(db: DbConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
            columns: vec![],
            values: vec![],
            on_conflict: None,
        }
    }

    pub fn set<T, V: Into<Value>>(mut self, col: Col<T>, value: V) -> Self {
        self.columns.push(col.quoted());
        self.values.push(value.into());
        self
    }

    /// Sets every column of `data`, in column-name order.
    pub fn values(mut self, data: &Attributes) -> Self {
        for (column, value) in data {
            self.columns.push(quote_identifier(column));
            self.values.push(value.clone());
        }
        self
    }

    pub fn on_conflict_do_nothing(mut self) -> Self {
        self.on_conflict = Some("ON CONFLICT DO NOTHING".to_string());
        self
    }

    /// Turns the insert into an upsert keyed on `conflict_cols`.
    ///
    /// With no `update_cols` a conflict leaves the existing row untouched.
    pub fn on_conflict_update(mut self, conflict_cols: &[&str], update_cols: &[&str]) -> Self {
        let conflict = conflict_cols
            .iter()
            .map(|col| quote_identifier(col))
            .collect::<Vec<_>>()
            .join(", ");

        if update_cols.is_empty() {
            self.on_conflict = Some(format!("ON CONFLICT({}) DO NOTHING", conflict));
            return self;
        }

        let updates: Vec<String> = update_cols
            .iter()
            .map(|col| {
                let col = quote_identifier(col);
                format!("{} = excluded.{}", col, col)
            })
            .collect();
        self.on_conflict = Some(format!(
            "ON CONFLICT({}) DO UPDATE SET {}",
            conflict,
            updates.join(", ")
        ));
        self
    }

    /// Runs the insert and returns the rowid of the inserted row.
    pub fn execute(self) -> Result<i64> {
        let sql = self.build_sql();
        debug!(sql = %sql, "insert");
        let conn = self.db.lock()?;
        conn.execute(&sql, params_from_iter(self.values.iter()))?;
        Ok(conn.last_insert_rowid())
    }

    /// Runs the insert with `RETURNING *` and maps the stored row.
    ///
    /// The returned row carries every value the database filled in
    /// (autoincrement keys, column defaults).
    pub fn execute_returning<E: FromRow>(self) -> Result<E> {
        let sql = format!("{} RETURNING *", self.build_sql());
        debug!(sql = %sql, "insert");
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt.query_row(params_from_iter(self.values.iter()), E::from_row)?;
        Ok(row)
    }

    fn build_sql(&self) -> String {
        let table = quote_identifier(&self.table);

        let mut sql = if self.columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let columns = self.columns.join(", ");
            let placeholders = vec!["?"; self.values.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table, columns, placeholders
            )
        };

        if let Some(conflict) = &self.on_conflict {
            sql.push(' ');
            sql.push_str(conflict);
        }

        sql
    }
}
