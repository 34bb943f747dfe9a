//! DELETE query builder.

use rusqlite::{params_from_iter, types::Value};
use tracing::debug;

use crate::{
    connection::DbConnection,
    error::Result,
    expr::quote_identifier,
    query::clause::{push_where, WhereClause},
    traits::Expression,
};

pub struct DeleteQuery {
    db: DbConnection,
    table: String,
    wheres: Vec<WhereClause>,
}

impl DeleteQuery {
    pub fn from(db: DbConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
            wheres: Vec::new(),
        }
    }

    pub fn filter<Expr: Expression + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause::new(expr));
        self
    }

    /// Runs the delete and returns the number of removed rows.
    pub fn execute(self) -> Result<usize> {
        let (sql, params) = self.build_sql();
        debug!(sql = %sql, "delete");
        let conn = self.db.lock()?;
        Ok(conn.execute(&sql, params_from_iter(params.iter()))?)
    }

    fn build_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", quote_identifier(&self.table));
        push_where(&mut sql, &self.wheres, &mut params);
        (sql, params)
    }
}
