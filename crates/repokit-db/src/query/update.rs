//! UPDATE query builder.

use rusqlite::{params_from_iter, types::Value};
use tracing::debug;

use crate::{
    connection::{Bindings, DbConnection},
    error::Result,
    expr::{quote_identifier, Col},
    query::clause::{push_where, WhereClause},
    record::Attributes,
    traits::{Expression, FromRow},
};

/// Builds `UPDATE` statements.
///
/// An update with nothing to set never reaches the database.
pub struct UpdateQuery {
    db: DbConnection,
    table: String,
    updates: Vec<(String, Value)>,
    wheres: Vec<WhereClause>,
}

impl UpdateQuery {
    pub fn table(db: DbConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
            updates: vec![],
            wheres: vec![],
        }
    }

    pub fn set<T, V: Into<Value>>(mut self, col: Col<T>, value: V) -> Self {
        self.updates.push((col.quoted(), value.into()));
        self
    }

    /// Sets every column of `data`, in column-name order.
    pub fn values(mut self, data: &Attributes) -> Self {
        self.updates.extend(
            data.iter()
                .map(|(column, value)| (quote_identifier(column), value.clone())),
        );
        self
    }

    pub fn filter<Expr: Expression + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause::new(expr));
        self
    }

    /// Runs the update and returns the number of changed rows.
    pub fn execute(self) -> Result<usize> {
        if self.updates.is_empty() {
            return Ok(0);
        }
        let (sql, params) = self.build_sql();
        debug!(sql = %sql, "update");
        let conn = self.db.lock()?;
        Ok(conn.execute(&sql, params_from_iter(params.iter()))?)
    }

    /// Runs the update with `RETURNING *` and maps every changed row.
    pub fn execute_returning<E: FromRow>(self) -> Result<Vec<E>> {
        if self.updates.is_empty() {
            return Ok(vec![]);
        }
        let (sql, params) = self.build_sql();
        let sql = format!("{} RETURNING *", sql);
        self.db.query_as(&sql, &Bindings::Positional(params))
    }

    fn build_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();

        let sets: Vec<String> = self
            .updates
            .iter()
            .map(|(col, val)| {
                params.push(val.clone());
                format!("{} = ?", col)
            })
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_identifier(&self.table),
            sets.join(", ")
        );
        push_where(&mut sql, &self.wheres, &mut params);

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: Col<i64> = Col::new("id");
    const STATUS: Col<String> = Col::new("status");

    #[test]
    fn test_build_update() {
        let (sql, params) = UpdateQuery::table(DbConnection::open_in_memory().unwrap(), "posts")
            .set(STATUS, "published".to_string())
            .filter(ID.eq(4))
            .build_sql();

        assert_eq!(sql, "UPDATE \"posts\" SET \"status\" = ? WHERE \"id\" = ?");
        assert_eq!(
            params,
            vec![Value::Text("published".into()), Value::Integer(4)]
        );
    }

    #[test]
    fn test_empty_update_is_noop() {
        let affected = UpdateQuery::table(DbConnection::open_in_memory().unwrap(), "missing")
            .filter(ID.eq(1))
            .execute()
            .unwrap();
        assert_eq!(affected, 0);
    }
}
