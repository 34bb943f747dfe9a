//! SELECT query builder.

use std::marker::PhantomData;

use rusqlite::types::Value;
use tracing::debug;

use crate::{
    connection::{Bindings, DbConnection},
    error::Result,
    expr::{column::Col, quote_identifier},
    query::clause::{push_where, OrderClause, WhereClause},
    traits::{Expression, FromRow},
};

/// An ergonomic SQL query builder for SQLite.
///
/// Constructed via [`SelectQuery::from`], then chained with `.filter()`, `.order_by()`, etc.
///
/// # Type Parameters
///
/// - `E`: the row type (must implement [`FromRow`] to be fetched)
///
/// # Example
///
/// ```rust
/// use repokit_db::{DbConnection, SelectQuery, FromRow, define_entity};
/// use repokit_db::traits::Expression as _;
///
/// #[derive(Debug)]
/// struct User {
///     id: i64
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
///         Ok(User {
///             id: row.get("id")?
///         })
///     }
/// }
///
/// define_entity!(
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id"
///         }
///     }
/// );
///
/// let db = DbConnection::open_in_memory().unwrap();
/// db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY)").unwrap();
///
/// let users = SelectQuery::<User>::from(db, users::TABLE)
///     .filter(users::ID.gt(0))
///     .order_by(users::ID, false)
///     .limit(10)
///     .fetch()
///     .unwrap();
/// assert!(users.is_empty());
/// ```
pub struct SelectQuery<E> {
    db: DbConnection,
    table: String,
    columns: Vec<String>,
    wheres: Vec<WhereClause>,
    orders: Vec<OrderClause>,
    limit: Option<u32>,
    offset: Option<u64>,
    _entity: PhantomData<E>,
}

impl<E> SelectQuery<E> {
    /// Starts a new query on the given table.
    ///
    /// # Parameters
    ///
    /// - `db`: shared database connection
    /// - `table`: table name (e.g., `"users"`)
    pub fn from(db: DbConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
            columns: vec![],
            wheres: vec![],
            orders: vec![],
            limit: None,
            offset: None,
            _entity: PhantomData,
        }
    }

    /// Select specific columns from the table.
    pub fn select<T>(mut self, cols: &[Col<T>]) -> Self {
        self.columns.extend(cols.iter().map(Col::quoted));
        self
    }

    /// Select all columns from the table
    pub fn select_all(mut self) -> Self {
        self.columns.clear();
        self
    }

    /// Applies the WHERE condition. Multiple filters are joined with `AND`.
    pub fn filter<Expr: Expression + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause::new(expr));
        self
    }

    /// Adds an ORDER BY clause. Clauses apply in the order they are added.
    pub fn order_by<T>(mut self, col: Col<T>, desc: bool) -> Self {
        self.orders.push(OrderClause {
            column: col.quoted(),
            desc,
        });
        self
    }

    /// Limit the number of results
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set query offset
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set pagination params. Pages start at 1; page 0 is treated as 1.
    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.limit = Some(per_page);
        self.offset = Some(u64::from(page.saturating_sub(1)) * u64::from(per_page));
        self
    }

    fn build_sql(&self) -> (String, Vec<Value>) {
        let mut params = vec![];

        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select, quote_identifier(&self.table));
        push_where(&mut sql, &self.wheres, &mut params);

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            let orders = self
                .orders
                .iter()
                .map(|o| format!("{} {}", o.column, if o.desc { "DESC" } else { "ASC" }))
                .collect::<Vec<_>>();
            sql.push_str(&orders.join(", "));
        }

        // SQLite reads a larger literal as REAL and rejects it.
        let offset = self.offset.map(|o| o.min(i64::MAX as u64));
        match (self.limit, offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        (sql, params)
    }

    fn build_count_sql(&self) -> (String, Vec<Value>) {
        let mut params = vec![];
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(&self.table));
        push_where(&mut sql, &self.wheres, &mut params);
        (sql, params)
    }
}

impl<E: FromRow> SelectQuery<E> {
    pub fn fetch(self) -> Result<Vec<E>> {
        let (sql, params) = self.build_sql();
        self.db.query_as(&sql, &Bindings::Positional(params))
    }

    pub fn fetch_one(self) -> Result<Option<E>> {
        let mut results = self.limit(1).fetch()?;
        Ok(results.pop())
    }

    pub fn count(self) -> Result<u64> {
        let (sql, params) = self.build_count_sql();
        debug!(sql = %sql, params = params.len(), "count");
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(rusqlite::params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    const NAME: Col<String> = Col::new("name");
    const AGE: Col<i64> = Col::new("age");

    fn query() -> SelectQuery<Record> {
        SelectQuery::from(DbConnection::open_in_memory().unwrap(), "people")
    }

    #[test]
    fn test_build_plain_select() {
        let (sql, params) = query().build_sql();
        assert_eq!(sql, "SELECT * FROM \"people\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_build_select_with_clauses() {
        let (sql, params) = query()
            .select(&[NAME])
            .filter(AGE.gte(18))
            .filter(NAME.ne("root".to_string()))
            .order_by(AGE, true)
            .order_by(NAME, false)
            .page(3, 10)
            .build_sql();

        assert_eq!(
            sql,
            "SELECT \"name\" FROM \"people\" WHERE \"age\" >= ? AND \"name\" != ? \
             ORDER BY \"age\" DESC, \"name\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            params,
            vec![Value::Integer(18), Value::Text("root".into())]
        );
    }

    #[test]
    fn test_page_offset_does_not_overflow() {
        let (sql, _) = query().page(u32::MAX, 2).build_sql();
        assert_eq!(sql, "SELECT * FROM \"people\" LIMIT 2 OFFSET 8589934588");

        let (sql, _) = query().page(u32::MAX, u32::MAX).build_sql();
        assert_eq!(
            sql,
            format!("SELECT * FROM \"people\" LIMIT {} OFFSET {}", u32::MAX, i64::MAX)
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let (sql, _) = query().offset(5).build_sql();
        assert_eq!(sql, "SELECT * FROM \"people\" LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_count_sql_ignores_order_and_limit() {
        let (sql, _) = query()
            .filter(AGE.lt(30))
            .order_by(NAME, false)
            .limit(1)
            .build_count_sql();
        assert_eq!(sql, "SELECT COUNT(*) FROM \"people\" WHERE \"age\" < ?");
    }
}
