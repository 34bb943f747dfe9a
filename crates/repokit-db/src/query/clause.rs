//! Internal representation of query clauses.
//!
//! These types are shared by the builders and are not part of the public API.

use rusqlite::types::Value;

use crate::traits::Expression;

/// A WHERE clause represented as a closure that generates SQL and binds parameters.
pub(crate) struct WhereClause {
    pub sql_fn: Box<dyn Fn(&mut Vec<Value>) -> String>,
}

impl WhereClause {
    pub fn new<E: Expression + 'static>(expr: E) -> Self {
        Self {
            sql_fn: Box::new(move |params| expr.to_sql(params)),
        }
    }
}

/// An ORDER BY clause. `column` is already quoted.
pub(crate) struct OrderClause {
    pub column: String,
    pub desc: bool,
}

/// Appends ` WHERE a AND b ...` to `sql`, collecting bound values.
pub(crate) fn push_where(sql: &mut String, wheres: &[WhereClause], params: &mut Vec<Value>) {
    if wheres.is_empty() {
        return;
    }
    let conditions = wheres
        .iter()
        .map(|w| (w.sql_fn)(params))
        .collect::<Vec<_>>();
    sql.push_str(" WHERE ");
    sql.push_str(&conditions.join(" AND "));
}
