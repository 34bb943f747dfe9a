//! SQL expression operators.
//!
//! These structs represent compound expressions like `col = ?`, `col LIKE ?`, etc.
//! Each implements [`Expression`] and recursively builds SQL fragments.

use rusqlite::types::Value;

use crate::traits::Expression;

/// Represents a binary comparison (e.g., `=`, `>`, `<=`).
pub struct BinaryOp<L> {
    left: L,
    op: &'static str,
    right: Value,
}

impl<L> BinaryOp<L> {
    pub fn new(left: L, op: &'static str, right: Value) -> Self {
        Self {
            left,
            op,
            right,
        }
    }
}

impl<L: Expression> Expression for BinaryOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.right.clone());
        format!("{} {} ?", left_sql, self.op)
    }
}

/// Represents a substring `LIKE` match, optionally case-insensitive.
pub struct LikeOp<L> {
    left: L,
    pattern: String,
    case_insensitive: bool,
}

impl<L> LikeOp<L> {
    pub const fn new(left: L, pattern: String, case_insensitive: bool) -> Self {
        Self {
            left,
            pattern,
            case_insensitive,
        }
    }
}

impl<L: Expression> Expression for LikeOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(format!("%{}%", self.pattern).into());
        if self.case_insensitive {
            format!("LOWER({}) LIKE LOWER(?)", left_sql)
        } else {
            format!("{} LIKE ?", left_sql)
        }
    }
}

/// Represents an `IN` or `NOT IN` clause.
///
/// An empty value list renders as a constant predicate: `IN ()` matches
/// nothing and `NOT IN ()` matches everything.
pub struct InOp<L> {
    left: L,
    values: Vec<Value>,
    negated: bool,
}

impl<L> InOp<L> {
    pub fn new(left: L, values: Vec<Value>, negated: bool) -> Self {
        Self {
            left,
            values,
            negated,
        }
    }
}

impl<L: Expression> Expression for InOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        if self.values.is_empty() {
            return if self.negated { "1 = 1" } else { "0 = 1" }.to_string();
        }

        let left_sql = self.left.to_sql(params);
        let placeholders = vec!["?"; self.values.len()].join(", ");
        params.extend(self.values.iter().cloned());
        let op = if self.negated { "NOT IN" } else { "IN" };
        format!("{} {} ({})", left_sql, op, placeholders)
    }
}

/// Represents an `IS NULL` or `IS NOT NULL` check.
pub struct NullOp<L> {
    left: L,
    is_null: bool,
}

impl<L> NullOp<L> {
    pub fn new(left: L, is_null: bool) -> Self {
        Self {
            left,
            is_null,
        }
    }
}

impl<L: Expression> Expression for NullOp<L> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        let op = if self.is_null {
            "IS NULL"
        } else {
            "IS NOT NULL"
        };
        format!("{} {}", left_sql, op)
    }
}

/// Combines two expressions with `AND` or `OR`.
pub struct LogicalOp<L, R> {
    left: L,
    right: R,
    op: &'static str,
}

impl<L, R> LogicalOp<L, R> {
    pub fn new(left: L, right: R, op: &'static str) -> Self {
        Self {
            left,
            right,
            op,
        }
    }
}

impl<L: Expression, R: Expression> Expression for LogicalOp<L, R> {
    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let left_sql = self.left.to_sql(params);
        let right_sql = self.right.to_sql(params);
        format!("({} {} {})", left_sql, self.op, right_sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Col;

    const STATUS: Col<String> = Col::new("status");
    const ID: Col<i64> = Col::new("id");

    #[test]
    fn test_binary_op() {
        let mut params = vec![];
        let sql = STATUS.eq("active".to_string()).to_sql(&mut params);
        assert_eq!(sql, "\"status\" = ?");
        assert_eq!(params, vec![Value::Text("active".into())]);
    }

    #[test]
    fn test_in_op() {
        let mut params = vec![];
        let sql = ID.in_([1i64, 2, 3]).to_sql(&mut params);
        assert_eq!(sql, "\"id\" IN (?, ?, ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_in_op() {
        let mut params = vec![];
        assert_eq!(ID.in_(Vec::<i64>::new()).to_sql(&mut params), "0 = 1");
        assert_eq!(ID.not_in(Vec::<i64>::new()).to_sql(&mut params), "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_logical_op_keeps_param_order() {
        let mut params = vec![];
        let sql = ID
            .gt(10i64)
            .or(STATUS.like("arch"))
            .and(STATUS.not_null())
            .to_sql(&mut params);
        assert_eq!(
            sql,
            "((\"id\" > ? OR \"status\" LIKE ?) AND \"status\" IS NOT NULL)"
        );
        assert_eq!(
            params,
            vec![Value::Integer(10), Value::Text("%arch%".into())]
        );
    }
}
