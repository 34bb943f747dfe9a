//! The query builder.
//!
//! This module provides a typed interface for constructing SQL queries
//! without manually concatenating strings. Each query type (SELECT, INSERT,
//! UPDATE, DELETE) has its own builder with chainable methods for composing
//! clauses safely.
//!
//! # Overview
//!
//! - [`SelectQuery`]: `SELECT` with filters, ordering, limit/offset and counts.
//! - [`InsertQuery`]: `INSERT INTO` from column-value pairs or an
//!   [`crate::Attributes`] map, with optional upsert and `RETURNING *`.
//! - [`UpdateQuery`]: `UPDATE` with `SET` and `WHERE` clauses.
//! - [`DeleteQuery`]: `DELETE FROM` with filtering conditions.
//!
//! Table and column names are quoted; every value is a bound parameter.
//! Builders run against a [`crate::DbConnection`] and report failures as
//! [`crate::DbError`].
//!
//! # Example
//!
//! ```rust
//! use repokit_db::{DbConnection, Record, SelectQuery};
//! use repokit_db::expr::Col;
//! use repokit_db::traits::Expression as _;
//!
//! let conn = DbConnection::open_in_memory().unwrap();
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, active INTEGER)").unwrap();
//!
//! const ACTIVE: Col<bool> = Col::new("active");
//! const ID: Col<i64> = Col::new("id");
//!
//! let users = SelectQuery::<Record>::from(conn, "users")
//!     .filter(ACTIVE.eq(true))
//!     .order_by(ID, true)
//!     .limit(10)
//!     .fetch()
//!     .unwrap();
//! assert!(users.is_empty());
//! ```

pub mod clause;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;
