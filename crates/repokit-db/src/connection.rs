//! Database connection management.
//!
//! [`DbConnection`] is a cheap, cloneable handle to a single SQLite
//! connection. Every repository and query builder holds a clone; each call
//! locks the connection for the duration of one statement.
//!
//! Transactions are connection-wide: statements issued by any holder of the
//! handle between [`DbConnection::begin_transaction`] and
//! [`DbConnection::commit`] / [`DbConnection::rollback`] are part of it.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{params_from_iter, types::Value, Connection, Statement, ToSql};
use tracing::debug;

use crate::{
    error::{DbError, Result},
    record::Record,
    traits::FromRow,
};

/// Parameters bound to a raw SQL statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Bindings {
    /// No parameters.
    #[default]
    None,
    /// Values for `?` / `?N` placeholders, in order.
    Positional(Vec<Value>),
    /// Values for `:name` placeholders. A name without a prefix gets `:`.
    Named(Vec<(String, Value)>),
}

impl Bindings {
    pub fn is_empty(&self) -> bool {
        match self {
            Bindings::None => true,
            Bindings::Positional(values) => values.is_empty(),
            Bindings::Named(values) => values.is_empty(),
        }
    }
}

impl From<Vec<Value>> for Bindings {
    fn from(values: Vec<Value>) -> Self {
        Bindings::Positional(values)
    }
}

impl From<Vec<(String, Value)>> for Bindings {
    fn from(values: Vec<(String, Value)>) -> Self {
        Bindings::Named(values)
    }
}

fn parameter_name(name: &str) -> String {
    if name.starts_with([':', '@', '$']) {
        name.to_string()
    } else {
        format!(":{name}")
    }
}

fn query_bound<E: FromRow>(stmt: &mut Statement<'_>, bindings: &Bindings) -> Result<Vec<E>> {
    let rows = match bindings {
        Bindings::None => stmt
            .query_map([], E::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        Bindings::Positional(values) => stmt
            .query_map(params_from_iter(values.iter()), E::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        Bindings::Named(values) => {
            let names: Vec<String> = values.iter().map(|(n, _)| parameter_name(n)).collect();
            let named: Vec<(&str, &dyn ToSql)> = names
                .iter()
                .zip(values.iter())
                .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
                .collect();
            stmt.query_map(named.as_slice(), E::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(rows)
}

fn execute_bound(stmt: &mut Statement<'_>, bindings: &Bindings) -> Result<usize> {
    let affected = match bindings {
        Bindings::None => stmt.execute([])?,
        Bindings::Positional(values) => stmt.execute(params_from_iter(values.iter()))?,
        Bindings::Named(values) => {
            let names: Vec<String> = values.iter().map(|(n, _)| parameter_name(n)).collect();
            let named: Vec<(&str, &dyn ToSql)> = names
                .iter()
                .zip(values.iter())
                .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
                .collect();
            stmt.execute(named.as_slice())?
        }
    };
    Ok(affected)
}

/// Result of [`DbConnection::native_query`].
#[derive(Debug, Clone, PartialEq)]
pub enum NativeResult {
    /// Rows produced by a row-returning statement.
    Rows(Vec<Record>),
    /// Success flag of a statement that returns no rows.
    Executed(bool),
}

impl NativeResult {
    pub fn rows(self) -> Option<Vec<Record>> {
        match self {
            NativeResult::Rows(rows) => Some(rows),
            NativeResult::Executed(_) => None,
        }
    }
}

/// Shared handle to one SQLite connection.
#[derive(Clone)]
pub struct DbConnection {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection").finish_non_exhaustive()
    }
}

impl DbConnection {
    /// Opens (or creates) a database file.
    ///
    /// The journal is switched to WAL for better concurrent access.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wraps an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Locks the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConnectionError`] if a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DbError::ConnectionError("connection lock poisoned".into()))
    }

    /// Runs a row-returning statement and maps every row to `E`.
    pub fn query_as<E: FromRow>(&self, sql: &str, bindings: &Bindings) -> Result<Vec<E>> {
        debug!(sql, "query");
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        query_bound(&mut stmt, bindings)
    }

    /// Runs a row-returning statement and returns untyped records.
    pub fn select(&self, sql: &str, bindings: &Bindings) -> Result<Vec<Record>> {
        self.query_as(sql, bindings)
    }

    /// Runs a statement that returns no rows, reporting success.
    pub fn statement(&self, sql: &str, bindings: &Bindings) -> Result<bool> {
        self.affecting_statement(sql, bindings)?;
        Ok(true)
    }

    /// Runs a statement that returns no rows and reports the affected row count.
    pub fn affecting_statement(&self, sql: &str, bindings: &Bindings) -> Result<usize> {
        debug!(sql, "statement");
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        execute_bound(&mut stmt, bindings)
    }

    /// Runs raw SQL. With `is_select` the produced rows are returned;
    /// otherwise the statement is executed and its success reported.
    pub fn native_query(
        &self,
        sql: &str,
        bindings: &Bindings,
        is_select: bool,
    ) -> Result<NativeResult> {
        if is_select {
            Ok(NativeResult::Rows(self.select(sql, bindings)?))
        } else {
            Ok(NativeResult::Executed(self.statement(sql, bindings)?))
        }
    }

    /// Runs several `;`-separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        debug!(sql, "batch");
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.execute_batch("BEGIN")
    }

    pub fn commit(&self) -> Result<()> {
        self.execute_batch("COMMIT")
    }

    pub fn rollback(&self) -> Result<()> {
        self.execute_batch("ROLLBACK")
    }

    /// Whether a transaction is currently open on this connection.
    pub fn in_transaction(&self) -> Result<bool> {
        Ok(!self.lock()?.is_autocommit())
    }

    /// Runs `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok` and rolls back when it returns `Err`.
    /// The lock is not held while `f` runs, so `f` may use the handle freely.
    ///
    /// ```rust
    /// use repokit_db::{Bindings, DbConnection, DbError};
    ///
    /// let conn = DbConnection::open_in_memory().unwrap();
    /// conn.execute_batch("CREATE TABLE t (v INTEGER)").unwrap();
    /// let result: Result<(), DbError> = conn.transaction(|c| {
    ///     c.statement("INSERT INTO t (v) VALUES (1)", &Bindings::None)?;
    ///     Err(DbError::ConnectionError("abort".into()))
    /// });
    /// assert!(result.is_err());
    /// assert!(conn.select("SELECT * FROM t", &Bindings::None).unwrap().is_empty());
    /// ```
    pub fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Self) -> std::result::Result<T, E>,
        E: From<DbError>,
    {
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                self.rollback()?;
                Err(err)
            }
        }
    }
}
