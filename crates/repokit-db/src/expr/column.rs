//! Represents a database column.
//!
//! `Col<T>` ties a column name to a Rust type `T`. Columns declared with
//! [`crate::define_entity!`] are typed; columns named at runtime (filters,
//! order specs, the CLI) use `Col<Value>` built by [`Col::dynamic`].
//! It implements [`Expression`], so it can be used directly in filters.

use std::{borrow::Cow, marker::PhantomData, sync::LazyLock};

use regex::Regex;
use rusqlite::types::Value;

use crate::{
    error::{DbError, Result},
    traits::Expression,
};

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("unable to compile identifier regex")
});

/// Checks that `name` is a plain or `table.column` identifier.
pub fn validate_identifier(name: &str) -> Result<()> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

/// Quotes an identifier for SQLite, `users.name` becomes `"users"."name"`.
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// A reference to a database column.
///
/// The type parameter `T` indicates the expected Rust type when reading this column,
/// though it is not enforced at runtime.
///
/// # Example
///
/// ```rust
/// use repokit_db::expr::Col;
/// const NAME: Col<String> = Col::new("name");
/// ```
pub struct Col<T> {
    pub name: Cow<'static, str>,
    _type: PhantomData<T>,
}

impl<T> Clone for Col<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Col<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Col").field(&self.name).finish()
    }
}

impl<T> Col<T> {
    /// Creates a new column reference from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    /// Quoted form of the column name, ready to splice into SQL.
    pub fn quoted(&self) -> String {
        quote_identifier(&self.name)
    }
}

impl Col<Value> {
    /// Creates a column reference from a name only known at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidIdentifier`] if the name is not a plain identifier.
    pub fn dynamic(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self {
            name: Cow::Owned(name),
            _type: PhantomData,
        })
    }
}

impl<T> Expression for Col<T> {
    fn to_sql(&self, _params: &mut Vec<Value>) -> String {
        self.quoted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("name").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("users.created_at").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1column").is_err());
        assert!(validate_identifier("name; DROP TABLE users").is_err());
        assert!(validate_identifier("a.b.c").is_err());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("name"), "\"name\"");
        assert_eq!(quote_identifier("users.name"), "\"users\".\"name\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_dynamic_column() {
        let col = Col::dynamic("status").unwrap();
        assert_eq!(col.quoted(), "\"status\"");
        assert!(matches!(
            Col::dynamic("status--"),
            Err(DbError::InvalidIdentifier(_))
        ));
    }
}
