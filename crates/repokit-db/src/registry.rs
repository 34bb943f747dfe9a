//! Explicit model name → repository mapping.
//!
//! Repositories are registered at start-up; lookups by model name construct
//! a fresh repository bound to the registry's connection.

use std::{
    any::{type_name, Any},
    collections::BTreeMap,
};

use tracing::debug;

use crate::{
    connection::DbConnection,
    error::{DbError, Result},
};

/// A repository that can be looked up by model name.
///
/// ```rust
/// use repokit_db::{DbConnection, Repository, RepositoryRegistry};
///
/// struct TagRepository(DbConnection);
///
/// impl Repository for TagRepository {
///     const MODEL: &'static str = "crate::models::Tag";
///
///     fn from_connection(conn: DbConnection) -> Self {
///         TagRepository(conn)
///     }
/// }
///
/// let mut registry = RepositoryRegistry::new(DbConnection::open_in_memory().unwrap());
/// registry.register::<TagRepository>();
///
/// assert!(registry.contains("Tag"));
/// let _tags: TagRepository = registry.get_repository().unwrap();
/// ```
pub trait Repository: Any {
    /// Model name, bare (`User`) or path-qualified (`crate::models::User`).
    const MODEL: &'static str;

    fn from_connection(conn: DbConnection) -> Self;
}

type Factory = Box<dyn Fn(DbConnection) -> Box<dyn Any> + Send + Sync>;

struct Entry {
    type_name: &'static str,
    factory: Factory,
}

fn model_key(model: &str) -> &str {
    model.rsplit("::").next().unwrap_or(model).trim()
}

/// Maps model names to repository constructors.
pub struct RepositoryRegistry {
    conn: DbConnection,
    entries: BTreeMap<String, Entry>,
}

impl RepositoryRegistry {
    pub fn new(conn: DbConnection) -> Self {
        Self {
            conn,
            entries: BTreeMap::new(),
        }
    }

    /// Registers `R` under the last segment of `R::MODEL`.
    ///
    /// A later registration for the same model replaces the earlier one.
    pub fn register<R: Repository>(&mut self) -> &mut Self {
        let key = model_key(R::MODEL).to_string();
        debug!(model = %key, repository = type_name::<R>(), "registering repository");
        self.entries.insert(
            key,
            Entry {
                type_name: type_name::<R>(),
                factory: Box::new(|conn| Box::new(R::from_connection(conn)) as Box<dyn Any>),
            },
        );
        self
    }

    pub fn contains(&self, model: &str) -> bool {
        self.entries.contains_key(model_key(model))
    }

    /// Registered model names, sorted.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Name of the repository type registered for `model`.
    pub fn repository_type(&self, model: &str) -> Option<&'static str> {
        self.entries.get(model_key(model)).map(|e| e.type_name)
    }

    /// Constructs the repository registered for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::RepositoryNotFound`] if nothing is registered.
    pub fn resolve(&self, model: &str) -> Result<Box<dyn Any>> {
        let entry = self
            .entries
            .get(model_key(model))
            .ok_or_else(|| DbError::RepositoryNotFound(model.to_string()))?;
        Ok((entry.factory)(self.conn.clone()))
    }

    /// Constructs the repository registered for `R::MODEL` as an `R`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::RepositoryNotFound`] if nothing is registered and
    /// [`DbError::RepositoryMismatch`] if a different type is registered
    /// under the same model name.
    pub fn get_repository<R: Repository>(&self) -> Result<R> {
        self.resolve(R::MODEL)?
            .downcast::<R>()
            .map(|repo| *repo)
            .map_err(|_| {
                DbError::RepositoryMismatch {
                    model: R::MODEL.to_string(),
                    expected: type_name::<R>(),
                }
            })
    }

    pub fn connection(&self) -> &DbConnection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::Record, repository::EntityRepository};

    struct UserRepository {
        inner: EntityRepository<Record>,
    }

    impl Repository for UserRepository {
        const MODEL: &'static str = "crate::models::User";

        fn from_connection(conn: DbConnection) -> Self {
            Self {
                inner: EntityRepository::for_table(conn, "users", "id")
                    .expect("valid table name"),
            }
        }
    }

    struct ImpostorRepository;

    impl Repository for ImpostorRepository {
        const MODEL: &'static str = "User";

        fn from_connection(_: DbConnection) -> Self {
            Self
        }
    }

    fn registry() -> RepositoryRegistry {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        let mut registry = RepositoryRegistry::new(conn);
        registry.register::<UserRepository>();
        registry
    }

    #[test]
    fn test_resolve_bare_and_qualified_names() {
        let registry = registry();
        assert!(registry.contains("User"));
        assert!(registry.contains("app::models::User"));
        assert!(registry.resolve("User").unwrap().is::<UserRepository>());
        assert_eq!(registry.models().collect::<Vec<_>>(), vec!["User"]);
    }

    #[test]
    fn test_resolve_unknown_model() {
        let registry = registry();
        assert!(matches!(
            registry.resolve("Invoice"),
            Err(DbError::RepositoryNotFound(name)) if name == "Invoice"
        ));
    }

    #[test]
    fn test_get_repository_shares_connection() {
        let registry = registry();
        registry
            .connection()
            .execute_batch("INSERT INTO users (name) VALUES ('ada')")
            .unwrap();

        let users: UserRepository = registry.get_repository().unwrap();
        assert_eq!(users.inner.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_repository_type_mismatch() {
        let registry = registry();
        assert!(matches!(
            registry.get_repository::<ImpostorRepository>(),
            Err(DbError::RepositoryMismatch { .. })
        ));
    }
}
