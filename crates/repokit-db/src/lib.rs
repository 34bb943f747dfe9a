//! Generic data access over SQLite.
//!
//! - [`query`]: typed SELECT/INSERT/UPDATE/DELETE builders
//! - [`EntityRepository`]: CRUD, declarative filters, raw SQL and staged
//!   writes for one table
//! - [`RepositoryRegistry`]: explicit model name → repository lookup

pub mod connection;
pub mod criteria;
pub mod error;
pub mod expr;
pub mod macros;
pub mod query;
pub mod record;
pub mod registry;
pub mod repository;
pub mod traits;

pub use connection::{Bindings, DbConnection, NativeResult};
pub use criteria::{Filter, FilterEntry, FilterValue, OrderBy, OrderSpec, SortDirection};
pub use error::{DbError, Result};
pub use query::*;
pub use record::{Attributes, Record};
pub use registry::{Repository, RepositoryRegistry};
pub use repository::EntityRepository;
pub use rusqlite::types::Value;
pub use traits::{FromRow, Model, Persistable};
