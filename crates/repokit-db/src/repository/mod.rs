//! Repository pattern implementations for database operations.
//!
//! - [`EntityRepository`] - CRUD, filtering, raw SQL and staged writes for one table
//! - [`NativeResult`] - outcome of a raw SQL call

pub mod entity;

pub use entity::EntityRepository;

pub use crate::connection::NativeResult;
