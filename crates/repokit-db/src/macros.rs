//! Macros for defining entity schemas.
//!
//! [`define_entity!`] generates column constants for a table, tying column
//! names to Rust types. [`impl_model!`] binds an existing row type to its
//! table so it can back an [`crate::EntityRepository`].

/// Defines a module with typed column constants for a database table.
///
/// # Syntax
///
/// ```ignore
/// define_entity!(
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name"
///         }
///     }
/// );
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod users {
///     pub const TABLE: &str = "users";
///     pub const ID: repokit_db::expr::Col<i64> = repokit_db::expr::Col::new("id");
///     pub const NAME: repokit_db::expr::Col<String> = repokit_db::expr::Col::new("name");
/// }
/// ```
#[macro_export]
macro_rules! define_entity {
    (
        $entity:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $entity {
            #[allow(unused_imports)]
            use $crate::expr::column::Col;

            pub const TABLE: &str = $table;

            $(
                pub const $col_name: Col<$col_type> = Col::new($db_col);
            )*
        }
    };
}

/// Implements [`crate::Model`] for a type.
///
/// ```rust
/// use repokit_db::{impl_model, Attributes, FromRow, Persistable};
///
/// struct Post { id: Option<i64>, slug: String }
///
/// impl FromRow for Post {
///     fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
///         Ok(Post { id: row.get("id")?, slug: row.get("slug")? })
///     }
/// }
///
/// impl Persistable for Post {
///     fn attributes(&self) -> Attributes {
///         Attributes::new().with("id", self.id).with("slug", self.slug.clone())
///     }
/// }
///
/// impl_model!(Post => "posts", primary_key: "slug");
///
/// assert_eq!(<Post as repokit_db::Model>::PRIMARY_KEY, "slug");
/// ```
#[macro_export]
macro_rules! impl_model {
    ($ty:ty => $table:literal) => {
        impl $crate::Model for $ty {
            const TABLE: &'static str = $table;
        }
    };
    ($ty:ty => $table:literal, primary_key: $pk:literal) => {
        impl $crate::Model for $ty {
            const TABLE: &'static str = $table;
            const PRIMARY_KEY: &'static str = $pk;
        }
    };
}
