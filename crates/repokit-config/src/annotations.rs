//! Doc-comment annotation of generated TOML.
//!
//! The default `repokit.toml` is produced by serializing [`crate::config::Config`]
//! and copying each field's rustdoc onto the matching key as `#` comments.

use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

fn as_comment_block(docs: &str) -> String {
    docs.lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

/// Appends `docs` as `#` comment lines to the prefix of `decor`.
///
/// A non-empty existing prefix is separated from the new block by a bare `#`
/// line unless it already ends with a blank line.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let comments = as_comment_block(docs);
    let existing = decor
        .prefix()
        .and_then(RawString::as_str)
        .unwrap_or_default();

    let new_prefix = match existing.lines().last() {
        None => comments,
        Some("") => format!("{existing}{comments}"),
        Some(_) => format!("{existing}#\n{comments}"),
    };
    decor.set_prefix(new_prefix);
}

/// Copies the field docs of `T` onto the keys of `table`.
///
/// Keys without a documented counterpart are left untouched. When `is_root`
/// is false the container docs of `T` are added above the table header too.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let name = key.get().to_string();
        let Ok(docs) = T::get_field_docs(&name) else {
            warn!(
                "field `{}` has no documentation on `{}`",
                name,
                type_name::<T>()
            );
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(name)),
            Item::Value(_) => append_docs_as_toml_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    append_docs_as_toml_comments(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}
