use repokit_db::{criteria::parse_value, Bindings, DbConnection, NativeResult};
use tracing::info;

use crate::{
    error::{CliError, CliResult},
    utils::print_json_line,
};

/// Builds statement bindings from `-b value` and `-p name=value` arguments.
pub fn parse_bindings(positional: &[String], named: &[String]) -> CliResult<Bindings> {
    match (positional.is_empty(), named.is_empty()) {
        (true, true) => Ok(Bindings::None),
        (false, true) => Ok(Bindings::Positional(
            positional.iter().map(|raw| parse_value(raw)).collect(),
        )),
        (true, false) => {
            named
                .iter()
                .map(|raw| {
                    match raw.split_once('=') {
                        Some((name, value)) if !name.trim().is_empty() => {
                            Ok((name.trim().to_string(), parse_value(value)))
                        }
                        _ => Err(CliError::InvalidBinding(raw.clone())),
                    }
                })
                .collect::<CliResult<Vec<_>>>()
                .map(Bindings::Named)
        }
        (false, false) => Err(CliError::MixedBindings),
    }
}

pub fn query(
    conn: &DbConnection,
    sql: &str,
    positional: &[String],
    named: &[String],
    write: bool,
) -> CliResult<()> {
    let bindings = parse_bindings(positional, named)?;
    match conn.native_query(sql, &bindings, !write)? {
        NativeResult::Rows(rows) => {
            for row in &rows {
                print_json_line(row)?;
            }
        }
        NativeResult::Executed(_) => info!("Statement executed"),
    }
    Ok(())
}
