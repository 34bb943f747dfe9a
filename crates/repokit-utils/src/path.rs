use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::error::{PathError, PathResult};

/// Resolves a configured path to an absolute one.
///
/// `$VAR` and `${VAR}` are replaced with environment values and a leading
/// `~` with the home directory. Relative results are joined onto the
/// current directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is blank
/// * [`PathError::MissingEnvVar`] if a referenced variable is unset
/// * [`PathError::UnclosedVariable`] for `${` without a closing brace
/// * [`PathError::CurrentDir`] if the current directory cannot be read
///
/// ```
/// use repokit_utils::path::resolve_path;
///
/// assert!(resolve_path("/srv/app/src").unwrap().is_absolute());
/// assert!(resolve_path("src").unwrap().is_absolute());
/// ```
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(|source| PathError::CurrentDir { source })
}

fn home() -> String {
    env::var("HOME").unwrap_or_else(|_| format!("/home/{}", env::var("USER").unwrap_or_default()))
}

fn expand(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    if chars.next_if_eq(&'~').is_some() {
        out.push_str(&home());
    }

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name = if chars.next_if_eq(&'{').is_some() {
            braced_name(&mut chars)?
        } else {
            bare_name(&mut chars)
        };

        if name.is_empty() {
            out.push('$');
            continue;
        }

        let value = env::var(&name).map_err(|_| {
            PathError::MissingEnvVar {
                var: name.clone(),
                input: input.to_string(),
            }
        })?;
        out.push_str(&value);
    }

    Ok(out)
}

fn braced_name(chars: &mut Peekable<Chars<'_>>) -> PathResult<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Ok(name);
        }
        name.push(c);
    }
    Err(PathError::UnclosedVariable {
        input: format!("${{{name}"),
    })
}

fn bare_name(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}
