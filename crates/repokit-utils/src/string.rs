use std::sync::LazyLock;

use regex::Regex;

static TYPE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("unable to compile type name regex")
});

static MODULE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("unable to compile module path regex")
});

/// Returns `true` for UpperCamelCase identifiers such as `User` or `BlogPost`.
pub fn is_type_name(name: &str) -> bool {
    TYPE_NAME_RE.is_match(name)
}

/// Returns `true` for `::`-separated module paths such as `crate::models`.
pub fn is_module_path(path: &str) -> bool {
    MODULE_PATH_RE.is_match(path)
}

/// Strips any leading module path, `crate::models::User` becomes `User`.
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Converts an UpperCamelCase identifier to snake_case.
///
/// Acronyms stay together: `HTTPRequest` becomes `http_request`.
///
/// ```
/// use repokit_utils::string::to_snake_case;
///
/// assert_eq!(to_snake_case("BlogPost"), "blog_post");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
