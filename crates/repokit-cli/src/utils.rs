use std::{
    fmt::Display,
    io::Write,
    sync::{LazyLock, PoisonError, RwLock},
};

use nu_ansi_term::Color;
use serde::Serialize;

use crate::error::{CliResult, ErrorContext};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn set_color(enabled: bool) {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = enabled;
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Prints one value as a single JSON line on stdout.
pub fn print_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)?;
    writeln!(std::io::stdout().lock(), "{line}")
        .with_context(|| "writing to stdout".to_string())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_colored_respects_toggle() {
        set_color(false);
        assert_eq!(Colored(Color::Red, "plain").to_string(), "plain");

        set_color(true);
        let painted = Colored(Color::Red, "red").to_string();
        assert!(painted.starts_with("\u{1b}["));
        assert!(painted.contains("red"));
    }
}
