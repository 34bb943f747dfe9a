//! Environment helpers for tests. Callers must be `#[serial]`.

use std::env;

/// Restores the previous values of the variables it set when dropped.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    pub fn set(vars: &[(&str, &str)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, value)| {
                let previous = env::var(key).ok();
                env::set_var(key, value);
                (key.to_string(), previous)
            })
            .collect();
        Self { saved }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }
}

/// Runs `f` with `vars` set, restoring them afterwards even if `f` panics.
pub fn with_env<F: FnOnce()>(vars: Vec<(&str, &str)>, f: F) {
    let _guard = ScopedEnv::set(&vars);
    f();
}
