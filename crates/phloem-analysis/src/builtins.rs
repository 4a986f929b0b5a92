//! Bundled PHP builtin function names.
//!
//! Loaded once per process from the packaged resource and immutable
//! thereafter. `ResourceCallsFinder` uses this set to skip calls into the
//! standard library when asked to.

use std::collections::HashSet;
use std::sync::LazyLock;

static BUILTIN_FUNCTIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    include_str!("builtin_functions.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
});

/// Whether `name` is a known PHP builtin function.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knows_common_builtins() {
        assert!(is_builtin("strlen"));
        assert!(is_builtin("array_map"));
        assert!(is_builtin("mysql_query"));
    }

    #[test]
    fn rejects_user_functions() {
        assert!(!is_builtin("my_helper"));
        assert!(!is_builtin(""));
    }
}
