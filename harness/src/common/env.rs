//! # Environment Lookups (`common::env`)
//!
//! File: harness/src/common/env.rs
//! Author: Christi Mahu
//!
//! Tests that check credential or variable propagation compare what the
//! subject saw against what the test process has.

/// Returns the value of `key` in the ambient environment, or an empty string
/// when it is unset or not valid UTF-8.
pub fn get_env(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variable_is_empty() {
        assert_eq!(get_env("COMMON_TESTS_SURELY_UNSET_VARIABLE"), "");
    }

    #[test]
    fn test_set_variable_is_returned() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(get_env("PATH"), path);
    }
}
