//! Engine warnings with colored terminal output.
//!
//! Provides deduplication so a stylesheet that is recompiled on every DOM
//! mutation does not print the same skipped rule over and over. Used by the
//! stylesheet compiler and the CLI.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record a warning for `component`, returning `true` the first time the
/// exact message is seen.
///
/// A poisoned lock is recovered rather than propagated: losing a dedupe entry
/// only means a warning may print twice.
fn record(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about a rejected rule or unsupported input (prints once per unique
/// message).
///
/// # Example
/// ```ignore
/// warn_once("ExtCSS", "div[..banner] { display: none; }: invalid selector");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(component, message) {
        let line = format!("[extcss {component}] ⚠ {message}");
        eprintln!("{}", line.yellow());
    }
}

/// Returns `true` if a warning with this component and message was already
/// reported since the last [`clear_warnings`].
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call before compiling a new stylesheet set)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deduplicates() {
        assert!(record("test-dedupe", "first"));
        assert!(!record("test-dedupe", "first"));
        assert!(record("test-dedupe", "second"));
        assert!(was_warned("test-dedupe", "second"));
        assert!(!was_warned("test-dedupe", "never"));
    }
}
