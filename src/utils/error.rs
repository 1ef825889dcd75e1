//! Error handling helpers for best-effort operations
//!
//! Used where a failure must be reported but cannot be returned, such as
//! cleanup during `Drop`.

use tracing::warn;

/// Execute an operation and log errors without failing
///
/// Returns `Some(T)` on success, `None` on error (after logging).
///
/// # Example
/// ```rust
/// use procthread::utils::log_error;
///
/// let parsed = log_error(|| "42".parse::<i32>(), "Failed to parse");
/// assert_eq!(parsed, Some(42));
/// ```
pub fn log_error<F, T, E>(operation: F, context: &str) -> Option<T>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    match operation() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: {}", context, e);
            None
        }
    }
}
