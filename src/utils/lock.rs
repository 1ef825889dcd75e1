//! Lock helpers for std `RwLock`s
//!
//! Writers only ever perform a single map operation, so a poisoned lock
//! still guards consistent data; poisoning is logged and the guard recovered.

use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// Execute a closure with a read lock, automatically releasing it
pub fn with_read_lock<T, F, R>(rwlock: &RwLock<T>, f: F) -> R
where
    F: FnOnce(&T) -> R,
{
    let guard = rwlock.read().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("Read lock poisoned, recovering");
        poisoned.into_inner()
    });
    f(&guard)
}

/// Execute a closure with a write lock, automatically releasing it
pub fn with_write_lock<T, F, R>(rwlock: &RwLock<T>, f: F) -> R
where
    F: FnOnce(&mut T) -> R,
{
    let mut guard = rwlock.write().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("Write lock poisoned, recovering");
        poisoned.into_inner()
    });
    f(&mut guard)
}
