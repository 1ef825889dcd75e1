//! Shared helpers for process tests

#![allow(dead_code)]

use procthread::ProcessHandle;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound for a child that should finish promptly
pub const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll until the child has been reaped, or give up after `limit`
pub fn wait_for_exit<A: 'static>(handle: &mut ProcessHandle<A>, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while handle.is_alive() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    true
}

/// Contents a child wrote to `path`, or an empty string if it wrote nothing
pub fn read_marker(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
