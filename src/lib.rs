//! procthread - process-based thread emulation
//!
//! Runs a unit of work in a child process created with `fork(2)` and lets the
//! caller poll and terminate it like a thread. Meant for code that wants OS
//! level isolation per task, or runs where in-process threads are unsuitable.
//!
//! ## Model
//!
//! 1. Register the work on a [`ProcessHandle`] (a closure, or a name from the
//!    work scope filled by [`register_work`])
//! 2. [`ProcessHandle::spawn`] forks; the child runs the work and exits
//! 3. Poll with [`ProcessHandle::is_alive`], end it with [`ProcessHandle::stop`]
//!
//! The child gets a copy-on-write snapshot of the parent's memory. Nothing
//! flows back: no return values, no panics, only the exit status.
//!
//! Terminated children must be reaped. `is_alive` and `stop(.., wait = true)`
//! do this; dropping a handle does not, unless its [`DropPolicy`] asks for it.
//!
//! Check [`available`] before using any of this.

pub mod config;
pub mod error;
pub mod process;
pub mod utils;

pub use config::{DropPolicy, LoggingConfig, ProcessConfig};
pub use error::{message_for, ErrorCode, ErrorEntry, ProcessError, ERROR_CATALOG};
pub use process::{is_invokable, register_work, unregister_work, Callable, Work};
#[cfg(unix)]
pub use process::{ExitState, ProcessHandle, ProcessMonitor, ProcessSpawner};

#[cfg(unix)]
pub use nix::sys::signal::Signal;
#[cfg(unix)]
pub use nix::unistd::Pid;

/// Whether fork, non-blocking waitpid and kill exist on this platform
///
/// Everything in [`process`] except work registration requires this to be
/// true; nothing degrades gracefully when it is false.
pub fn available() -> bool {
    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_matches_platform() {
        assert_eq!(available(), cfg!(unix));
    }
}
