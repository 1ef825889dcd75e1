//! Process-based threads
//!
//! Registration of work, forking a child to run it, and polling or
//! signaling that child afterwards.

pub mod work;
#[cfg(unix)]
pub mod handle;
#[cfg(unix)]
pub mod monitor;
#[cfg(unix)]
pub mod spawner;

pub use work::{is_invokable, is_registered, register_work, unregister_work, Callable, Work};
#[cfg(unix)]
pub use handle::ProcessHandle;
#[cfg(unix)]
pub use monitor::{ExitState, ProcessMonitor};
#[cfg(unix)]
pub use spawner::{ProcessSpawner, CHILD_PANIC_EXIT_CODE};
