//! Child process creation
//!
//! Duplicates the calling process with `fork(2)`. The parent gets the child's
//! pid back immediately; the child runs the work and exits without returning
//! into the caller's code.

use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use nix::unistd::{fork, ForkResult, Pid};
use tracing::{info, warn};

use crate::error::ProcessError;
use crate::process::work::Work;

/// Exit code of a child whose work panicked
pub const CHILD_PANIC_EXIT_CODE: i32 = 101;

/// Creates child processes that run a [`Work`]
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Fork and run `work(args)` in the child
    ///
    /// Returns the child's pid in the parent without waiting for the work.
    /// The child exits with `EXIT_SUCCESS` once the work returns, or with
    /// [`CHILD_PANIC_EXIT_CODE`] if it panics. Nothing from the child is
    /// reported back except its exit status.
    pub fn spawn<A>(work: &Work<A>, args: A) -> Result<Pid, ProcessError> {
        // Unflushed output would otherwise be written by both processes
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        // SAFETY: the child only runs the registered work and then `_exit`s;
        // it never returns into the parent's stack frames.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                info!(
                    "Spawned process {} (work: {})",
                    child,
                    work.name().unwrap_or("<anonymous>")
                );
                Ok(child)
            }
            Ok(ForkResult::Child) => run_child(work, args),
            Err(errno) => {
                warn!("fork() failed: {}", errno);
                Err(ProcessError::CouldNotFork(errno.into()))
            }
        }
    }
}

/// Child side of the fork. Does not log: locks held by other parent
/// threads at fork time are never released in the child.
fn run_child<A>(work: &Work<A>, args: A) -> ! {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| work.call(args)));

    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    let code = match outcome {
        Ok(()) => libc::EXIT_SUCCESS,
        Err(_) => CHILD_PANIC_EXIT_CODE,
    };
    // SAFETY: `_exit` ends the process without running destructors or
    // atexit handlers inherited from the parent.
    unsafe { libc::_exit(code) }
}
