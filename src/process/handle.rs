//! Thread-like handle over one forked child process

use std::fmt;

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tracing::debug;

use crate::config::{DropPolicy, ProcessConfig, DEFAULT_STOP_SIGNAL};
use crate::error::ProcessError;
use crate::process::monitor::{ExitState, ProcessMonitor};
use crate::process::spawner::ProcessSpawner;
use crate::process::work::{is_invokable, Callable, Work};
use crate::utils::log_error;

/// Where the handle's child is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildStatus {
    Unspawned,
    Running(Pid),
    /// Termination was collected. `exit` is `None` when the status was
    /// collected by someone else, so it is unknown.
    Collected { pid: Pid, exit: Option<ExitState> },
}

/// Runs one unit of work in a forked child process
///
/// `A` is the argument tuple passed to the work by [`spawn`](Self::spawn).
/// A handle spawns at most once. Dropping it does not touch the child unless
/// the configured [`DropPolicy`] says so; with the default policy, reaping
/// the child is the caller's job.
///
/// # Example
/// ```rust,no_run
/// use procthread::{Callable, ProcessHandle};
///
/// let mut handle = ProcessHandle::with_work(Callable::func(|(a, b): (i32, i32)| {
///     let _ = a + b;
/// }))?;
/// handle.spawn((1, 2))?;
/// while handle.is_alive() {
///     std::thread::sleep(std::time::Duration::from_millis(10));
/// }
/// # Ok::<(), procthread::ProcessError>(())
/// ```
pub struct ProcessHandle<A = ()> {
    work: Option<Work<A>>,
    status: ChildStatus,
    stop_signal: Signal,
    on_drop: DropPolicy,
}

impl<A: 'static> ProcessHandle<A> {
    /// Handle with no work and the default configuration
    pub fn new() -> Self {
        Self {
            work: None,
            status: ChildStatus::Unspawned,
            stop_signal: DEFAULT_STOP_SIGNAL,
            on_drop: DropPolicy::Detach,
        }
    }

    /// Handle with `candidate` already registered
    pub fn with_work(candidate: Callable<A>) -> Result<Self, ProcessError> {
        let mut handle = Self::new();
        handle.set_work(candidate)?;
        Ok(handle)
    }

    /// Handle using the stop signal and drop policy from `config`
    pub fn with_config(config: &ProcessConfig) -> anyhow::Result<Self> {
        let mut handle = Self::new();
        handle.stop_signal = config.stop_signal()?;
        handle.on_drop = config.on_drop;
        Ok(handle)
    }

    /// Whether `candidate` could be registered on a handle of this type
    pub fn is_invokable(candidate: &Callable<A>) -> bool {
        is_invokable(candidate)
    }

    /// Register the work to run in the child
    ///
    /// On failure the previously registered work is kept.
    pub fn set_work(&mut self, candidate: Callable<A>) -> Result<(), ProcessError> {
        match candidate.resolve() {
            Some(work) => {
                self.work = Some(work);
                Ok(())
            }
            None => {
                debug!("Rejected work {:?}: not invokable", candidate.name());
                Err(ProcessError::NotCallable {
                    name: candidate.name().map(str::to_string),
                })
            }
        }
    }

    /// Currently registered work
    pub fn work(&self) -> Option<&Work<A>> {
        self.work.as_ref()
    }

    /// Fork a child that runs the registered work with `args`
    ///
    /// Returns as soon as the child exists. Fails with
    /// [`ProcessError::NoWork`] if nothing is registered and with
    /// [`ProcessError::AlreadySpawned`] on a second call.
    pub fn spawn(&mut self, args: A) -> Result<Pid, ProcessError> {
        if let Some(pid) = self.pid() {
            return Err(ProcessError::AlreadySpawned(pid.as_raw()));
        }
        let work = self.work.as_ref().ok_or(ProcessError::NoWork)?;

        let pid = ProcessSpawner::spawn(work, args)?;
        self.status = ChildStatus::Running(pid);
        Ok(pid)
    }

    /// The child's pid, once spawned
    pub fn pid(&self) -> Option<Pid> {
        match self.status {
            ChildStatus::Unspawned => None,
            ChildStatus::Running(pid) | ChildStatus::Collected { pid, .. } => Some(pid),
        }
    }

    /// Non-blocking liveness check
    ///
    /// The first call that observes termination reaps the child and records
    /// its [`exit_state`](Self::exit_state); after that the pid is never
    /// polled or signaled again, since the OS may reuse it.
    pub fn is_alive(&mut self) -> bool {
        let pid = match self.status {
            ChildStatus::Running(pid) => pid,
            _ => return false,
        };

        match ProcessMonitor::poll(pid) {
            Ok(None) => true,
            Ok(Some(exit)) => {
                self.status = ChildStatus::Collected {
                    pid,
                    exit: Some(exit),
                };
                false
            }
            Err(e) => {
                debug!("Lost track of process {}: {}", pid, e);
                self.status = ChildStatus::Collected { pid, exit: None };
                false
            }
        }
    }

    /// How the child terminated, once its status was collected by this handle
    pub fn exit_state(&self) -> Option<ExitState> {
        match self.status {
            ChildStatus::Collected { exit, .. } => exit,
            _ => None,
        }
    }

    /// Signal the child if it is alive
    ///
    /// `signal` defaults to the configured stop signal. With `wait`, blocks
    /// until the child is reaped. Stopping a child that is not alive (or a
    /// handle that never spawned) does nothing.
    pub fn stop(&mut self, signal: Option<Signal>, wait: bool) -> Result<(), ProcessError> {
        if !self.is_alive() {
            return Ok(());
        }
        let pid = match self.status {
            ChildStatus::Running(pid) => pid,
            _ => return Ok(()),
        };
        let signal = signal.unwrap_or(self.stop_signal);

        debug!("Stopping process {} with {} (wait: {})", pid, signal, wait);
        let delivered = ProcessMonitor::signal(pid, signal)?;
        if delivered && wait {
            let exit = ProcessMonitor::wait(pid)?;
            self.status = ChildStatus::Collected { pid, exit };
        }
        Ok(())
    }

    /// Alias of [`stop`](Self::stop)
    pub fn kill(&mut self, signal: Option<Signal>, wait: bool) -> Result<(), ProcessError> {
        self.stop(signal, wait)
    }

    /// Signal used by `stop`/`kill` when none is given
    pub fn stop_signal(&self) -> Signal {
        self.stop_signal
    }

    /// What happens to a running child when this handle is dropped
    pub fn on_drop(&self) -> DropPolicy {
        self.on_drop
    }
}

impl<A: 'static> Default for ProcessHandle<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for ProcessHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("work", &self.work)
            .field("status", &self.status)
            .field("stop_signal", &self.stop_signal)
            .field("on_drop", &self.on_drop)
            .finish()
    }
}

impl<A> Drop for ProcessHandle<A> {
    fn drop(&mut self) {
        let pid = match self.status {
            ChildStatus::Running(pid) => pid,
            _ => return,
        };

        match self.on_drop {
            DropPolicy::Detach => {
                debug!("Dropping handle; process {} left to the caller", pid);
            }
            DropPolicy::Reap => {
                if ProcessMonitor::is_alive(pid) {
                    debug!("Dropping handle; process {} still running", pid);
                }
            }
            DropPolicy::Kill => {
                if let Some(Some(exit)) = log_error(
                    || ProcessMonitor::stop(pid, self.stop_signal, true),
                    "Failed to stop process on drop",
                ) {
                    debug!("Dropping handle; process {} collected: {:?}", pid, exit);
                }
            }
        }
    }
}
