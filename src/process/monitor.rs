//! Child process liveness and termination
//!
//! Works on raw pids produced by [`ProcessSpawner`](super::ProcessSpawner).
//! Status collection is destructive: the first call that observes a
//! terminated child reaps it, after which the pid is no longer ours.

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, info};

use crate::error::ProcessError;

/// How a collected child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Exited normally with this status code
    Exited(i32),
    /// Killed by this signal
    Signaled(Signal),
}

impl ExitState {
    /// Exited with status 0
    pub fn success(&self) -> bool {
        matches!(self, ExitState::Exited(0))
    }
}

/// Polls and signals child processes
pub struct ProcessMonitor;

impl ProcessMonitor {
    /// Non-blocking status check
    ///
    /// `Ok(None)` while the child runs, `Ok(Some(state))` the first time its
    /// termination is observed (the child is reaped by this call). Fails with
    /// [`ProcessError::Wait`] when `pid` is not a child of this process,
    /// including a child that was already reaped.
    pub fn poll(pid: Pid) -> Result<Option<ExitState>, ProcessError> {
        loop {
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => return Ok(None),
                Ok(WaitStatus::Exited(_, code)) => {
                    debug!("Collected process {}: exited with {}", pid, code);
                    return Ok(Some(ExitState::Exited(code)));
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    debug!("Collected process {}: killed by {}", pid, signal);
                    return Ok(Some(ExitState::Signaled(signal)));
                }
                // Stop/continue notifications are not terminations
                Ok(other) => {
                    debug!("Process {} reported {:?}", pid, other);
                    return Ok(None);
                }
                Err(Errno::EINTR) => continue,
                Err(source) => {
                    return Err(ProcessError::Wait {
                        pid: pid.as_raw(),
                        source: source.into(),
                    })
                }
            }
        }
    }

    /// Whether `pid` is a child that has not been reported as terminated
    ///
    /// Never blocks. Returns false once termination was collected, including
    /// by this very call, and for pids that are not our children.
    pub fn is_alive(pid: Pid) -> bool {
        match Self::poll(pid) {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(e) => {
                debug!("Process {} is not a live child: {}", pid, e);
                false
            }
        }
    }

    /// Deliver `signal` to `pid`
    ///
    /// Returns false if the process no longer exists.
    pub fn signal(pid: Pid, signal: Signal) -> Result<bool, ProcessError> {
        match signal::kill(pid, signal) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(source) => Err(ProcessError::Signal {
                pid: pid.as_raw(),
                source: source.into(),
            }),
        }
    }

    /// Block until the child's termination status is collected
    ///
    /// Returns `None` if the status was already collected elsewhere.
    pub fn wait(pid: Pid) -> Result<Option<ExitState>, ProcessError> {
        loop {
            match waitpid(pid, None) {
                Ok(WaitStatus::Exited(_, code)) => {
                    debug!("Collected process {}: exited with {}", pid, code);
                    return Ok(Some(ExitState::Exited(code)));
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    debug!("Collected process {}: killed by {}", pid, signal);
                    return Ok(Some(ExitState::Signaled(signal)));
                }
                Ok(_) | Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => return Ok(None),
                Err(source) => {
                    return Err(ProcessError::Wait {
                        pid: pid.as_raw(),
                        source: source.into(),
                    })
                }
            }
        }
    }

    /// Signal `pid` if it is alive, optionally waiting for it to be reaped
    ///
    /// A process that is already gone is not an error. Returns the collected
    /// status when this call reaped the child, `None` otherwise. Without
    /// `wait` the signaled process stays a zombie until some later status
    /// collection.
    pub fn stop(pid: Pid, signal: Signal, wait: bool) -> Result<Option<ExitState>, ProcessError> {
        if !Self::is_alive(pid) {
            debug!("Process {} not alive, nothing to stop", pid);
            return Ok(None);
        }

        info!("Sending {} to process {}", signal, pid);
        if Self::signal(pid, signal)? && wait {
            return Self::wait(pid);
        }
        Ok(None)
    }

    /// Alias of [`ProcessMonitor::stop`]
    pub fn kill(pid: Pid, signal: Signal, wait: bool) -> Result<Option<ExitState>, ProcessError> {
        Self::stop(pid, signal, wait)
    }
}
