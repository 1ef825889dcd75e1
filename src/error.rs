//! Error codes, the process-wide message catalog, and the library error type
//!
//! The catalog is a compile-time table: it is never copied per handle and
//! never mutated.

use std::borrow::Cow;
use std::fmt;
use std::io;

use thiserror::Error;

/// Numeric failure codes with catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// The supplied work is not invokable in the current scope
    FunctionNotCallable = 10,
    /// The OS refused to duplicate the process
    CouldNotFork = 15,
}

/// One (code, message) pair of the catalog
#[derive(Debug, Clone, Copy)]
pub struct ErrorEntry {
    pub code: ErrorCode,
    pub message: &'static str,
}

/// All documented failure messages
///
/// The wording is deliberately not the historical one: the fork message names
/// plain `fork()` instead of the `pcntl_` wrapper, and the unknown-code
/// placeholder produced by [`message_for`] drops its trailing exclamations.
pub static ERROR_CATALOG: &[ErrorEntry] = &[
    ErrorEntry {
        code: ErrorCode::FunctionNotCallable,
        message: "You must specify a valid function name that can be called from the current scope.",
    },
    ErrorEntry {
        code: ErrorCode::CouldNotFork,
        message: "fork() returned a status of -1. No new process was created",
    },
];

impl ErrorCode {
    /// Numeric value of the code
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map a raw number back to a known code
    pub fn from_code(code: i32) -> Option<Self> {
        ERROR_CATALOG
            .iter()
            .map(|entry| entry.code)
            .find(|known| known.as_i32() == code)
    }

    /// Documented message for this code
    pub fn message(self) -> &'static str {
        ERROR_CATALOG
            .iter()
            .find(|entry| entry.code == self)
            .map(|entry| entry.message)
            .unwrap_or("")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Look up the message for a numeric code
///
/// Unknown codes get a placeholder naming the code; this lookup never fails.
pub fn message_for(code: i32) -> Cow<'static, str> {
    match ErrorCode::from_code(code) {
        Some(known) => Cow::Borrowed(known.message()),
        None => Cow::Owned(format!("No such error code {}", code)),
    }
}

/// Errors returned by process handles
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Registration was given something that does not resolve to a function
    #[error("{}", ErrorCode::FunctionNotCallable.message())]
    NotCallable {
        /// Name that failed to resolve, if the candidate was a name
        name: Option<String>,
    },

    /// `fork()` failed; no child exists
    #[error("{}", ErrorCode::CouldNotFork.message())]
    CouldNotFork(#[source] io::Error),

    /// `spawn` called before any work was registered
    #[error("No work registered for this handle")]
    NoWork,

    /// `spawn` called on a handle that already owns a child
    #[error("Handle already spawned process {0}")]
    AlreadySpawned(i32),

    /// Signal delivery refused by the OS
    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: io::Error,
    },

    /// Status collection failed, e.g. because `pid` is not our child
    #[error("Failed to collect status of process {pid}: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    /// Catalog code for the two documented failure kinds
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ProcessError::NotCallable { .. } => Some(ErrorCode::FunctionNotCallable),
            ProcessError::CouldNotFork(_) => Some(ErrorCode::CouldNotFork),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_messages() {
        assert_eq!(
            message_for(10),
            "You must specify a valid function name that can be called from the current scope."
        );
        assert_eq!(
            message_for(15),
            "fork() returned a status of -1. No new process was created"
        );
    }

    #[test]
    fn test_unknown_code_placeholder() {
        let message = message_for(9999);
        assert!(message.contains("9999"));
        assert_eq!(message, "No such error code 9999");
    }

    #[test]
    fn test_code_round_trip() {
        for entry in ERROR_CATALOG {
            assert_eq!(ErrorCode::from_code(entry.code.as_i32()), Some(entry.code));
            assert_eq!(entry.code.message(), entry.message);
        }
        assert_eq!(ErrorCode::from_code(0), None);
    }

    #[test]
    fn test_error_display_uses_catalog() {
        let err = ProcessError::NotCallable {
            name: Some("missing".to_string()),
        };
        assert_eq!(err.to_string(), ErrorCode::FunctionNotCallable.message());
        assert_eq!(err.code(), Some(ErrorCode::FunctionNotCallable));
        assert_eq!(ProcessError::NoWork.code(), None);
    }

    #[test]
    fn test_fork_error_code() {
        let err = ProcessError::CouldNotFork(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(err.code(), Some(ErrorCode::CouldNotFork));
        assert_eq!(err.to_string(), ErrorCode::CouldNotFork.message());
    }
}
