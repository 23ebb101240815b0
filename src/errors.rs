//! Error handling for the threading system.
//!
//! Two kinds of failure exist. Recoverable ones ([`ThreadError`]) are returned
//! to the caller of `join()`/`detach()` and leave the handle untouched.
//! Unrecoverable ones ([`FatalError`]) are never returned: they are handed to
//! [`Platform::fatal`](crate::platform::Platform::fatal), which ends the process.

#![allow(clippy::uninlined_format_args)]

use crate::platform::CoreId;
use crate::thread::ThreadId;
use core::fmt;

/// Result type for threading operations.
pub type ThreadResult<T> = Result<T, ThreadError>;

/// POSIX `EINVAL`.
pub const EINVAL: i32 = 22;

/// POSIX `EDEADLK`.
pub const EDEADLK: i32 = 35;

/// Error type for recoverable thread handle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadError {
    /// The handle is not in a state that allows the operation
    InvalidOperation(InvalidOperationError),
    /// The operation could never complete
    Deadlock(DeadlockError),
}

/// Operations attempted on a handle in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperationError {
    /// join()/detach() on a handle that was already joined or detached
    NotJoinable(ThreadId),
}

/// Joins that would spin forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlockError {
    /// join() called from the worker core, which is the only core that could
    /// ever run the awaited task
    JoinFromWorker {
        /// Thread that was being joined
        thread: ThreadId,
        /// Core the join was attempted from
        core: CoreId,
    },
}

/// Process-ending invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// A handle was dropped while still joinable
    JoinableDropped(ThreadId),
    /// A task unwound out of its callable on the worker core
    TaskPanicked(ThreadId),
    /// A pool needed a worker core that another pool already started
    CoreInUse(CoreId),
}

/// Invalid pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The worker was assigned to the core that spawns and joins
    WorkerOnPrimaryCore,
    /// The worker core id is beyond what the core registry can track
    CoreOutOfRange(CoreId),
    /// Another pool has already started a worker on this core
    CoreInUse(CoreId),
}

impl ThreadError {
    /// POSIX error code equivalent, matching `std::errc` reporting on
    /// hosted systems.
    pub fn errno(&self) -> i32 {
        match self {
            ThreadError::InvalidOperation(_) => EINVAL,
            ThreadError::Deadlock(_) => EDEADLK,
        }
    }

    /// Check if this is an invalid-operation error.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, ThreadError::InvalidOperation(_))
    }

    /// Check if this is a deadlock error.
    pub fn is_deadlock(&self) -> bool {
        matches!(self, ThreadError::Deadlock(_))
    }
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::InvalidOperation(e) => write!(f, "Invalid operation: {}", e),
            ThreadError::Deadlock(e) => write!(f, "Resource deadlock would occur: {}", e),
        }
    }
}

impl fmt::Display for InvalidOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidOperationError::NotJoinable(id) => write!(f, "thread {} is not joinable", id),
        }
    }
}

impl fmt::Display for DeadlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadlockError::JoinFromWorker { thread, core } => {
                write!(f, "thread {} joined from worker core {}", thread, core)
            }
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::JoinableDropped(id) => {
                write!(f, "thread {} dropped while still joinable", id)
            }
            FatalError::TaskPanicked(id) => write!(f, "thread {} panicked on the worker core", id),
            FatalError::CoreInUse(core) => write!(f, "core {} already runs another worker pool", core),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WorkerOnPrimaryCore => write!(f, "worker core must not be the primary core"),
            ConfigError::CoreOutOfRange(core) => write!(f, "core {} is out of range", core),
            ConfigError::CoreInUse(core) => write!(f, "core {} already runs a worker pool", core),
        }
    }
}

impl From<InvalidOperationError> for ThreadError {
    fn from(error: InvalidOperationError) -> Self {
        ThreadError::InvalidOperation(error)
    }
}

impl From<DeadlockError> for ThreadError {
    fn from(error: DeadlockError) -> Self {
        ThreadError::Deadlock(error)
    }
}
