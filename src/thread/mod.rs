//! Thread handles and identities.
//!
//! A [`Thread`] is created by spawning: the callable is bound, given a fresh
//! [`ThreadId`], and queued for the worker core. The handle then waits for it
//! (`join`) or lets it go (`detach`).

pub mod handle;
pub mod id;

pub use handle::Thread;
pub use id::{IdGenerator, ThreadId};

/// Number of parallel execution contexts on the board: always 2.
pub const fn hardware_concurrency() -> usize {
    crate::platform::HARDWARE_CONCURRENCY
}
