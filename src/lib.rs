#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unreachable_pub)]

//! `std::thread`-style threads for two-core bare-metal boards.
//!
//! One core (the primary) runs the application. The other core runs a worker
//! loop that takes spawned tasks from a FIFO queue and runs each one to
//! completion. A [`Thread`] handle gives the familiar lifecycle on top of that:
//! spawn, `join`, `detach`, unique ordered ids, and a hard failure if a handle
//! is dropped while its task is still owed a join or detach.
//!
//! # Features
//!
//! - `std-shim`: hosted platform (the second core is an OS thread) plus a
//!   process-wide default pool, for testing on a development machine
//!
//! # Quick Start
//!
//! ```ignore
//! use dual_core_threads::{PoolConfig, Thread, WorkerPool};
//!
//! static POOL: WorkerPool<MyBoard> = WorkerPool::new(PoolConfig::DEFAULT);
//!
//! fn app_main() {
//!     let mut t = Thread::spawn_on(&POOL, || { /* runs on core 1 */ });
//!     t.join().expect("join from the primary core");
//! }
//! ```
//!
//! # Architecture
//!
//! - [`platform`]: what the board must provide (start a core, spin, fatal)
//! - [`sched`]: the FIFO task queue and completion flags
//! - [`pool`]: the worker pool owning the queue and the worker loop
//! - [`thread`]: thread handles and ids

pub mod config;
pub mod errors;
pub mod platform;
pub mod pool;
pub mod sched;
pub mod thread;

#[cfg(any(test, feature = "std-shim"))]
extern crate std;

extern crate alloc;

// ============================================================================
// Public API
// ============================================================================

// Platform abstraction
pub use platform::{CoreEntry, CoreId, Platform, HARDWARE_CONCURRENCY};

#[cfg(any(test, feature = "std-shim"))]
pub use platform::HostPlatform;

// Pool
pub use config::PoolConfig;
pub use pool::{PoolStats, WorkerPool, WorkerState};

#[cfg(any(test, feature = "std-shim"))]
pub use pool::default_pool;

// Threads
pub use thread::{hardware_concurrency, Thread, ThreadId};

// Errors
pub use errors::{ConfigError, DeadlockError, FatalError, InvalidOperationError, ThreadError, ThreadResult};
