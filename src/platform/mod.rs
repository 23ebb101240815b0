//! Platform abstraction for starting the second core and busy-waiting.
//!
//! The threading layer never touches hardware directly. Board support code
//! implements [`Platform`] to tell it how to launch the worker core, how to
//! spin politely, which core is currently executing, and how to die.

use crate::errors::FatalError;
use alloc::boxed::Box;
use portable_atomic::{AtomicU64, Ordering};

#[cfg(any(test, feature = "std-shim"))]
pub mod host;

#[cfg(any(test, feature = "std-shim"))]
pub use host::HostPlatform;

/// Core identifier type.
pub type CoreId = usize;

/// Core that boots, spawns and joins.
pub const PRIMARY_CORE: CoreId = 0;

/// Core that runs the worker loop.
pub const SECONDARY_CORE: CoreId = 1;

/// Number of parallel execution contexts on the supported boards.
pub const HARDWARE_CONCURRENCY: usize = 2;

/// Largest core id a worker can be placed on, plus one.
pub const MAX_CORES: usize = 64;

/// Cores that have been handed to a worker pool, one bit per core.
static CLAIMED_CORES: AtomicU64 = AtomicU64::new(0);

/// Entry routine handed to [`Platform::start_core`]. It never returns.
pub type CoreEntry = Box<dyn FnOnce() + Send + 'static>;

/// Platform abstraction trait.
///
/// All functions are associated functions: a platform is a zero-sized marker
/// selecting the implementation at compile time.
///
/// # Contract
///
/// - `start_core` is called at most once per core for the whole process.
///   Pools enforce this through [`claim_core`] before starting anything.
/// - `spin_yield` must be safe to call in a tight loop from either core.
/// - `current_core` must be callable from any context, including from inside
///   the entry routine.
pub trait Platform: 'static {
    /// Begin executing `entry` on `core`.
    ///
    /// The entry routine runs the worker loop and never returns. The platform
    /// must not call it more than once.
    fn start_core(core: CoreId, entry: CoreEntry);

    /// Spin-wait hint used inside every busy-wait loop.
    ///
    /// On bare metal this is typically `nop`/`yield`; hosted platforms may
    /// give the OS scheduler a chance to run the other core.
    fn spin_yield();

    /// The core the caller is currently executing on.
    fn current_core() -> CoreId;

    /// Terminate the whole system. Called after the error has been logged.
    fn fatal(error: &FatalError) -> !;
}

/// Log `error` and hand it to the platform's termination routine.
#[cold]
pub fn fatal<P: Platform>(error: FatalError) -> ! {
    log::error!("fatal: {}", error);
    P::fatal(&error)
}

/// Claim `core` for a worker loop, once per process.
///
/// Returns `true` for the first caller naming a core and `false` for every
/// later one, whichever pool or platform type they belong to. Core ids at or
/// above [`MAX_CORES`] can never be claimed.
pub fn claim_core(core: CoreId) -> bool {
    if core >= MAX_CORES {
        return false;
    }

    let bit = 1u64 << core;
    CLAIMED_CORES.fetch_or(bit, Ordering::AcqRel) & bit == 0
}

/// Check whether `core` already runs (or is starting) a worker loop.
pub fn is_core_claimed(core: CoreId) -> bool {
    core < MAX_CORES && CLAIMED_CORES.load(Ordering::Acquire) & (1u64 << core) != 0
}
