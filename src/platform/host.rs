//! Hosted platform for testing on non-embedded targets.
//!
//! The second core is emulated by a dedicated OS thread named after the core
//! it stands in for. Core identity is tracked with a thread-local so that
//! self-join detection works exactly as it does on hardware.

use super::{CoreEntry, CoreId, Platform, PRIMARY_CORE};
use crate::errors::FatalError;
use core::cell::Cell;

std::thread_local! {
    static CURRENT_CORE: Cell<CoreId> = const { Cell::new(PRIMARY_CORE) };
}

/// Platform backed by `std::thread`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn start_core(core: CoreId, entry: CoreEntry) {
        let spawned = std::thread::Builder::new()
            .name(alloc::format!("core{}", core))
            .spawn(move || {
                CURRENT_CORE.with(|current| current.set(core));
                entry();
            });

        // The JoinHandle is dropped; the emulated core lives until exit.
        if let Err(err) = spawned {
            log::error!("failed to start core {}: {}", core, err);
            std::process::abort();
        }
    }

    #[inline]
    fn spin_yield() {
        core::hint::spin_loop();
        std::thread::yield_now();
    }

    fn current_core() -> CoreId {
        CURRENT_CORE.with(Cell::get)
    }

    fn fatal(_error: &FatalError) -> ! {
        std::process::abort()
    }
}
