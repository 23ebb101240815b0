//! Thread identities.

use core::fmt;
use core::num::NonZeroU64;
use portable_atomic::{AtomicU64, Ordering};

/// Process-wide allocator behind [`ThreadId`]s.
static GLOBAL_IDS: IdGenerator = IdGenerator::new();

/// Opaque identity of a spawned thread.
///
/// Ids are totally ordered by allocation: a thread spawned later always has a
/// greater id. They are never reused, even after the handle is gone. The value
/// 0 is reserved for the primary context and is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(NonZeroU64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ThreadId {
    #[cfg(test)]
    pub(crate) fn new(id: u64) -> Self {
        Self(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    /// Get the ID as u64.
    pub fn as_u64(self) -> u64 {
        self.0.get()
    }
}

/// Monotonic id counter.
///
/// Handles draw from [`IdGenerator::global`]; separate generators exist only
/// for tests and tools that want an isolated sequence.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first id is 1.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Generator whose next id is `next`.
    #[cfg(test)]
    const fn starting_at(next: u64) -> Self {
        Self {
            next: AtomicU64::new(next),
        }
    }

    /// The generator shared by every handle in the process.
    pub fn global() -> &'static IdGenerator {
        &GLOBAL_IDS
    }

    /// Allocate the next id. Every call returns a strictly larger id than all
    /// previous calls on this generator.
    ///
    /// # Panics
    ///
    /// Panics once `u64::MAX` has been handed out. The counter parks at 0
    /// instead of wrapping, so ids are never reused.
    pub fn allocate(&self) -> ThreadId {
        let id = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next != 0).then_some(next.wrapping_add(1))
            })
            .ok()
            .and_then(NonZeroU64::new);

        match id {
            Some(id) => ThreadId(id),
            None => panic!("thread id space exhausted"),
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
