//! Worker pool coordinating the primary core and the worker core.
//!
//! This module provides the [`WorkerPool`] struct that owns the task queue
//! and the one-shot start-up of the worker loop on the second core.

use crate::config::PoolConfig;
use crate::errors::{ConfigError, FatalError};
use crate::platform::{self, CoreId, Platform};
use crate::sched::{TaskQueue, TaskRecord};
use crate::thread::ThreadId;
use alloc::boxed::Box;
use core::marker::PhantomData;
use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

#[cfg(any(test, feature = "std-shim"))]
use crate::platform::HostPlatform;

/// Process-wide pool used by [`Thread::spawn`](crate::thread::Thread::spawn).
#[cfg(any(test, feature = "std-shim"))]
static DEFAULT_POOL: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::DEFAULT);

/// Get the process-wide pool on the hosted platform.
#[cfg(any(test, feature = "std-shim"))]
pub fn default_pool() -> &'static WorkerPool<HostPlatform> {
    &DEFAULT_POOL
}

const NOT_STARTED: u8 = 0;
const STARTING: u8 = 1;
const RUNNING: u8 = 2;

/// Lifecycle of the worker loop. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// No task has been spawned yet
    NotStarted = NOT_STARTED,
    /// The worker core has been asked to start but has not checked in
    Starting = STARTING,
    /// The worker loop is draining the queue; terminal
    Running = RUNNING,
}

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Tasks submitted since the pool was created
    pub spawned: usize,
    /// Tasks whose callable has returned
    pub completed: usize,
    /// Tasks waiting in the queue (not including one being run)
    pub pending: usize,
}

/// Owner of the task queue and the worker core.
///
/// A pool is meant to live in a `static` and be referenced by every thread
/// handle spawned on it. The worker loop is started lazily by the first
/// submission and then runs for the rest of the program.
///
/// # Type Parameters
///
/// * `P` - Platform implementation used to start the core and spin
pub struct WorkerPool<P: Platform> {
    /// Pending tasks, oldest first
    queue: TaskQueue,
    /// `WorkerState` as a raw byte
    state: AtomicU8,
    config: PoolConfig,
    spawned: AtomicUsize,
    completed: AtomicUsize,
    /// Platform marker (zero-sized)
    _platform: PhantomData<fn() -> P>,
}

impl<P: Platform> WorkerPool<P> {
    /// Create a new pool. Nothing runs until the first submission.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (see [`PoolConfig::validate`]).
    /// In a `static` initialiser this is a compile-time error.
    pub const fn new(config: PoolConfig) -> Self {
        if config.validate().is_err() {
            panic!("invalid worker pool configuration");
        }

        Self {
            queue: TaskQueue::new(),
            state: AtomicU8::new(NOT_STARTED),
            config,
            spawned: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            _platform: PhantomData,
        }
    }

    /// Create a new pool, rejecting an invalid configuration or a worker
    /// core that another pool has already started.
    pub fn try_new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if platform::is_core_claimed(config.get_worker_core()) {
            return Err(ConfigError::CoreInUse(config.get_worker_core()));
        }
        Ok(Self::new(config))
    }

    /// Configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Core that runs (or will run) the worker loop.
    pub fn worker_core(&self) -> CoreId {
        self.config.get_worker_core()
    }

    /// Check whether the caller is executing on this pool's worker core.
    pub fn is_worker_context(&self) -> bool {
        P::current_core() == self.worker_core()
    }

    /// Current lifecycle state of the worker loop.
    pub fn state(&self) -> WorkerState {
        match self.state.load(Ordering::Acquire) {
            NOT_STARTED => WorkerState::NotStarted,
            STARTING => WorkerState::Starting,
            _ => WorkerState::Running,
        }
    }

    /// Check if the worker loop is running.
    pub fn is_started(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Start the worker loop if nobody has yet.
    ///
    /// Exactly one caller wins the race, claims the worker core for the
    /// process and asks the platform to start it; everyone (winner included)
    /// then spins until the worker checks in.
    ///
    /// # Errors
    ///
    /// * `CoreInUse` - another pool already owns the worker core; the core
    ///   is not started a second time and this pool stays `NotStarted`
    pub fn try_start(&'static self) -> Result<(), ConfigError> {
        loop {
            match self.state.load(Ordering::Acquire) {
                RUNNING => return Ok(()),
                STARTING => P::spin_yield(),
                _ => {
                    if self
                        .state
                        .compare_exchange(NOT_STARTED, STARTING, Ordering::AcqRel, Ordering::Acquire)
                        .is_err()
                    {
                        continue;
                    }

                    let core = self.worker_core();
                    if !platform::claim_core(core) {
                        self.state.store(NOT_STARTED, Ordering::Release);
                        log::warn!("core {} already runs another worker pool", core);
                        return Err(ConfigError::CoreInUse(core));
                    }

                    self.queue.reserve(self.config.get_queue_capacity());
                    P::start_core(
                        core,
                        Box::new(move || {
                            self.run_worker();
                        }),
                    );
                }
            }
        }
    }

    /// Start the worker loop if nobody has yet.
    ///
    /// A pool whose worker core belongs to another pool cannot run anything,
    /// so that case is fatal (`FatalError::CoreInUse`).
    pub fn ensure_started(&'static self) {
        if self.try_start().is_err() {
            platform::fatal::<P>(FatalError::CoreInUse(self.worker_core()));
        }
    }

    /// Queue a task for the worker, starting the worker first if needed.
    pub fn submit(&'static self, task: TaskRecord) {
        self.ensure_started();
        self.spawned.fetch_add(1, Ordering::Relaxed);
        self.queue.push(task);
    }

    /// Get current pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            spawned: self.spawned.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Acquire),
            pending: self.queue.len(),
        }
    }

    /// Worker loop body. Runs on the worker core and never returns.
    fn run_worker(&'static self) -> ! {
        self.state.store(RUNNING, Ordering::Release);
        log::info!("worker loop started on core {}", self.worker_core());

        loop {
            let task = self.queue.pop_blocking::<P>();
            let guard = FatalOnUnwind::<P>::new(task.id());
            task.run();
            guard.disarm();
            self.completed.fetch_add(1, Ordering::Release);
        }
    }
}

// Safety net for tasks that unwind: the worker core would otherwise die
// quietly and every later join would spin forever.
struct FatalOnUnwind<P: Platform> {
    id: ThreadId,
    _platform: PhantomData<fn() -> P>,
}

impl<P: Platform> FatalOnUnwind<P> {
    fn new(id: ThreadId) -> Self {
        Self {
            id,
            _platform: PhantomData,
        }
    }

    fn disarm(self) {
        core::mem::forget(self);
    }
}

impl<P: Platform> Drop for FatalOnUnwind<P> {
    fn drop(&mut self) {
        platform::fatal::<P>(FatalError::TaskPanicked(self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PRIMARY_CORE;
    use crate::sched::CompletionFlag;
    use crate::thread::IdGenerator;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use portable_atomic::AtomicU64;

    fn wait_for(flag: &CompletionFlag) {
        while !flag.is_complete() {
            HostPlatform::spin_yield();
        }
    }

    // Core 1 belongs to the default pool; every pool below gets its own core.

    #[test]
    fn test_lazy_start() {
        static POOL: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::new().worker_core(2));

        assert_eq!(POOL.state(), WorkerState::NotStarted);
        assert!(!POOL.is_started());

        POOL.ensure_started();
        assert_eq!(POOL.state(), WorkerState::Running);

        // Second call is a no-op.
        POOL.ensure_started();
        assert!(POOL.is_started());
        assert!(!POOL.is_worker_context());
    }

    #[test]
    fn test_tasks_run_in_submission_order() {
        static POOL: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::new().worker_core(3));

        let order = Arc::new(spin::Mutex::new(Vec::new()));
        let mut flags = Vec::new();

        for i in 0..16u32 {
            let order = order.clone();
            let (worker_half, handle_half) = CompletionFlag::pair();
            POOL.submit(TaskRecord::new(
                IdGenerator::global().allocate(),
                move || order.lock().push(i),
                worker_half,
            ));
            flags.push(handle_half);
        }

        for flag in &flags {
            wait_for(flag);
        }
        assert_eq!(*order.lock(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_stats() {
        static POOL: WorkerPool<HostPlatform> =
            WorkerPool::new(PoolConfig::new().worker_core(4).queue_capacity(4));

        assert_eq!(POOL.stats(), PoolStats::default());

        let (worker_half, handle_half) = CompletionFlag::pair();
        POOL.submit(TaskRecord::new(IdGenerator::global().allocate(), || {}, worker_half));
        wait_for(&handle_half);

        while POOL.stats().completed < 1 {
            HostPlatform::spin_yield();
        }
        let stats = POOL.stats();
        assert_eq!(stats.spawned, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_worker_context_detection() {
        static POOL: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::new().worker_core(5));

        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = seen.clone();
        let (worker_half, handle_half) = CompletionFlag::pair();
        POOL.submit(TaskRecord::new(
            IdGenerator::global().allocate(),
            move || {
                let on_worker = POOL.is_worker_context() as u64;
                let core = HostPlatform::current_core() as u64;
                seen_clone.store((on_worker << 8) | core, Ordering::Relaxed);
            },
            worker_half,
        ));
        wait_for(&handle_half);

        assert_eq!(seen.load(Ordering::Relaxed), (1 << 8) | 5);
        assert_eq!(HostPlatform::current_core(), PRIMARY_CORE);
    }

    #[test]
    fn test_try_new_validates() {
        let bad = PoolConfig::new().worker_core(PRIMARY_CORE);
        assert_eq!(
            WorkerPool::<HostPlatform>::try_new(bad).err(),
            Some(ConfigError::WorkerOnPrimaryCore)
        );
        assert!(WorkerPool::<HostPlatform>::try_new(PoolConfig::new().worker_core(9)).is_ok());
    }

    #[test]
    fn test_second_pool_on_same_core_rejected() {
        static FIRST: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::new().worker_core(6));
        static SECOND: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::new().worker_core(6));

        assert_eq!(FIRST.try_start(), Ok(()));
        assert_eq!(SECOND.try_start(), Err(ConfigError::CoreInUse(6)));
        assert_eq!(SECOND.state(), WorkerState::NotStarted);

        // Still refused on retry, and the first pool is unaffected.
        assert_eq!(SECOND.try_start(), Err(ConfigError::CoreInUse(6)));
        assert!(FIRST.is_started());
        assert_eq!(
            WorkerPool::<HostPlatform>::try_new(PoolConfig::new().worker_core(6)).err(),
            Some(ConfigError::CoreInUse(6))
        );
    }
}
