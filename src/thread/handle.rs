use super::id::{IdGenerator, ThreadId};
use crate::errors::{DeadlockError, FatalError, InvalidOperationError, ThreadResult};
use crate::platform::{self, Platform, HARDWARE_CONCURRENCY};
use crate::pool::WorkerPool;
use crate::sched::{CompletionFlag, TaskRecord};
use core::fmt;

#[cfg(any(test, feature = "std-shim"))]
use crate::platform::HostPlatform;

/// Handle to a unit of work running on the worker core.
///
/// Mirrors `std::thread::Thread` semantics on a board with exactly one spare
/// core: the callable is queued for the worker at construction, and the
/// handle must be either joined or detached before it is dropped. Dropping a
/// joinable handle terminates the program through [`Platform::fatal`].
///
/// # Type Parameters
///
/// * `P` - Platform the owning pool runs on
pub struct Thread<P: Platform> {
    id: ThreadId,
    done: CompletionFlag,
    joinable: bool,
    pool: &'static WorkerPool<P>,
}

#[cfg(any(test, feature = "std-shim"))]
impl Thread<HostPlatform> {
    /// Spawn `f` on the process-wide default pool.
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn_on(crate::pool::default_pool(), f)
    }

    /// Spawn `f(args)` on the process-wide default pool.
    ///
    /// `args` is moved into the task now, so the task sees the values as they
    /// were at spawn time. To share live state, pass an `Arc` to a
    /// synchronised cell.
    pub fn spawn_with<A, F>(args: A, f: F) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A) + Send + 'static,
    {
        Self::spawn_with_on(crate::pool::default_pool(), args, f)
    }
}

impl<P: Platform> Thread<P> {
    /// Spawn `f` on `pool`, starting the pool's worker core on first use.
    ///
    /// # Arguments
    ///
    /// * `pool` - Pool whose worker will run the task
    /// * `f` - Callable with all of its inputs captured
    ///
    /// # Returns
    ///
    /// A joinable handle with a fresh, never-reused id.
    pub fn spawn_on<F>(pool: &'static WorkerPool<P>, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let id = IdGenerator::global().allocate();
        let (worker_half, handle_half) = CompletionFlag::pair();

        pool.submit(TaskRecord::new(id, f, worker_half));
        log::debug!("spawned thread {} for core {}", id, pool.worker_core());

        Self {
            id,
            done: handle_half,
            joinable: true,
            pool,
        }
    }

    /// Spawn `f(args)` on `pool`. See [`Thread::spawn_with`].
    pub fn spawn_with_on<A, F>(pool: &'static WorkerPool<P>, args: A, f: F) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A) + Send + 'static,
    {
        Self::spawn_on(pool, move || f(args))
    }

    /// Check if the handle still has to be joined or detached.
    pub fn joinable(&self) -> bool {
        self.joinable
    }

    /// Get the thread's unique identifier.
    pub fn get_id(&self) -> ThreadId {
        self.id
    }

    /// Check if the task has run to completion, without waiting.
    pub fn is_finished(&self) -> bool {
        self.done.is_complete()
    }

    /// Pool the task was submitted to.
    pub fn pool(&self) -> &'static WorkerPool<P> {
        self.pool
    }

    /// Wait for the task to finish.
    ///
    /// Busy-waits until the worker has run the callable. On return every
    /// write the task made is visible to the caller and the handle is no
    /// longer joinable.
    ///
    /// # Errors
    ///
    /// * `InvalidOperation` - the handle was already joined or detached
    /// * `Deadlock` - called from the worker core, which would have to run
    ///   the task it is waiting for
    ///
    /// The handle is unchanged when an error is returned.
    pub fn join(&mut self) -> ThreadResult<()> {
        if !self.joinable {
            return Err(InvalidOperationError::NotJoinable(self.id).into());
        }

        if self.pool.is_worker_context() {
            return Err(DeadlockError::JoinFromWorker {
                thread: self.id,
                core: P::current_core(),
            }
            .into());
        }

        while !self.done.is_complete() {
            P::spin_yield();
        }

        self.joinable = false;
        log::debug!("joined thread {}", self.id);
        Ok(())
    }

    /// Give up the handle's claim on the task.
    ///
    /// Returns at once; the task still runs to completion on the worker.
    ///
    /// # Errors
    ///
    /// * `InvalidOperation` - the handle was already joined or detached
    pub fn detach(&mut self) -> ThreadResult<()> {
        if !self.joinable {
            return Err(InvalidOperationError::NotJoinable(self.id).into());
        }

        self.joinable = false;
        log::debug!("detached thread {}", self.id);
        Ok(())
    }

    /// Exchange identity, completion flag and joinable state with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Number of parallel execution contexts: always 2.
    pub const fn hardware_concurrency() -> usize {
        HARDWARE_CONCURRENCY
    }
}

impl<P: Platform> Drop for Thread<P> {
    fn drop(&mut self) {
        if self.joinable {
            platform::fatal::<P>(FatalError::JoinableDropped(self.id));
        }
    }
}

impl<P: Platform> fmt::Debug for Thread<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("joinable", &self.joinable)
            .field("finished", &self.is_finished())
            .finish()
    }
}
