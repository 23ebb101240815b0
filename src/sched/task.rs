//! Task records and their completion signal.

use crate::thread::ThreadId;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use portable_atomic::{AtomicBool, Ordering};

/// Boxed unit of work with all arguments already bound.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// One-shot "task finished" signal.
///
/// Created in pairs: one half travels with the [`TaskRecord`] to the worker,
/// the other stays with the thread handle. The cell lives until both halves
/// are dropped. Only the worker writes it (false to true, once); the handle
/// reads it as often as it likes.
pub struct CompletionFlag {
    done: Arc<AtomicBool>,
}

impl CompletionFlag {
    /// Create the two co-owning halves of a fresh, unset flag.
    pub fn pair() -> (CompletionFlag, CompletionFlag) {
        let done = Arc::new(AtomicBool::new(false));
        (
            CompletionFlag { done: done.clone() },
            CompletionFlag { done },
        )
    }

    /// Mark the task finished.
    ///
    /// Release ordering publishes every write the task made to whoever
    /// observes the flag set.
    pub fn complete(&self) {
        let was_set = self.done.swap(true, Ordering::Release);
        debug_assert!(!was_set, "completion flag set twice");
    }

    /// Check whether the task has finished.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Number of live halves (2 while the task is queued or running).
    pub fn owners(&self) -> usize {
        Arc::strong_count(&self.done)
    }
}

impl fmt::Debug for CompletionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionFlag")
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Queued unit of work.
///
/// Owns the callable outright; the record is consumed by [`TaskRecord::run`].
pub struct TaskRecord {
    id: ThreadId,
    job: Job,
    done: CompletionFlag,
}

impl TaskRecord {
    /// Bundle a callable with the identity and completion flag of its handle.
    pub fn new<F>(id: ThreadId, job: F, done: CompletionFlag) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id,
            job: Box::new(job),
            done,
        }
    }

    /// Identity of the owning thread handle.
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Run the callable to completion, then set the completion flag.
    ///
    /// If the callable unwinds the flag is never set.
    pub fn run(self) {
        let TaskRecord { id, job, done } = self;
        job();
        done.complete();
        log::trace!("thread {} finished", id);
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
