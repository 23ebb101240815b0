//! FIFO task queue feeding the worker core.

use super::task::TaskRecord;
use crate::platform::Platform;
use alloc::collections::VecDeque;
use portable_atomic::{AtomicUsize, Ordering};

/// Ordered list of pending tasks.
///
/// Any number of producers on the primary core push; exactly one consumer
/// (the worker loop) pops. Tasks come out in the order they went in. The
/// length is mirrored in an atomic so the idle worker can poll without
/// taking the lock away from producers.
pub struct TaskQueue {
    tasks: spin::Mutex<VecDeque<TaskRecord>>,
    len: AtomicUsize,
}

impl TaskQueue {
    /// Create an empty queue. Does not allocate.
    pub const fn new() -> Self {
        Self {
            tasks: spin::Mutex::new(VecDeque::new()),
            len: AtomicUsize::new(0),
        }
    }

    /// Reserve room for at least `additional` more tasks.
    pub fn reserve(&self, additional: usize) {
        self.tasks.lock().reserve(additional);
    }

    /// Append a task at the back.
    pub fn push(&self, task: TaskRecord) {
        let mut tasks = self.tasks.lock();
        tasks.push_back(task);
        self.len.store(tasks.len(), Ordering::Release);
    }

    /// Remove the oldest task, if any.
    pub fn try_pop(&self) -> Option<TaskRecord> {
        if self.len.load(Ordering::Acquire) == 0 {
            return None;
        }

        let mut tasks = self.tasks.lock();
        let task = tasks.pop_front();
        self.len.store(tasks.len(), Ordering::Release);
        task
    }

    /// Remove the oldest task, spinning until one is available.
    pub fn pop_blocking<P: Platform>(&self) -> TaskRecord {
        loop {
            if let Some(task) = self.try_pop() {
                return task;
            }
            P::spin_yield();
        }
    }

    /// Number of tasks waiting.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Check if no tasks are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HostPlatform;
    use crate::sched::task::CompletionFlag;
    use crate::thread::IdGenerator;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    fn record(ids: &IdGenerator) -> (TaskRecord, CompletionFlag) {
        let (worker_half, handle_half) = CompletionFlag::pair();
        (TaskRecord::new(ids.allocate(), || {}, worker_half), handle_half)
    }

    #[test]
    fn test_fifo_order() {
        let ids = IdGenerator::new();
        let queue = TaskQueue::new();
        let mut pushed = Vec::new();

        for _ in 0..8 {
            let (task, _flag) = record(&ids);
            pushed.push(task.id());
            queue.push(task);
        }
        assert_eq!(queue.len(), 8);

        let popped: Vec<_> = core::iter::from_fn(|| queue.try_pop().map(|t| t.id())).collect();
        assert_eq!(popped, pushed);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_pop_empty() {
        let queue = TaskQueue::new();
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn test_pop_blocking_waits_for_producer() {
        let ids = IdGenerator::new();
        let queue = Arc::new(TaskQueue::new());
        let (task, _flag) = record(&ids);
        let expected = task.id();

        let producer = {
            let queue = queue.clone();
            std::thread::spawn(move || {
                std::thread::sleep(core::time::Duration::from_millis(20));
                queue.push(task);
            })
        };

        let popped = queue.pop_blocking::<HostPlatform>();
        assert_eq!(popped.id(), expected);
        producer.join().unwrap();
    }
}
