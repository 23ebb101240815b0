//! Scheduling: a single FIFO queue and the records that travel through it.
//!
//! There is no priority, no preemption and no reordering. The worker core
//! takes tasks strictly in submission order and runs each to completion.

pub mod fifo;
pub mod task;

pub use fifo::TaskQueue;
pub use task::{CompletionFlag, Job, TaskRecord};
