//! Worker pool configuration.

use crate::errors::ConfigError;
use crate::platform::{CoreId, MAX_CORES, PRIMARY_CORE, SECONDARY_CORE};

/// Settings for a [`WorkerPool`](crate::pool::WorkerPool).
///
/// Built in the usual builder style; every method is `const` so a pool can
/// be configured inside a `static`.
///
/// ```
/// use dual_core_threads::PoolConfig;
///
/// const CONFIG: PoolConfig = PoolConfig::new().queue_capacity(64);
/// assert!(CONFIG.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    worker_core: CoreId,
    queue_capacity: usize,
}

impl PoolConfig {
    /// Default configuration: worker on core 1, room for 16 queued tasks.
    pub const DEFAULT: PoolConfig = PoolConfig {
        worker_core: SECONDARY_CORE,
        queue_capacity: 16,
    };

    /// Same as [`PoolConfig::DEFAULT`].
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Core that runs the worker loop.
    pub const fn worker_core(mut self, core: CoreId) -> Self {
        self.worker_core = core;
        self
    }

    /// Queue slots reserved when the worker starts.
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Configured worker core.
    pub const fn get_worker_core(&self) -> CoreId {
        self.worker_core
    }

    /// Configured initial queue capacity.
    pub const fn get_queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Check the configuration is usable.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_core == PRIMARY_CORE {
            return Err(ConfigError::WorkerOnPrimaryCore);
        }
        if self.worker_core >= MAX_CORES {
            return Err(ConfigError::CoreOutOfRange(self.worker_core));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
