//! Worker pool descriptions and sizing policy.

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::ExecutorError;

/// Pool size for a node with `available_cores` processors.
///
/// One core is left for the serving workload; single-core nodes still get
/// one worker.
pub fn compute_pool_size(available_cores: usize) -> usize {
    available_cores.saturating_sub(1).max(1)
}

/// Fully resolved description of a fixed-size worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPoolSpec {
    /// Unique executor name.
    pub name: String,
    /// Maximum tasks running at once. Always at least 1.
    pub size: usize,
    /// Maximum tasks waiting for a worker.
    pub queue_capacity: usize,
    /// Settings prefix the pool is registered under (e.g. `thread_pool.skills`).
    pub thread_name_prefix: String,
    pub allow_resize: bool,
}

impl WorkerPoolSpec {
    /// Start a fluent builder for a pool named `name`.
    pub fn builder(name: impl Into<String>) -> WorkerPoolSpecBuilder {
        WorkerPoolSpecBuilder::new(name)
    }

    /// Build a non-resizable spec from its four essential parts.
    pub fn build_spec(
        name: impl Into<String>,
        size: usize,
        queue_capacity: usize,
        prefix: impl Into<String>,
    ) -> Result<Self, ExecutorError> {
        Self::builder(name)
            .size(size)
            .queue_capacity(queue_capacity)
            .thread_name_prefix(prefix)
            .build()
    }

    /// Tasks that may be pending (running or queued) before submissions are rejected.
    pub fn capacity(&self) -> usize {
        self.size.saturating_add(self.queue_capacity)
    }

    /// Settings key for one of this pool's fields, e.g.
    /// `thread_pool.skills.websearch-crawler-threadpool.size`.
    pub fn settings_key(&self, field: &str) -> String {
        format!("{}.{}.{}", self.thread_name_prefix, self.name, field)
    }

    /// Name given to the pool's `n`th worker in logs.
    pub fn worker_name(&self, n: usize) -> String {
        format!("{}[{}][T#{}]", self.thread_name_prefix, self.name, n)
    }

    pub(crate) fn validate(&self) -> Result<(), ExecutorError> {
        if self.name.trim().is_empty() {
            return Err(ExecutorError::InvalidSpec("pool name must not be empty".into()));
        }
        if self.size == 0 {
            return Err(ExecutorError::InvalidSpec(format!(
                "pool '{}' must have at least one worker",
                self.name
            )));
        }
        match self.size.checked_add(self.queue_capacity) {
            Some(capacity) if capacity <= Semaphore::MAX_PERMITS => Ok(()),
            _ => Err(ExecutorError::InvalidSpec(format!(
                "pool '{}' capacity {} + {} exceeds {}",
                self.name,
                self.size,
                self.queue_capacity,
                Semaphore::MAX_PERMITS
            ))),
        }
    }
}

// ── WorkerPoolSpecBuilder ────────────────────────────────────────────

/// Fluent builder for [`WorkerPoolSpec`].
///
/// # Example
/// ```
/// use skillhost_executor::{compute_pool_size, WorkerPoolSpec};
///
/// let spec = WorkerPoolSpec::builder("crawler")
///     .size(compute_pool_size(4))
///     .queue_capacity(100)
///     .thread_name_prefix("thread_pool.skills")
///     .build()
///     .unwrap();
/// assert_eq!(spec.size, 3);
/// ```
#[derive(Debug, Clone)]
pub struct WorkerPoolSpecBuilder {
    name: String,
    size: usize,
    queue_capacity: usize,
    thread_name_prefix: Option<String>,
    allow_resize: bool,
}

impl WorkerPoolSpecBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 1,
            queue_capacity: 0,
            thread_name_prefix: None,
            allow_resize: false,
        }
    }

    /// Number of workers (default: 1).
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Size of the pending-task backlog (default: 0).
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Settings/thread-name prefix (default: the pool name).
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = Some(prefix.into());
        self
    }

    pub fn allow_resize(mut self, allow: bool) -> Self {
        self.allow_resize = allow;
        self
    }

    pub fn build(self) -> Result<WorkerPoolSpec, ExecutorError> {
        let spec = WorkerPoolSpec {
            thread_name_prefix: self.thread_name_prefix.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            size: self.size,
            queue_capacity: self.queue_capacity,
            allow_resize: self.allow_resize,
        };
        spec.validate()?;
        Ok(spec)
    }
}
