//! Fixed-size task pool with a bounded backlog.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};

use crate::error::ExecutorError;
use crate::spec::WorkerPoolSpec;

/// Snapshot of a pool's load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub name: String,
    pub size: usize,
    pub queue_capacity: usize,
    /// Tasks currently holding a worker.
    pub active: usize,
    /// Tasks admitted but waiting for a worker.
    pub queued: usize,
    pub completed: u64,
    pub rejected: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    rejected: AtomicU64,
}

/// Runs submitted futures on the node runtime, at most `size` at a time.
///
/// Admission is decided synchronously in [`try_submit`](Self::try_submit):
/// a task holds one of `size + queue_capacity` admission permits from
/// submission until it finishes, and one of `size` worker permits while it
/// runs. When no admission permit is left the submission fails with
/// [`ExecutorError::PoolSaturated`]; the caller is never blocked.
pub struct BoundedPool {
    spec: WorkerPoolSpec,
    runtime: Handle,
    admission: Arc<Semaphore>,
    workers: Arc<Semaphore>,
    counters: Arc<Counters>,
}

impl BoundedPool {
    /// Create a pool whose tasks run on `runtime`. Fails if `spec` is invalid.
    pub fn new(spec: WorkerPoolSpec, runtime: Handle) -> Result<Self, ExecutorError> {
        spec.validate()?;
        Ok(Self {
            admission: Arc::new(Semaphore::new(spec.capacity())),
            workers: Arc::new(Semaphore::new(spec.size)),
            counters: Arc::new(Counters::default()),
            spec,
            runtime,
        })
    }

    pub fn spec(&self) -> &WorkerPoolSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Submit a task, failing fast when the pool is saturated or shut down.
    pub fn try_submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, ExecutorError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let admit = match self.admission.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    pool = %self.spec.name,
                    capacity = self.spec.capacity(),
                    "pool saturated, rejecting task"
                );
                return Err(ExecutorError::PoolSaturated {
                    name: self.spec.name.clone(),
                    capacity: self.spec.capacity(),
                });
            }
            Err(TryAcquireError::Closed) => {
                return Err(ExecutorError::PoolClosed(self.spec.name.clone()));
            }
        };

        let seq = self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        let workers = Arc::clone(&self.workers);
        let counters = Arc::clone(&self.counters);
        let span = tracing::debug_span!("pool_task", worker = %self.spec.worker_name(seq as usize));

        let inner = self.runtime.spawn(
            async move {
                let _admit = admit;
                // The worker semaphore is never closed, so this only waits.
                let _slot = workers.acquire_owned().await.ok();
                debug!("task started");
                let output = task.await;
                counters.completed.fetch_add(1, Ordering::Relaxed);
                debug!("task finished");
                output
            }
            .instrument(span),
        );

        Ok(TaskHandle {
            pool: self.spec.name.clone(),
            inner,
        })
    }

    /// Current load of the pool.
    pub fn stats(&self) -> PoolStats {
        let pending = self.spec.capacity() - self.admission.available_permits();
        let active = self.spec.size - self.workers.available_permits();
        PoolStats {
            name: self.spec.name.clone(),
            size: self.spec.size,
            queue_capacity: self.spec.queue_capacity,
            active,
            queued: pending.saturating_sub(active),
            completed: self.counters.completed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Stop admitting new tasks. Tasks already admitted still run.
    pub fn shutdown(&self) {
        self.admission.close();
        debug!(pool = %self.spec.name, "pool closed to new tasks");
    }

    pub fn is_shutdown(&self) -> bool {
        self.admission.is_closed()
    }
}

/// Handle to a task admitted by a [`BoundedPool`].
pub struct TaskHandle<T> {
    pool: String,
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task's output.
    pub async fn join(self) -> Result<T, ExecutorError> {
        self.inner.await.map_err(|e| {
            ExecutorError::TaskFailed(format!("task on pool '{}' did not complete: {}", self.pool, e))
        })
    }

    /// Cancel the task. Its admission slot is released once it is dropped.
    pub fn abort(&self) {
        self.inner.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(size: usize, queue: usize) -> BoundedPool {
        let spec = WorkerPoolSpec::build_spec("test-pool", size, queue, "thread_pool.test").unwrap();
        BoundedPool::new(spec, Handle::current()).unwrap()
    }

    #[tokio::test]
    async fn rejects_submission_beyond_size_plus_queue() {
        let pool = pool(2, 3);
        let gate = Arc::new(Semaphore::new(0));

        let mut handles = Vec::new();
        for i in 0..5 {
            let gate = Arc::clone(&gate);
            let handle = pool
                .try_submit(async move {
                    let _ = gate.acquire().await;
                    i
                })
                .unwrap();
            handles.push(handle);
        }

        let err = pool.try_submit(async {}).err().unwrap();
        match err {
            ExecutorError::PoolSaturated { name, capacity } => {
                assert_eq!(name, "test-pool");
                assert_eq!(capacity, 5);
            }
            other => panic!("expected PoolSaturated, got {other:?}"),
        }
        assert_eq!(pool.stats().rejected, 1);

        gate.add_permits(5);
        let mut results = Vec::new();
        for h in handles {
            results.push(h.join().await.unwrap());
        }
        assert_eq!(results, vec![0, 1, 2, 3, 4]);

        // Capacity is released once tasks finish.
        let again = pool.try_submit(async { "ok" }).unwrap();
        assert_eq!(again.join().await.unwrap(), "ok");
        assert_eq!(pool.stats().completed, 6);
    }

    #[tokio::test]
    async fn zero_queue_admits_exactly_size() {
        let pool = pool(1, 0);
        let gate = Arc::new(Semaphore::new(0));
        let g = Arc::clone(&gate);
        let first = pool
            .try_submit(async move {
                let _ = g.acquire().await;
            })
            .unwrap();

        assert!(matches!(
            pool.try_submit(async {}),
            Err(ExecutorError::PoolSaturated { .. })
        ));

        gate.add_permits(1);
        first.join().await.unwrap();
    }

    #[tokio::test]
    async fn runs_at_most_size_tasks_concurrently() {
        let pool = pool(2, 10);
        let gate = Arc::new(Semaphore::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let gate = Arc::clone(&gate);
            handles.push(
                pool.try_submit(async move {
                    let _ = gate.acquire().await;
                })
                .unwrap(),
            );
        }

        // Let spawned tasks reach the gate.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let stats = pool.stats();
        assert_eq!(stats.active, 2);
        assert_eq!(stats.queued, 4);

        gate.add_permits(6);
        for h in handles {
            h.join().await.unwrap();
        }
        let stats = pool.stats();
        assert_eq!(stats.active, 0);
        assert_eq!(stats.queued, 0);
    }

    #[tokio::test]
    async fn shutdown_refuses_new_tasks() {
        let pool = pool(1, 1);
        pool.shutdown();
        assert!(pool.is_shutdown());
        assert!(matches!(
            pool.try_submit(async {}),
            Err(ExecutorError::PoolClosed(name)) if name == "test-pool"
        ));
    }

    #[tokio::test]
    async fn panicking_task_reports_failure_and_frees_slot() {
        let pool = pool(1, 0);
        let handle = pool.try_submit(async { panic!("boom") }).unwrap();
        let result: Result<(), _> = handle.join().await;
        assert!(matches!(result, Err(ExecutorError::TaskFailed(_))));

        let next = pool.try_submit(async { 7 }).unwrap();
        assert_eq!(next.join().await.unwrap(), 7);
    }
}
