//! The node's executor-management subsystem.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::runtime::Handle;
use tracing::info;

use crate::error::ExecutorError;
use crate::pool::{BoundedPool, PoolStats};
use crate::spec::WorkerPoolSpec;

/// Named worker pools, keyed in registration order.
///
/// Pools are registered during startup through `&mut self`; afterwards the
/// service is shared read-only (usually behind an `Arc`).
pub struct ExecutorService {
    runtime: Handle,
    pools: IndexMap<String, Arc<BoundedPool>>,
}

impl ExecutorService {
    /// Create a service whose pools run on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pools: IndexMap::new(),
        }
    }

    /// Create a service on the runtime the caller is running in.
    pub fn from_current() -> Result<Self, ExecutorError> {
        let runtime = Handle::try_current().map_err(|_| ExecutorError::NoRuntime)?;
        Ok(Self::new(runtime))
    }

    /// Register one pool. Fails if the name is taken.
    pub fn register(&mut self, spec: WorkerPoolSpec) -> Result<Arc<BoundedPool>, ExecutorError> {
        spec.validate()?;
        if self.pools.contains_key(&spec.name) {
            return Err(ExecutorError::DuplicateExecutorName(spec.name));
        }

        info!(
            pool = %spec.name,
            size = spec.size,
            queue_capacity = spec.queue_capacity,
            prefix = %spec.thread_name_prefix,
            "provisioned worker pool"
        );
        let pool = Arc::new(BoundedPool::new(spec, self.runtime.clone())?);
        self.pools.insert(pool.name().to_string(), Arc::clone(&pool));
        Ok(pool)
    }

    /// Register a batch of pools, all or nothing.
    ///
    /// Every spec is checked (validity, clashes with registered pools and
    /// with each other) before any pool is created, so a failed call leaves
    /// the service unchanged.
    pub fn provision<I>(&mut self, specs: I) -> Result<Vec<Arc<BoundedPool>>, ExecutorError>
    where
        I: IntoIterator<Item = WorkerPoolSpec>,
    {
        let specs: Vec<WorkerPoolSpec> = specs.into_iter().collect();

        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if self.pools.contains_key(&spec.name) || !seen.insert(spec.name.as_str()) {
                return Err(ExecutorError::DuplicateExecutorName(spec.name.clone()));
            }
        }

        specs.into_iter().map(|spec| self.register(spec)).collect()
    }

    /// Look up a pool by name.
    pub fn get(&self, name: &str) -> Option<Arc<BoundedPool>> {
        self.pools.get(name).cloned()
    }

    /// Look up a pool by name, failing if it was never provisioned.
    pub fn pool(&self, name: &str) -> Result<Arc<BoundedPool>, ExecutorError> {
        self.get(name)
            .ok_or_else(|| ExecutorError::UnknownPool(name.to_string()))
    }

    /// Specs of every registered pool, in registration order.
    pub fn specs(&self) -> Vec<WorkerPoolSpec> {
        self.pools.values().map(|p| p.spec().clone()).collect()
    }

    pub fn stats(&self) -> Vec<PoolStats> {
        self.pools.values().map(|p| p.stats()).collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Close every pool to new work.
    pub fn shutdown(&self) {
        for pool in self.pools.values() {
            pool.shutdown();
        }
        info!(pools = self.pools.len(), "executor service shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, size: usize) -> WorkerPoolSpec {
        WorkerPoolSpec::build_spec(name, size, 10, "thread_pool.test").unwrap()
    }

    #[tokio::test]
    async fn register_and_lookup() {
        let mut service = ExecutorService::from_current().unwrap();
        service.register(spec("alpha", 2)).unwrap();

        assert_eq!(service.len(), 1);
        assert!(service.get("alpha").is_some());
        assert!(service.get("beta").is_none());
        assert!(matches!(
            service.pool("beta"),
            Err(ExecutorError::UnknownPool(name)) if name == "beta"
        ));
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let mut service = ExecutorService::from_current().unwrap();
        service.register(spec("alpha", 2)).unwrap();

        let err = service.register(spec("alpha", 4)).err().unwrap();
        assert!(matches!(err, ExecutorError::DuplicateExecutorName(name) if name == "alpha"));
        assert_eq!(service.get("alpha").unwrap().spec().size, 2);
    }

    #[tokio::test]
    async fn provision_is_all_or_nothing() {
        let mut service = ExecutorService::from_current().unwrap();
        service.register(spec("existing", 1)).unwrap();

        let err = service
            .provision(vec![spec("fresh", 1), spec("existing", 1)])
            .err()
            .unwrap();
        assert!(matches!(err, ExecutorError::DuplicateExecutorName(_)));
        assert!(service.get("fresh").is_none());
        assert_eq!(service.len(), 1);
    }

    #[tokio::test]
    async fn provision_rejects_duplicates_within_batch() {
        let mut service = ExecutorService::from_current().unwrap();
        let err = service
            .provision(vec![spec("twin", 1), spec("twin", 2)])
            .err()
            .unwrap();
        assert!(matches!(err, ExecutorError::DuplicateExecutorName(name) if name == "twin"));
        assert!(service.is_empty());
    }

    #[tokio::test]
    async fn oversized_pool_is_an_error_not_a_panic() {
        let mut service = ExecutorService::from_current().unwrap();
        let huge = WorkerPoolSpec {
            name: "crawler".into(),
            size: 3,
            queue_capacity: usize::MAX / 4,
            thread_name_prefix: "thread_pool.skills".into(),
            allow_resize: false,
        };

        let err = service.register(huge.clone()).err().unwrap();
        assert!(matches!(err, ExecutorError::InvalidSpec(_)));
        assert!(matches!(
            service.provision(vec![spec("ok", 1), huge]),
            Err(ExecutorError::InvalidSpec(_))
        ));
        assert!(service.is_empty());
    }

    #[tokio::test]
    async fn specs_keep_registration_order() {
        let mut service = ExecutorService::from_current().unwrap();
        service
            .provision(vec![spec("b", 1), spec("a", 1), spec("c", 1)])
            .unwrap();
        let names: Vec<_> = service.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn shutdown_closes_all_pools() {
        let mut service = ExecutorService::from_current().unwrap();
        service.provision(vec![spec("a", 1), spec("b", 1)]).unwrap();
        service.shutdown();
        assert!(service.get("a").unwrap().is_shutdown());
        assert!(service.get("b").unwrap().is_shutdown());
    }

    #[test]
    fn no_runtime_outside_tokio() {
        assert!(matches!(
            ExecutorService::from_current(),
            Err(ExecutorError::NoRuntime)
        ));
    }
}
