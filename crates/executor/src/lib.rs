//! Bounded worker pools for background capability work.
//!
//! A pool is described by a [`WorkerPoolSpec`], registered with the node's
//! [`ExecutorService`], and runs at most `size` tasks at once with up to
//! `queue_capacity` more waiting. Anything beyond that is rejected with
//! [`ExecutorError::PoolSaturated`] instead of blocking the caller.

pub mod error;
pub mod pool;
pub mod service;
pub mod spec;

pub use error::ExecutorError;
pub use pool::{BoundedPool, PoolStats, TaskHandle};
pub use service::ExecutorService;
pub use spec::{compute_pool_size, WorkerPoolSpec, WorkerPoolSpecBuilder};
