use thiserror::Error;

/// Errors raised while provisioning or using worker pools.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("executor '{0}' is already registered")]
    DuplicateExecutorName(String),

    #[error("pool '{name}' is saturated ({capacity} tasks pending)")]
    PoolSaturated { name: String, capacity: usize },

    #[error("pool '{0}' is shut down")]
    PoolClosed(String),

    #[error("no executor named '{0}'")]
    UnknownPool(String),

    #[error("invalid pool spec: {0}")]
    InvalidSpec(String),

    #[error("no tokio runtime available to host worker pools")]
    NoRuntime,

    #[error("task failed: {0}")]
    TaskFailed(String),
}
