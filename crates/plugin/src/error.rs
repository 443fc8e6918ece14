use skillhost_capability::{ClientError, InjectError, RegistryError};
use skillhost_core::ConfigError;
use skillhost_executor::ExecutorError;
use thiserror::Error;

/// Startup failures. Every variant aborts plugin initialization.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("injection error: {0}")]
    Inject(#[from] InjectError),

    #[error("client error: {0}")]
    Client(#[from] ClientError),
}
