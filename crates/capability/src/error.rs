use skillhost_executor::ExecutorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("capability with name '{0}' is already registered")]
    DuplicateName(String),

    #[error("no capability named '{0}'")]
    NotFound(String),
}

/// Failures while wiring host handles into capability factories.
/// All of them abort startup.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("missing host dependency: {0}")]
    MissingDependency(&'static str),

    #[error("capability factory '{0}' is not ready")]
    NotReady(String),
}

/// Errors from a host network or page-fetch call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability '{0}' requested before its factory was initialized")]
    NotReady(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
