use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CapabilityError;

/// Caller-supplied configuration passed to a factory when producing an instance.
pub type Params = Map<String, Value>;

/// Outcome class of a capability run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    Ok,
    /// A backing resource is at capacity; the caller may retry later.
    Unavailable,
}

/// Result of running a capability, handed back to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityOutput {
    pub status: OutputStatus,
    pub content: Value,
}

impl CapabilityOutput {
    pub fn ok(content: Value) -> Self {
        Self {
            status: OutputStatus::Ok,
            content,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: OutputStatus::Unavailable,
            content: Value::String(message.into()),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.status == OutputStatus::Unavailable
    }
}

/// A host-invocable capability instance produced by a factory.
///
/// Instances are object-safe, Send + Sync, and async.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Stable capability name, identical to its factory's.
    fn name(&self) -> &str;

    /// Cheap structural check of `input` before the host calls [`run`](Self::run).
    fn validate(&self, input: &Value) -> bool;

    async fn run(&self, input: Value) -> Result<CapabilityOutput, CapabilityError>;
}
