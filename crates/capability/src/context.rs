//! Host-provided infrastructure handles and the shared context built from them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillhost_executor::ExecutorService;

use crate::error::{ClientError, InjectError};

// ── Handle traits ─────────────────────────────────────────────

/// One request sent through the host's network client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRequest {
    /// Endpoint path relative to the cluster, e.g. `_plugins/_ppl`.
    pub action: String,
    pub body: Value,
}

impl ClientRequest {
    pub fn new(action: impl Into<String>, body: Value) -> Self {
        Self {
            action: action.into(),
            body,
        }
    }
}

/// The host's client for talking to the cluster.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn execute(&self, request: ClientRequest) -> Result<Value, ClientError>;
}

/// Read access to cluster topology.
pub trait ClusterMetadata: Send + Sync {
    fn cluster_name(&self) -> String;
    fn local_node_id(&self) -> String;
}

/// Named parsers for structured response content.
pub trait ContentRegistry: Send + Sync {
    fn contains(&self, name: &str) -> bool;
    fn parse(&self, name: &str, raw: Value) -> Result<Value, ClientError>;
}

/// Named decoders for serialized host objects (detectors, results, ...).
pub trait ObjectRegistry: Send + Sync {
    fn contains(&self, name: &str) -> bool;
    fn decode(&self, name: &str, raw: Value) -> Result<Value, ClientError>;
}

/// Fetches a web page's body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ClientError>;
}

/// Static description of the node the plugin runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEnvironment {
    pub node_name: String,
}

// ── HostHandles ───────────────────────────────────────────────

/// Handles the host supplies at startup. Every field except `fetcher` is
/// mandatory; [`crate::build_context`] refuses a set with any of them unset.
#[derive(Clone, Default)]
pub struct HostHandles {
    pub client: Option<Arc<dyn NetworkClient>>,
    pub cluster: Option<Arc<dyn ClusterMetadata>>,
    pub content: Option<Arc<dyn ContentRegistry>>,
    pub executors: Option<Arc<ExecutorService>>,
    pub node: Option<Arc<NodeEnvironment>>,
    pub objects: Option<Arc<dyn ObjectRegistry>>,
    pub fetcher: Option<Arc<dyn PageFetcher>>,
}

impl HostHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client: Arc<dyn NetworkClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn cluster(mut self, cluster: Arc<dyn ClusterMetadata>) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn content(mut self, content: Arc<dyn ContentRegistry>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn executors(mut self, executors: Arc<ExecutorService>) -> Self {
        self.executors = Some(executors);
        self
    }

    pub fn node(mut self, node: Arc<NodeEnvironment>) -> Self {
        self.node = Some(node);
        self
    }

    pub fn objects(mut self, objects: Arc<dyn ObjectRegistry>) -> Self {
        self.objects = Some(objects);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }
}

fn require<T: ?Sized>(
    handle: &Option<Arc<T>>,
    name: &'static str,
) -> Result<Arc<T>, InjectError> {
    handle.clone().ok_or(InjectError::MissingDependency(name))
}

// ── SharedContext ─────────────────────────────────────────────

/// Fully populated set of host handles.
///
/// Holds the host's own `Arc`s; cloning the context never copies a handle.
/// A `SharedContext` only exists once every mandatory handle is present.
#[derive(Clone)]
pub struct SharedContext {
    client: Arc<dyn NetworkClient>,
    cluster: Arc<dyn ClusterMetadata>,
    content: Arc<dyn ContentRegistry>,
    executors: Arc<ExecutorService>,
    node: Arc<NodeEnvironment>,
    objects: Arc<dyn ObjectRegistry>,
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl SharedContext {
    /// Checked in field order; the first unset handle is reported.
    pub(crate) fn from_handles(handles: &HostHandles) -> Result<Self, InjectError> {
        Ok(Self {
            client: require(&handles.client, "client")?,
            cluster: require(&handles.cluster, "cluster")?,
            content: require(&handles.content, "content")?,
            executors: require(&handles.executors, "executors")?,
            node: require(&handles.node, "node")?,
            objects: require(&handles.objects, "objects")?,
            fetcher: handles.fetcher.clone(),
        })
    }

    pub fn client(&self) -> &Arc<dyn NetworkClient> {
        &self.client
    }

    pub fn cluster(&self) -> &Arc<dyn ClusterMetadata> {
        &self.cluster
    }

    pub fn content(&self) -> &Arc<dyn ContentRegistry> {
        &self.content
    }

    pub fn executors(&self) -> &Arc<ExecutorService> {
        &self.executors
    }

    pub fn node(&self) -> &Arc<NodeEnvironment> {
        &self.node
    }

    pub fn objects(&self) -> &Arc<dyn ObjectRegistry> {
        &self.objects
    }

    pub fn fetcher(&self) -> Option<&Arc<dyn PageFetcher>> {
        self.fetcher.as_ref()
    }
}
