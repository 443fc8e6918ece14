//! In-memory host handles and sample capabilities for tests.
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for downstream crates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use skillhost_executor::{ExecutorService, WorkerPoolSpec};

use crate::capability::{Capability, CapabilityOutput, Params};
use crate::context::{
    ClientRequest, ClusterMetadata, ContentRegistry, HostHandles, NetworkClient, NodeEnvironment,
    ObjectRegistry, PageFetcher,
};
use crate::deps::{ClientDeps, CrawlerDeps};
use crate::error::{CapabilityError, ClientError};
use crate::factory::CapabilityKind;

// ── Fake handles ──────────────────────────────────────────────

/// Records every request and answers with `{"action": .., "body": ..}`.
#[derive(Default)]
pub struct RecordingClient {
    requests: Mutex<Vec<ClientRequest>>,
}

impl RecordingClient {
    pub fn requests(&self) -> Vec<ClientRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkClient for RecordingClient {
    async fn execute(&self, request: ClientRequest) -> Result<Value, ClientError> {
        let reply = json!({ "action": request.action, "body": request.body });
        self.requests.lock().unwrap().push(request);
        Ok(reply)
    }
}

pub struct StaticCluster;

impl ClusterMetadata for StaticCluster {
    fn cluster_name(&self) -> String {
        "test-cluster".into()
    }

    fn local_node_id(&self) -> String {
        "node-0".into()
    }
}

/// Accepts every parser name and returns content unchanged.
pub struct IdentityContent;

impl ContentRegistry for IdentityContent {
    fn contains(&self, _name: &str) -> bool {
        true
    }

    fn parse(&self, _name: &str, raw: Value) -> Result<Value, ClientError> {
        Ok(raw)
    }
}

/// Accepts every object name and returns objects unchanged.
pub struct IdentityObjects;

impl ObjectRegistry for IdentityObjects {
    fn contains(&self, _name: &str) -> bool {
        true
    }

    fn decode(&self, _name: &str, raw: Value) -> Result<Value, ClientError> {
        Ok(raw)
    }
}

/// Serves pages from a fixed map; unknown URLs answer 404.
#[derive(Default)]
pub struct MapFetcher {
    pages: HashMap<String, String>,
}

impl MapFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ClientError> {
        self.pages.get(url).cloned().ok_or_else(|| ClientError::Status {
            status: 404,
            body: format!("no page at {url}"),
        })
    }
}

/// A complete handle set backed by the fakes above, plus the client so
/// tests can inspect requests. The executor service carries one pool,
/// `fetch-pool` (1 worker, 1 queued). Must be called inside a tokio runtime.
pub fn full_handles() -> (HostHandles, Arc<RecordingClient>) {
    let mut executors = ExecutorService::from_current().expect("tests run inside a tokio runtime");
    executors
        .register(WorkerPoolSpec::build_spec("fetch-pool", 1, 1, "thread_pool.test").unwrap())
        .unwrap();

    let client = Arc::new(RecordingClient::default());
    let handles = HostHandles::new()
        .client(client.clone())
        .cluster(Arc::new(StaticCluster))
        .content(Arc::new(IdentityContent))
        .executors(Arc::new(executors))
        .node(Arc::new(NodeEnvironment {
            node_name: "node-0".into(),
        }))
        .objects(Arc::new(IdentityObjects))
        .fetcher(Arc::new(MapFetcher::default().with_page("https://example.com", "hello")));
    (handles, client)
}

// ── Sample capabilities ───────────────────────────────────────

/// Client-backed capability that sends its input to the `echo` action.
pub struct EchoKind;

impl CapabilityKind for EchoKind {
    type Deps = ClientDeps;

    const NAME: &'static str = "echo";
    const DESCRIPTION: &'static str = "Echoes back the input. For testing.";

    fn build(deps: &ClientDeps, _params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Echo {
            client: Arc::clone(&deps.client),
        }))
    }
}

struct Echo {
    client: Arc<dyn NetworkClient>,
}

#[async_trait]
impl Capability for Echo {
    fn name(&self) -> &str {
        EchoKind::NAME
    }

    fn validate(&self, input: &Value) -> bool {
        input.is_object()
    }

    async fn run(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let reply = self.client.execute(ClientRequest::new("echo", input)).await?;
        Ok(CapabilityOutput::ok(reply))
    }
}

/// Crawler-backed capability that fetches one URL on `fetch-pool`.
pub struct FetchKind;

impl CapabilityKind for FetchKind {
    type Deps = CrawlerDeps;

    const NAME: &'static str = "fetch";
    const DESCRIPTION: &'static str = "Fetches a page on the background pool. For testing.";
    const POOL: Option<&'static str> = Some("fetch-pool");

    fn build(deps: &CrawlerDeps, _params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Fetch { deps: deps.clone() }))
    }
}

struct Fetch {
    deps: CrawlerDeps,
}

#[async_trait]
impl Capability for Fetch {
    fn name(&self) -> &str {
        FetchKind::NAME
    }

    fn validate(&self, input: &Value) -> bool {
        input.get("url").and_then(Value::as_str).is_some()
    }

    async fn run(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let url = input
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| CapabilityError::InvalidInput("missing 'url' field".into()))?
            .to_string();
        let pool = self.deps.executors.pool("fetch-pool")?;
        let fetcher = Arc::clone(&self.deps.fetcher);
        let body = pool
            .try_submit(async move { fetcher.fetch(&url).await })?
            .join()
            .await??;
        Ok(CapabilityOutput::ok(Value::String(body)))
    }
}
