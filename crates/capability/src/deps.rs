//! Per-factory dependency subsets of the [`SharedContext`].
//!
//! Each factory declares exactly the handles it needs by naming one of
//! these structs as its `Deps`; nothing else from the context reaches it.

use std::sync::Arc;

use skillhost_executor::ExecutorService;

use crate::context::{ContentRegistry, NetworkClient, ObjectRegistry, PageFetcher, SharedContext};
use crate::error::InjectError;

/// A capability-specific view of the shared context.
pub trait DependencySet: Send + Sync + Sized + 'static {
    fn select(ctx: &SharedContext) -> Result<Self, InjectError>;
}

/// Cluster client only.
#[derive(Clone)]
pub struct ClientDeps {
    pub client: Arc<dyn NetworkClient>,
}

impl DependencySet for ClientDeps {
    fn select(ctx: &SharedContext) -> Result<Self, InjectError> {
        Ok(Self {
            client: Arc::clone(ctx.client()),
        })
    }
}

/// Cluster client plus content parsers, for search-style capabilities.
#[derive(Clone)]
pub struct SearchDeps {
    pub client: Arc<dyn NetworkClient>,
    pub content: Arc<dyn ContentRegistry>,
}

impl DependencySet for SearchDeps {
    fn select(ctx: &SharedContext) -> Result<Self, InjectError> {
        Ok(Self {
            client: Arc::clone(ctx.client()),
            content: Arc::clone(ctx.content()),
        })
    }
}

/// Cluster client plus object decoders, for anomaly-detection lookups.
#[derive(Clone)]
pub struct DetectorDeps {
    pub client: Arc<dyn NetworkClient>,
    pub objects: Arc<dyn ObjectRegistry>,
}

impl DependencySet for DetectorDeps {
    fn select(ctx: &SharedContext) -> Result<Self, InjectError> {
        Ok(Self {
            client: Arc::clone(ctx.client()),
            objects: Arc::clone(ctx.objects()),
        })
    }
}

/// Background executor plus page fetcher, for crawling.
#[derive(Clone)]
pub struct CrawlerDeps {
    pub executors: Arc<ExecutorService>,
    pub fetcher: Arc<dyn PageFetcher>,
}

impl DependencySet for CrawlerDeps {
    fn select(ctx: &SharedContext) -> Result<Self, InjectError> {
        let fetcher = ctx
            .fetcher()
            .cloned()
            .ok_or(InjectError::MissingDependency("fetcher"))?;
        Ok(Self {
            executors: Arc::clone(ctx.executors()),
            fetcher,
        })
    }
}
