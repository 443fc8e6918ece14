use std::sync::{Arc, OnceLock};

use skillhost_capability::{
    build_context, publish, CapabilityFactory, CapabilityRegistry, HostHandles,
};
use skillhost_core::Settings;
use skillhost_executor::{compute_pool_size, ExecutorService, WorkerPoolSpec};
use tokio::runtime::Handle;
use tracing::info;

use crate::error::PluginError;
use crate::http::HttpPageFetcher;
use crate::tools;

/// Settings prefix the plugin's worker pools are registered under.
pub const SKILLS_THREAD_POOL_PREFIX: &str = "thread_pool.skills";

/// Worker pool dedicated to web-search page crawling.
pub const WEBSEARCH_CRAWLER_THREADPOOL: &str = "websearch-crawler-threadpool";

/// Default backlog of the crawler pool.
pub const WEBSEARCH_CRAWLER_QUEUE_SIZE: usize = 100;

/// The skills plugin: one factory per capability plus the crawler pool.
///
/// Constructed once by the host; [`create_components`](Self::create_components)
/// injects the host's handles and returns the published registry.
pub struct SkillsPlugin {
    settings: Settings,
    factories: Vec<Arc<dyn CapabilityFactory>>,
    executors: OnceLock<Arc<ExecutorService>>,
}

impl SkillsPlugin {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            factories: tools::factories(),
            executors: OnceLock::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Factories in host dispatch order.
    pub fn tool_factories(&self) -> &[Arc<dyn CapabilityFactory>] {
        &self.factories
    }

    /// Worker pools the host must provision before `create_components`.
    pub fn executor_specs(&self) -> Result<Vec<WorkerPoolSpec>, PluginError> {
        Ok(vec![self.websearch_crawler_spec()?])
    }

    /// The plugin's executor service, provisioned from
    /// [`executor_specs`](Self::executor_specs) on first call.
    ///
    /// Factories keep the first service they are injected with, so later
    /// calls return that same service instead of building another one.
    pub fn provision_executors(
        &self,
        runtime: Handle,
    ) -> Result<Arc<ExecutorService>, PluginError> {
        if let Some(existing) = self.executors.get() {
            return Ok(Arc::clone(existing));
        }

        let mut service = ExecutorService::new(runtime);
        service.provision(self.executor_specs()?)?;
        info!(pools = service.len(), "worker pools provisioned");
        Ok(Arc::clone(self.executors.get_or_init(|| Arc::new(service))))
    }

    fn websearch_crawler_spec(&self) -> Result<WorkerPoolSpec, PluginError> {
        let overrides = self
            .settings
            .pool_settings(SKILLS_THREAD_POOL_PREFIX, WEBSEARCH_CRAWLER_THREADPOOL);
        let size = overrides
            .size
            .unwrap_or_else(|| compute_pool_size(self.settings.allocated_processors()));
        let queue_capacity = overrides.queue_size.unwrap_or(WEBSEARCH_CRAWLER_QUEUE_SIZE);

        let spec = WorkerPoolSpec::builder(WEBSEARCH_CRAWLER_THREADPOOL)
            .size(size)
            .queue_capacity(queue_capacity)
            .thread_name_prefix(SKILLS_THREAD_POOL_PREFIX)
            .allow_resize(false)
            .build()?;
        Ok(spec)
    }

    /// Inject the host's handles into every factory and publish the registry.
    ///
    /// Any failure is fatal: no registry is returned, and a failure while
    /// composing the context leaves every factory uninitialized. Calling this
    /// again with the same handles is harmless.
    pub fn create_components(
        &self,
        mut handles: HostHandles,
    ) -> Result<Arc<CapabilityRegistry>, PluginError> {
        if handles.fetcher.is_none() {
            handles.fetcher = Some(Arc::new(HttpPageFetcher::new()?));
        }
        let ctx = build_context(&handles)?;

        let mut registry = CapabilityRegistry::new();
        for factory in &self.factories {
            registry.register(Arc::clone(factory))?;
        }

        Ok(publish(registry, &ctx)?)
    }
}
