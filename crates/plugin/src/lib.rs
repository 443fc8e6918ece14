//! Entry point wiring the skills capabilities into a host node.
//!
//! [`SkillsPlugin`] owns one factory per capability, declares the web-search
//! crawler pool, and publishes a ready registry once the host's handles are
//! injected. [`bootstrap`] runs the whole startup sequence in one call.

pub mod bootstrap;
pub mod error;
pub mod host;
pub mod http;
pub mod plugin;
pub mod tools;

pub use bootstrap::{bootstrap, Bootstrapped};
pub use error::PluginError;
pub use host::{standalone_handles, JsonContentRegistry, JsonObjectRegistry, StandaloneCluster};
pub use http::{HttpPageFetcher, RestClient};
pub use plugin::{
    SkillsPlugin, SKILLS_THREAD_POOL_PREFIX, WEBSEARCH_CRAWLER_QUEUE_SIZE,
    WEBSEARCH_CRAWLER_THREADPOOL,
};
