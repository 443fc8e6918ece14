use std::marker::PhantomData;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, info};

use crate::capability::{Capability, Params};
use crate::context::SharedContext;
use crate::deps::DependencySet;
use crate::error::{CapabilityError, InjectError};

/// Lifecycle of a factory. One-way: `Uninitialized → Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryState {
    Uninitialized,
    Ready,
}

/// Produces capability instances on demand. One factory per capability name,
/// living for the whole process.
pub trait CapabilityFactory: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Worker pool this capability submits background work to, if any.
    fn pool(&self) -> Option<&str> {
        None
    }

    fn state(&self) -> FactoryState;

    /// Take this factory's dependency subset from `ctx`.
    ///
    /// Idempotent: once `Ready`, later calls leave the factory untouched.
    fn init(&self, ctx: &SharedContext) -> Result<(), InjectError>;

    /// Build an instance. Fails with [`CapabilityError::NotReady`] before `init`.
    fn create(&self, params: Params) -> Result<Box<dyn Capability>, CapabilityError>;
}

/// Compile-time description of one capability: its name, the dependency
/// subset it needs, and how to build an instance from them.
pub trait CapabilityKind: Send + Sync + 'static {
    type Deps: DependencySet;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    const POOL: Option<&'static str> = None;

    fn build(deps: &Self::Deps, params: Params) -> Result<Box<dyn Capability>, CapabilityError>;
}

/// Factory for a [`CapabilityKind`], holding its dependencies once injected.
pub struct KindFactory<K: CapabilityKind> {
    deps: OnceLock<K::Deps>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CapabilityKind> KindFactory<K> {
    pub fn new() -> Self {
        Self {
            deps: OnceLock::new(),
            _kind: PhantomData,
        }
    }

    /// Injected dependencies, once `Ready`.
    pub fn deps(&self) -> Option<&K::Deps> {
        self.deps.get()
    }
}

impl<K: CapabilityKind> Default for KindFactory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: CapabilityKind> CapabilityFactory for KindFactory<K> {
    fn name(&self) -> &str {
        K::NAME
    }

    fn description(&self) -> &str {
        K::DESCRIPTION
    }

    fn pool(&self) -> Option<&str> {
        K::POOL
    }

    fn state(&self) -> FactoryState {
        if self.deps.get().is_some() {
            FactoryState::Ready
        } else {
            FactoryState::Uninitialized
        }
    }

    fn init(&self, ctx: &SharedContext) -> Result<(), InjectError> {
        if self.deps.get().is_some() {
            debug!(capability = K::NAME, "factory already ready, skipping init");
            return Ok(());
        }
        let deps = K::Deps::select(ctx)?;
        if self.deps.set(deps).is_ok() {
            info!(capability = K::NAME, "capability factory ready");
        }
        Ok(())
    }

    fn create(&self, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        let deps = self
            .deps
            .get()
            .ok_or_else(|| CapabilityError::NotReady(K::NAME.to_string()))?;
        K::build(deps, params)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{full_handles, EchoKind, FetchKind};

    #[tokio::test]
    async fn starts_uninitialized_and_refuses_to_create() {
        let factory = KindFactory::<EchoKind>::new();
        assert_eq!(factory.state(), FactoryState::Uninitialized);
        assert!(matches!(
            factory.create(Params::new()),
            Err(CapabilityError::NotReady(name)) if name == "echo"
        ));
    }

    #[tokio::test]
    async fn init_makes_factory_ready() {
        let (handles, _client) = full_handles();
        let ctx = crate::build_context(&handles).unwrap();

        let factory = KindFactory::<EchoKind>::new();
        factory.init(&ctx).unwrap();
        assert_eq!(factory.state(), FactoryState::Ready);

        let cap = factory.create(Params::new()).unwrap();
        assert_eq!(cap.name(), "echo");
    }

    #[tokio::test]
    async fn repeated_init_does_not_reacquire_handles() {
        let (handles, client) = full_handles();
        let ctx = crate::build_context(&handles).unwrap();

        let factory = KindFactory::<EchoKind>::new();
        factory.init(&ctx).unwrap();
        let after_first = Arc::strong_count(&client);

        factory.init(&ctx).unwrap();
        assert_eq!(Arc::strong_count(&client), after_first);
        assert_eq!(factory.state(), FactoryState::Ready);
        assert!(Arc::ptr_eq(
            &factory.deps().unwrap().client,
            ctx.client()
        ));
    }

    #[tokio::test]
    async fn crawler_deps_require_a_fetcher() {
        let (mut handles, _client) = full_handles();
        handles.fetcher = None;
        let ctx = crate::build_context(&handles).unwrap();

        let factory = KindFactory::<FetchKind>::new();
        assert!(matches!(
            factory.init(&ctx),
            Err(InjectError::MissingDependency("fetcher"))
        ));
        assert_eq!(factory.state(), FactoryState::Uninitialized);

        let (handles, _client) = full_handles();
        let ctx = crate::build_context(&handles).unwrap();
        factory.init(&ctx).unwrap();
        assert_eq!(factory.pool(), Some("fetch-pool"));
        assert_eq!(factory.state(), FactoryState::Ready);
    }
}
