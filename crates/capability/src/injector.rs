//! Two-phase startup wiring: build the shared context, then inject it into
//! every registered factory before the registry is handed to the host.

use std::sync::Arc;

use tracing::info;

use crate::context::{HostHandles, SharedContext};
use crate::error::InjectError;
use crate::factory::{CapabilityFactory, FactoryState};
use crate::registry::CapabilityRegistry;

/// Compose the host's handles into a [`SharedContext`].
///
/// Pure: touches no factory. Fails on the first mandatory handle left unset.
pub fn build_context(handles: &HostHandles) -> Result<SharedContext, InjectError> {
    SharedContext::from_handles(handles)
}

/// Initialize one factory with the subset of `ctx` it declares.
pub fn inject_into(factory: &dyn CapabilityFactory, ctx: &SharedContext) -> Result<(), InjectError> {
    factory.init(ctx)?;
    match factory.state() {
        FactoryState::Ready => Ok(()),
        FactoryState::Uninitialized => Err(InjectError::NotReady(factory.name().to_string())),
    }
}

/// Inject `ctx` into every factory and freeze the registry.
///
/// The returned registry only exists once every factory is `Ready`; on error
/// the registry is dropped and never reaches the host.
pub fn publish(
    registry: CapabilityRegistry,
    ctx: &SharedContext,
) -> Result<Arc<CapabilityRegistry>, InjectError> {
    for factory in registry.list_all() {
        inject_into(factory.as_ref(), ctx)?;
    }
    info!(
        capabilities = registry.len(),
        cluster = %ctx.cluster().cluster_name(),
        node = %ctx.node().node_name,
        node_id = %ctx.cluster().local_node_id(),
        "capability registry published"
    );
    Ok(Arc::new(registry))
}
