//! One-call startup sequence: provision pools, then inject and publish.

use std::sync::Arc;

use skillhost_capability::{CapabilityRegistry, HostHandles};
use skillhost_executor::{ExecutorService, WorkerPoolSpec};
use tokio::runtime::Handle;

use crate::error::PluginError;
use crate::plugin::SkillsPlugin;

/// Everything a host keeps after a successful startup.
pub struct Bootstrapped {
    pub registry: Arc<CapabilityRegistry>,
    pub executors: Arc<ExecutorService>,
    pub specs: Vec<WorkerPoolSpec>,
}

/// Provision the plugin's worker pools on `runtime`, hand the resulting
/// executor service to the capabilities along with `handles`, and publish
/// the registry.
///
/// Any executor service already present in `handles` is replaced by the
/// plugin's own. Bootstrapping the same plugin again reuses that service;
/// `runtime` only matters on the first call.
pub fn bootstrap(
    plugin: &SkillsPlugin,
    runtime: Handle,
    mut handles: HostHandles,
) -> Result<Bootstrapped, PluginError> {
    let executors = plugin.provision_executors(runtime)?;
    let specs = executors.specs();

    handles.executors = Some(Arc::clone(&executors));
    let registry = plugin.create_components(handles)?;

    Ok(Bootstrapped {
        registry,
        executors,
        specs,
    })
}
