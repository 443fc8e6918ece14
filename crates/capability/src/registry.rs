use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::capability::{Capability, Params};
use crate::error::{CapabilityError, RegistryError};
use crate::factory::{CapabilityFactory, FactoryState};

/// What the host's dispatch table sees of one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub pool: Option<String>,
    pub state: FactoryState,
}

/// Capability factories keyed by name, in registration order.
///
/// Populated once during startup, then shared read-only behind an `Arc`.
pub struct CapabilityRegistry {
    factories: IndexMap<String, Arc<dyn CapabilityFactory>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Register a factory under its own name. A clash leaves the registry unchanged.
    pub fn register(&mut self, factory: Arc<dyn CapabilityFactory>) -> Result<(), RegistryError> {
        let name = factory.name().to_string();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        info!(capability = %name, "registered capability");
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Look up a factory by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn CapabilityFactory>, RegistryError> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Every factory, in registration order.
    pub fn list_all(&self) -> Vec<Arc<dyn CapabilityFactory>> {
        self.factories.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Descriptors for the host's dispatch table, in registration order.
    pub fn descriptors(&self) -> Vec<CapabilityDescriptor> {
        self.factories
            .values()
            .map(|f| CapabilityDescriptor {
                name: f.name().to_string(),
                description: f.description().to_string(),
                pool: f.pool().map(str::to_string),
                state: f.state(),
            })
            .collect()
    }

    /// Produce an instance of the named capability.
    pub fn create(&self, name: &str, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        self.get(name)?.create(params)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::KindFactory;
    use crate::testing::{EchoKind, FetchKind};

    fn echo() -> Arc<dyn CapabilityFactory> {
        Arc::new(KindFactory::<EchoKind>::new())
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_ok());
        assert!(matches!(
            registry.get("nonexistent"),
            Err(RegistryError::NotFound(name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn duplicate_registration_leaves_registry_unchanged() {
        let mut registry = CapabilityRegistry::new();
        let first = echo();
        registry.register(Arc::clone(&first)).unwrap();

        let err = registry.register(echo()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get("echo").unwrap(), &first));
    }

    #[test]
    fn list_keeps_registration_order() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(KindFactory::<FetchKind>::new())).unwrap();
        registry.register(echo()).unwrap();

        assert_eq!(registry.names(), vec!["fetch", "echo"]);
        let listed: Vec<_> = registry.list_all().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(listed, vec!["fetch", "echo"]);
    }

    #[test]
    fn descriptors_report_pool_and_state() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo()).unwrap();
        registry.register(Arc::new(KindFactory::<FetchKind>::new())).unwrap();

        let defs = registry.descriptors();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].pool, None);
        assert_eq!(defs[1].pool.as_deref(), Some("fetch-pool"));
        assert!(defs.iter().all(|d| d.state == FactoryState::Uninitialized));
    }

    #[test]
    fn create_unknown_capability_is_not_found() {
        let registry = CapabilityRegistry::new();
        assert!(matches!(
            registry.create("ghost", Params::new()),
            Err(CapabilityError::Registry(RegistryError::NotFound(_)))
        ));
    }
}
