pub mod capability;
pub mod context;
pub mod deps;
pub mod error;
pub mod factory;
pub mod injector;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use capability::{Capability, CapabilityOutput, OutputStatus, Params};
pub use context::{
    ClientRequest, ClusterMetadata, ContentRegistry, HostHandles, NetworkClient, NodeEnvironment,
    ObjectRegistry, PageFetcher, SharedContext,
};
pub use deps::{ClientDeps, CrawlerDeps, DependencySet, DetectorDeps, SearchDeps};
pub use error::{CapabilityError, ClientError, InjectError, RegistryError};
pub use factory::{CapabilityFactory, CapabilityKind, FactoryState, KindFactory};
pub use injector::{build_context, inject_into, publish};
pub use registry::{CapabilityDescriptor, CapabilityRegistry};
