//! The fixed set of skills capabilities.

pub mod alerting;
pub mod anomaly;
pub mod forward;
pub mod ppl;
pub mod search;
pub mod web_search;

use std::sync::Arc;

use skillhost_capability::{CapabilityFactory, KindFactory};

pub use alerting::{CreateAlertTool, SearchAlertsTool, SearchMonitorsTool};
pub use anomaly::{CreateAnomalyDetectorTool, SearchAnomalyDetectorsTool, SearchAnomalyResultsTool};
pub use ppl::PplTool;
pub use search::{LogPatternTool, NeuralSparseSearchTool, RagTool, VectorDbTool};
pub use web_search::WebSearchTool;

/// One fresh factory per capability, in the order they are exposed to the host.
pub fn factories() -> Vec<Arc<dyn CapabilityFactory>> {
    vec![
        Arc::new(KindFactory::<PplTool>::new()),
        Arc::new(KindFactory::<NeuralSparseSearchTool>::new()),
        Arc::new(KindFactory::<VectorDbTool>::new()),
        Arc::new(KindFactory::<RagTool>::new()),
        Arc::new(KindFactory::<SearchAlertsTool>::new()),
        Arc::new(KindFactory::<SearchAnomalyDetectorsTool>::new()),
        Arc::new(KindFactory::<SearchAnomalyResultsTool>::new()),
        Arc::new(KindFactory::<SearchMonitorsTool>::new()),
        Arc::new(KindFactory::<CreateAlertTool>::new()),
        Arc::new(KindFactory::<CreateAnomalyDetectorTool>::new()),
        Arc::new(KindFactory::<LogPatternTool>::new()),
        Arc::new(KindFactory::<WebSearchTool>::new()),
    ]
}
