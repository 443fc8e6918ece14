//! Anomaly-detection capabilities.

use std::sync::Arc;

use skillhost_capability::{
    Capability, CapabilityError, CapabilityKind, ClientDeps, DetectorDeps, Params,
};

use super::forward::{require_params, Forwarding, Reply};

pub struct SearchAnomalyDetectorsTool;

impl CapabilityKind for SearchAnomalyDetectorsTool {
    type Deps = DetectorDeps;

    const NAME: &'static str = "SearchAnomalyDetectorsTool";
    const DESCRIPTION: &'static str = "Searches anomaly detectors by name, index, or state.";

    fn build(deps: &DetectorDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(
            Forwarding::new(
                Self::NAME,
                "_plugins/_anomaly_detection/detectors/_search",
                Arc::clone(&deps.client),
                params,
            )
            .reply(Reply::Objects(Arc::clone(&deps.objects), "anomaly_detector")),
        ))
    }
}

pub struct SearchAnomalyResultsTool;

impl CapabilityKind for SearchAnomalyResultsTool {
    type Deps = DetectorDeps;

    const NAME: &'static str = "SearchAnomalyResultsTool";
    const DESCRIPTION: &'static str = "Searches anomaly results for one or more detectors.";

    fn build(deps: &DetectorDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(
            Forwarding::new(
                Self::NAME,
                "_plugins/_anomaly_detection/detectors/results/_search",
                Arc::clone(&deps.client),
                params,
            )
            .reply(Reply::Objects(Arc::clone(&deps.objects), "anomaly_result")),
        ))
    }
}

pub struct CreateAnomalyDetectorTool;

impl CapabilityKind for CreateAnomalyDetectorTool {
    type Deps = ClientDeps;

    const NAME: &'static str = "CreateAnomalyDetectorTool";
    const DESCRIPTION: &'static str =
        "Suggests and creates an anomaly detector for an index using a model.";

    fn build(deps: &ClientDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        require_params(Self::NAME, &params, &["model_id"])?;
        Ok(Box::new(
            Forwarding::new(
                Self::NAME,
                "_plugins/_anomaly_detection/detectors",
                Arc::clone(&deps.client),
                params,
            )
            .requires(&["index"]),
        ))
    }
}
