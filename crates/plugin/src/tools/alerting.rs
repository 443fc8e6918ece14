//! Alerting capabilities: alert and monitor lookup, monitor creation.

use std::sync::Arc;

use skillhost_capability::{Capability, CapabilityError, CapabilityKind, ClientDeps, Params};

use super::forward::Forwarding;

pub struct SearchAlertsTool;

impl CapabilityKind for SearchAlertsTool {
    type Deps = ClientDeps;

    const NAME: &'static str = "SearchAlertsTool";
    const DESCRIPTION: &'static str = "Searches alerts, optionally filtered by monitor or state.";

    fn build(deps: &ClientDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Forwarding::new(
            Self::NAME,
            "_plugins/_alerting/monitors/alerts",
            Arc::clone(&deps.client),
            params,
        )))
    }
}

pub struct SearchMonitorsTool;

impl CapabilityKind for SearchMonitorsTool {
    type Deps = ClientDeps;

    const NAME: &'static str = "SearchMonitorsTool";
    const DESCRIPTION: &'static str = "Searches alerting monitors by name, id, or type.";

    fn build(deps: &ClientDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Forwarding::new(
            Self::NAME,
            "_plugins/_alerting/monitors/_search",
            Arc::clone(&deps.client),
            params,
        )))
    }
}

pub struct CreateAlertTool;

impl CapabilityKind for CreateAlertTool {
    type Deps = ClientDeps;

    const NAME: &'static str = "CreateAlertTool";
    const DESCRIPTION: &'static str = "Creates an alerting monitor from a natural-language request.";

    fn build(deps: &ClientDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(
            Forwarding::new(
                Self::NAME,
                "_plugins/_alerting/monitors",
                Arc::clone(&deps.client),
                params,
            )
            .requires(&["question"]),
        ))
    }
}
