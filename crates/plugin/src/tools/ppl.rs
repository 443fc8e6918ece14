//! Natural-language to PPL translation, executed by the cluster's PPL endpoint.

use std::sync::Arc;

use skillhost_capability::{Capability, CapabilityError, CapabilityKind, ClientDeps, Params};

use super::forward::Forwarding;

pub struct PplTool;

impl CapabilityKind for PplTool {
    type Deps = ClientDeps;

    const NAME: &'static str = "PPLTool";
    const DESCRIPTION: &'static str =
        "Translates a question about an index into a PPL query and runs it.";

    fn build(deps: &ClientDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(
            Forwarding::new(Self::NAME, "_plugins/_ppl", Arc::clone(&deps.client), params)
                .requires(&["question", "index"]),
        ))
    }
}
