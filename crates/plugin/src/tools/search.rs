//! Search-backed capabilities whose replies go through the content registry.

use std::sync::Arc;

use skillhost_capability::{Capability, CapabilityError, CapabilityKind, Params, SearchDeps};

use super::forward::{require_params, Forwarding, Reply};

/// Content parser applied to every search reply.
const SEARCH_RESPONSE: &str = "search_response";

fn search(
    name: &'static str,
    deps: &SearchDeps,
    params: Params,
    required: &'static [&'static str],
) -> Box<dyn Capability> {
    Box::new(
        Forwarding::new(name, "_search", Arc::clone(&deps.client), params)
            .requires(required)
            .reply(Reply::Content(Arc::clone(&deps.content), SEARCH_RESPONSE)),
    )
}

pub struct NeuralSparseSearchTool;

impl CapabilityKind for NeuralSparseSearchTool {
    type Deps = SearchDeps;

    const NAME: &'static str = "NeuralSparseSearchTool";
    const DESCRIPTION: &'static str = "Runs a neural sparse query against an embedding field.";

    fn build(deps: &SearchDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        require_params(Self::NAME, &params, &["index", "embedding_field", "model_id"])?;
        Ok(search(Self::NAME, deps, params, &["input"]))
    }
}

pub struct VectorDbTool;

impl CapabilityKind for VectorDbTool {
    type Deps = SearchDeps;

    const NAME: &'static str = "VectorDBTool";
    const DESCRIPTION: &'static str = "Runs a k-NN neural query against a vector field.";

    fn build(deps: &SearchDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        require_params(Self::NAME, &params, &["index", "embedding_field", "model_id"])?;
        Ok(search(Self::NAME, deps, params, &["input"]))
    }
}

pub struct RagTool;

impl CapabilityKind for RagTool {
    type Deps = SearchDeps;

    const NAME: &'static str = "RAGTool";
    const DESCRIPTION: &'static str =
        "Retrieves supporting documents and answers with an inference model.";

    fn build(deps: &SearchDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        require_params(
            Self::NAME,
            &params,
            &["index", "embedding_field", "inference_model_id"],
        )?;
        Ok(search(Self::NAME, deps, params, &["input"]))
    }
}

pub struct LogPatternTool;

impl CapabilityKind for LogPatternTool {
    type Deps = SearchDeps;

    const NAME: &'static str = "LogPatternTool";
    const DESCRIPTION: &'static str = "Groups log lines from an index into recurring patterns.";

    fn build(deps: &SearchDeps, params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(search(Self::NAME, deps, params, &["index"]))
    }
}
