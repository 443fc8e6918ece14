//! Client-backed capability instance shared by every cluster-facing tool.
//!
//! An instance merges its create-time params with the caller's input and
//! sends the result to a fixed action on the cluster client, optionally
//! passing the reply through a named content parser or object decoder.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use skillhost_capability::{
    Capability, CapabilityError, CapabilityOutput, ClientRequest, ContentRegistry, NetworkClient,
    ObjectRegistry, Params,
};
use tracing::debug;

/// How a reply is post-processed before it reaches the host.
#[derive(Clone)]
pub enum Reply {
    Raw,
    Content(Arc<dyn ContentRegistry>, &'static str),
    Objects(Arc<dyn ObjectRegistry>, &'static str),
}

pub struct Forwarding {
    name: &'static str,
    action: &'static str,
    required: &'static [&'static str],
    client: Arc<dyn NetworkClient>,
    params: Params,
    reply: Reply,
}

impl Forwarding {
    pub fn new(
        name: &'static str,
        action: &'static str,
        client: Arc<dyn NetworkClient>,
        params: Params,
    ) -> Self {
        Self {
            name,
            action,
            required: &[],
            client,
            params,
            reply: Reply::Raw,
        }
    }

    /// Fields that must be present in the request body, supplied either at
    /// create time or in the run input.
    pub fn requires(mut self, fields: &'static [&'static str]) -> Self {
        self.required = fields;
        self
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.reply = reply;
        self
    }

    fn request_body(&self, input: Value) -> Value {
        let mut body = self.params.clone();
        if let Value::Object(fields) = input {
            body.extend(fields);
        }
        Value::Object(body)
    }
}

#[async_trait]
impl Capability for Forwarding {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, input: &Value) -> bool {
        let Some(fields) = input.as_object() else {
            return false;
        };
        // Input wins over params, matching `request_body`.
        self.required.iter().all(|key| {
            fields
                .get(*key)
                .or_else(|| self.params.get(*key))
                .is_some_and(|v| !v.is_null())
        })
    }

    async fn run(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        if !self.validate(&input) {
            return Err(CapabilityError::InvalidInput(format!(
                "{} requires fields {:?}",
                self.name, self.required
            )));
        }

        debug!(capability = self.name, action = self.action, "forwarding request");
        let reply = self
            .client
            .execute(ClientRequest::new(self.action, self.request_body(input)))
            .await?;

        let content = match &self.reply {
            Reply::Raw => reply,
            Reply::Content(registry, parser) => registry.parse(parser, reply)?,
            Reply::Objects(registry, kind) => registry.decode(kind, reply)?,
        };
        Ok(CapabilityOutput::ok(content))
    }
}

/// Fail unless every key in `keys` is a non-empty string in `params`.
pub fn require_params(
    capability: &str,
    params: &Params,
    keys: &[&str],
) -> Result<(), CapabilityError> {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|k| {
            params
                .get(*k)
                .and_then(Value::as_str)
                .map_or(true, |s| s.trim().is_empty())
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CapabilityError::InvalidParams(format!(
            "{capability} is missing {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillhost_capability::testing::{IdentityContent, RecordingClient};

    fn params(v: Value) -> Params {
        v.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn input_overrides_params_in_request_body() {
        let client = Arc::new(RecordingClient::default());
        let cap = Forwarding::new(
            "T",
            "_search",
            client.clone(),
            params(json!({"index": "logs", "size": 5})),
        );

        cap.run(json!({"size": 10, "question": "q"})).await.unwrap();

        let sent = client.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].action, "_search");
        assert_eq!(sent[0].body, json!({"index": "logs", "size": 10, "question": "q"}));
    }

    #[tokio::test]
    async fn missing_required_field_is_rejected_before_sending() {
        let client = Arc::new(RecordingClient::default());
        let cap = Forwarding::new("T", "_search", client.clone(), Params::new())
            .requires(&["question"]);

        assert!(!cap.validate(&json!({"other": 1})));
        assert!(!cap.validate(&json!("not an object")));
        assert!(matches!(
            cap.run(json!({"question": null})).await,
            Err(CapabilityError::InvalidInput(_))
        ));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn required_field_may_come_from_params() {
        let client = Arc::new(RecordingClient::default());
        let cap = Forwarding::new(
            "PPLTool",
            "_plugins/_ppl",
            client.clone(),
            params(json!({"index": "logs"})),
        )
        .requires(&["question", "index"]);

        assert!(cap.validate(&json!({"question": "q"})));
        assert!(!cap.validate(&json!({"index": "logs"})));
        // An explicit null in the input overrides the param.
        assert!(!cap.validate(&json!({"question": "q", "index": null})));

        cap.run(json!({"question": "q"})).await.unwrap();
        assert_eq!(client.requests()[0].body, json!({"index": "logs", "question": "q"}));
    }

    #[tokio::test]
    async fn reply_goes_through_content_parser() {
        let client = Arc::new(RecordingClient::default());
        let cap = Forwarding::new("T", "_search", client, Params::new())
            .reply(Reply::Content(Arc::new(IdentityContent), "search_response"));

        let out = cap.run(json!({})).await.unwrap();
        assert_eq!(out.content["action"], "_search");
    }

    #[test]
    fn require_params_lists_missing_keys() {
        let p = params(json!({"index": "logs", "model_id": "  "}));
        let err = require_params("VectorDBTool", &p, &["index", "embedding_field", "model_id"])
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("embedding_field"));
        assert!(msg.contains("model_id"));
        assert!(!msg.contains("index,"));
    }
}
