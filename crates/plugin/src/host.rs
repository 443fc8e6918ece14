//! Host handles for running the plugin outside a cluster node, as the
//! `skillhost` binary does.

use std::sync::Arc;

use serde_json::Value;
use skillhost_capability::{
    ClientError, ClusterMetadata, ContentRegistry, HostHandles, NodeEnvironment, ObjectRegistry,
};
use skillhost_core::Settings;

use crate::error::PluginError;
use crate::http::{HttpPageFetcher, RestClient};

const DEFAULT_NODE_NAME: &str = "skillhost";

/// Cluster metadata taken from local settings.
pub struct StandaloneCluster {
    cluster_name: String,
    node_id: String,
}

impl StandaloneCluster {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cluster_name: settings.cluster.host.clone(),
            node_id: node_name(settings),
        }
    }
}

impl ClusterMetadata for StandaloneCluster {
    fn cluster_name(&self) -> String {
        self.cluster_name.clone()
    }

    fn local_node_id(&self) -> String {
        self.node_id.clone()
    }
}

/// Content parsers for JSON replies. Knows `search_response`, which reduces
/// a search reply to the `_source` of each hit.
pub struct JsonContentRegistry;

impl JsonContentRegistry {
    pub const PARSERS: &'static [&'static str] = &["search_response"];
}

impl ContentRegistry for JsonContentRegistry {
    fn contains(&self, name: &str) -> bool {
        Self::PARSERS.contains(&name)
    }

    fn parse(&self, name: &str, raw: Value) -> Result<Value, ClientError> {
        match name {
            "search_response" => Ok(search_hits(raw)),
            other => Err(ClientError::Decode(format!("no content parser '{other}'"))),
        }
    }
}

fn search_hits(raw: Value) -> Value {
    match raw.pointer("/hits/hits").and_then(Value::as_array) {
        Some(hits) => Value::Array(
            hits.iter()
                .map(|hit| hit.get("_source").cloned().unwrap_or_else(|| hit.clone()))
                .collect(),
        ),
        None => raw,
    }
}

/// Object decoders for anomaly-detection replies.
pub struct JsonObjectRegistry;

impl JsonObjectRegistry {
    pub const OBJECTS: &'static [&'static str] = &["anomaly_detector", "anomaly_result"];
}

impl ObjectRegistry for JsonObjectRegistry {
    fn contains(&self, name: &str) -> bool {
        Self::OBJECTS.contains(&name)
    }

    fn decode(&self, name: &str, raw: Value) -> Result<Value, ClientError> {
        if !self.contains(name) {
            return Err(ClientError::Decode(format!("no object decoder '{name}'")));
        }
        match raw {
            Value::Object(_) => Ok(search_hits(raw)),
            other => Err(ClientError::Decode(format!(
                "{name} reply must be an object, got {other}"
            ))),
        }
    }
}

fn node_name(settings: &Settings) -> String {
    settings
        .node
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_NODE_NAME.to_string())
}

/// Every handle except the executor service, which
/// [`bootstrap`](crate::bootstrap) provisions.
pub fn standalone_handles(settings: &Settings) -> Result<HostHandles, PluginError> {
    let handles = HostHandles::new()
        .client(Arc::new(RestClient::new(&settings.cluster)?))
        .cluster(Arc::new(StandaloneCluster::from_settings(settings)))
        .content(Arc::new(JsonContentRegistry))
        .node(Arc::new(NodeEnvironment {
            node_name: node_name(settings),
        }))
        .objects(Arc::new(JsonObjectRegistry))
        .fetcher(Arc::new(HttpPageFetcher::new()?));
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_response_keeps_hit_sources() {
        let raw = json!({
            "took": 3,
            "hits": {"hits": [
                {"_id": "1", "_source": {"msg": "a"}},
                {"_id": "2", "_source": {"msg": "b"}},
            ]}
        });
        let parsed = JsonContentRegistry.parse("search_response", raw).unwrap();
        assert_eq!(parsed, json!([{"msg": "a"}, {"msg": "b"}]));
    }

    #[test]
    fn unknown_parser_is_a_decode_error() {
        let reg = JsonContentRegistry;
        assert!(!reg.contains("ppl_response"));
        assert!(matches!(
            reg.parse("ppl_response", json!({})),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn object_decoder_rejects_non_objects() {
        let reg = JsonObjectRegistry;
        assert!(reg.contains("anomaly_detector"));
        assert!(reg.decode("anomaly_result", json!({"total": 0})).is_ok());
        assert!(reg.decode("anomaly_result", json!([1, 2])).is_err());
        assert!(reg.decode("monitor", json!({})).is_err());
    }

    #[test]
    fn standalone_handles_leave_executors_to_bootstrap() {
        let settings = Settings::from_toml("[node]\nname = \"edge-1\"\n").unwrap();
        let handles = standalone_handles(&settings).unwrap();
        assert!(handles.executors.is_none());
        assert!(handles.client.is_some());
        assert!(handles.fetcher.is_some());
        assert_eq!(handles.node.as_ref().unwrap().node_name, "edge-1");
        assert_eq!(handles.cluster.as_ref().unwrap().local_node_id(), "edge-1");
    }
}
