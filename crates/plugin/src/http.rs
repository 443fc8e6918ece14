//! reqwest-backed implementations of the network-facing host handles.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use skillhost_capability::{ClientError, ClientRequest, NetworkClient, PageFetcher};
use skillhost_core::ClusterConfig;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends capability requests to the cluster's REST API.
pub struct RestClient {
    base_url: String,
    credentials: Option<(String, String)>,
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(config: &ClusterConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            http,
        })
    }

    pub fn url_for(&self, action: &str) -> String {
        format!("{}/{}", self.base_url, action.trim_start_matches('/'))
    }
}

#[async_trait]
impl NetworkClient for RestClient {
    async fn execute(&self, request: ClientRequest) -> Result<Value, ClientError> {
        let url = self.url_for(&request.action);
        debug!(url = %url, "cluster request");

        let mut builder = self.http.post(&url).json(&request.body);
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        resp.json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Fetches page bodies over plain HTTP(S).
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ClientError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        resp.text()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
