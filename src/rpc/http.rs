//! HTTP JSON-RPC transport over reqwest.

use crate::domain::error::{Error, RpcError};
use crate::ports::Transport;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// HTTP transport with a shared connection pool and monotonic request ids.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let started = Instant::now();
        let response: JsonRpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(
            method,
            id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rpc call"
        );

        if let Some(error) = response.error {
            return Err(Error::from(error));
        }
        response
            .result
            .ok_or_else(|| Error::InvalidResponse(format!("{method}: no result and no error")))
    }
}
