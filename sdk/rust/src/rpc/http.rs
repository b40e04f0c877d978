//! Minimal JSON-RPC HTTP transport (reqwest).
//!
//! Features:
//! - Async `reqwest` client with sane defaults (timeouts, UA).
//! - Optional bearer auth & custom headers.
//! - No automatic retries: node and network errors surface to the caller as-is.
//!
//! This transport does not interpret chain semantics.

use crate::config::RpcConfig;
use crate::error::{Error, Result, RpcErrorObj};
use crate::rpc::Transport;
use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    // `null` and absent results are both legal (e.g. pending receipts).
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObj>,
}

/// Builder for [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpTransportBuilder {
    endpoint: Url,
    timeout: Duration,
    connect_timeout: Duration,
    default_headers: header::HeaderMap,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(10),
            default_headers: header::HeaderMap::new(),
            user_agent: None,
        }
    }

    pub fn parse(endpoint: &str) -> Result<Self> {
        Ok(Self::new(endpoint.parse::<Url>()?))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn bearer_auth(mut self, token: &str) -> Self {
        let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .unwrap_or_else(|_| header::HeaderValue::from_static("Bearer INVALID"));
        self.default_headers.insert(header::AUTHORIZATION, value);
        self
    }

    pub fn header(mut self, key: header::HeaderName, value: header::HeaderValue) -> Self {
        self.default_headers.insert(key, value);
        self
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_owned());
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let mut headers = self.default_headers.clone();
        headers.entry(header::CONTENT_TYPE).or_insert(header::HeaderValue::from_static("application/json"));
        let ua = self
            .user_agent
            .and_then(|ua| header::HeaderValue::from_str(&ua).ok())
            .unwrap_or_else(|| header::HeaderValue::from_static("contract-binding"));
        headers.entry(header::USER_AGENT).or_insert(ua);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| Error::Network(format!("reqwest build: {e}")))?;

        Ok(HttpTransport { endpoint: self.endpoint, client, id: AtomicU64::new(1) })
    }
}

/// Async JSON-RPC HTTP transport.
pub struct HttpTransport {
    endpoint: Url,
    client: Client,
    id: AtomicU64,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").field("endpoint", &self.endpoint).finish()
    }
}

impl HttpTransport {
    /// Quick constructor with defaults.
    pub fn new(endpoint: &str) -> Result<Self> {
        HttpTransportBuilder::parse(endpoint)?.build()
    }

    /// Transport for `http://<host>:<port>`.
    pub fn from_config(cfg: &RpcConfig) -> Result<Self> {
        Self::new(&cfg.url())
    }

    /// Create a builder for custom configuration.
    pub fn builder(endpoint: &str) -> Result<HttpTransportBuilder> {
        HttpTransportBuilder::parse(endpoint)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // --------------------------- internals ----------------------------------

    fn next_id(&self) -> u64 {
        self.id.fetch_add(1, Ordering::Relaxed)
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id();
        let req = RpcRequest { jsonrpc: "2.0", id, method, params };
        let body = serde_json::to_vec(&req)?;
        trace!(id, %method, "http.send");

        let resp = self.client.post(self.endpoint.clone()).body(body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(http_status_error(status, &bytes));
        }

        let parsed: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| Error::RpcResponse(format!("decode rpc response: {e}; body={}", truncate_body(&bytes))))?;
        match parsed.error {
            Some(err) => Err(Error::Rpc(err)),
            None => Ok(parsed.result),
        }
    }
}

impl Transport for HttpTransport {
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        self.send(method, params).boxed()
    }
}

// --------------------------- helpers -----------------------------------------

fn truncate_body(bytes: &[u8]) -> String {
    const LIM: usize = 512;
    let s = String::from_utf8_lossy(bytes);
    if s.len() > LIM {
        let mut cut = LIM;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...[+{}B]", &s[..cut], s.len() - cut)
    } else {
        s.into_owned()
    }
}

fn http_status_error(status: StatusCode, body: &[u8]) -> Error {
    Error::HttpStatus { status: status.as_u16(), body: truncate_body(body) }
}

// ------------------------------ tests ----------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let c = HttpTransport::new("http://localhost:8545").unwrap();
        assert_eq!(c.endpoint().as_str(), "http://localhost:8545/");
    }

    #[test]
    fn id_increments() {
        let c = HttpTransport::builder("http://localhost:8545").unwrap().build().unwrap();
        let a = c.next_id();
        let b = c.next_id();
        assert!(b > a);
    }

    #[test]
    fn bad_url_is_rejected() {
        assert!(matches!(HttpTransport::new("not a url"), Err(Error::Url(_))));
    }

    #[test]
    fn null_result_is_not_an_error() {
        let parsed: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(parsed.error.is_none());
        assert!(parsed.result.is_null());
    }

    #[test]
    fn error_object_is_parsed() {
        let parsed: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#,
        )
        .unwrap();
        let err = parsed.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "method not found");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = vec![b'x'; 600];
        let s = truncate_body(&body);
        assert!(s.ends_with("...[+88B]"));
    }
}
