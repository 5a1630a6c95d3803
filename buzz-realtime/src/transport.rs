//! Fetch transport: one GET per call, handed back as text or parsed JSON.
//!
//! [`Transport`] is the only thing that talks to the network. Tests swap in a
//! scripted implementation; production uses [`HttpTransport`] on top of
//! `buzz-http`.
use std::borrow::Cow;

use async_trait::async_trait;
use buzz_http::{HttpClient, RequestOpts};
use serde_json::Value;

use crate::error::{RealtimeError, Result};
use crate::extract::PayloadExtractor;

/// A relative path plus the query pairs to send with it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Append `key=value` only when `cond` holds.
    pub fn param_if(self, cond: bool, key: &'static str, value: impl Into<String>) -> Self {
        if cond { self.param(key, value) } else { self }
    }

    /// Value of the first pair named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `endpoint` and return the response body.
    async fn get_text(&self, endpoint: &Endpoint) -> Result<String>;
}

/// [`Transport`] backed by the shared HTTP client.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, endpoint: &Endpoint) -> Result<String> {
        let query = endpoint
            .query
            .iter()
            .map(|(k, v)| (*k, Cow::Borrowed(v.as_str())))
            .collect();
        let body = self
            .http
            .get_text(
                &endpoint.path,
                RequestOpts {
                    query,
                    ..Default::default()
                },
            )
            .await?;
        Ok(body)
    }
}

/// GET a raw-JSON endpoint and parse its body.
pub async fn fetch_json(transport: &dyn Transport, endpoint: &Endpoint) -> Result<Value> {
    let body = transport.get_text(endpoint).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(path = %endpoint.path, error = %e, "realtime.fetch.decode_error");
        RealtimeError::Decode(e.to_string())
    })
}

/// GET an HTML page and parse the JSON payload embedded in it.
pub async fn fetch_embedded(
    transport: &dyn Transport,
    extractor: &dyn PayloadExtractor,
    endpoint: &Endpoint,
) -> Result<Value> {
    let page = transport.get_text(endpoint).await?;
    let payload = extractor.extract(&page)?;
    serde_json::from_str(payload).map_err(|e| {
        tracing::warn!(path = %endpoint.path, error = %e, "realtime.fetch.embedded_decode_error");
        RealtimeError::Decode(e.to_string())
    })
}
