//! Minimal HTTP GET client with safe logging.
//!
//! - One GET per call, joined onto a fixed base URL, query folded into the URL
//! - Redacts sensitive query params and headers in every log line
//! - Single attempt per call: failures surface to the caller untouched
//! - Optional *raw* request/response logging via `BUZZ_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), buzz_http::HttpError> {
//! let client = buzz_http::HttpClient::new("https://search.example.com/realtime/")?;
//! let page: String = client
//!     .get_text("search", buzz_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: `http.request.start`, `http.response.headers` and
//! `http.error` events carry a per-process request id; raw curl/response lines
//! go to target `http.raw` when `BUZZ_HTTP_RAW=1`.

use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "BUZZ_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_LEN: usize = 500;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Per-request knobs.
///
/// ```
/// use buzz_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: vec![("p", Cow::Borrowed("rust"))],
/// };
/// assert_eq!(opts.query.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    /// Overrides [`HttpClient::default_timeout`].
    pub timeout: Option<Duration>,
    /// Appended to the URL in order.
    pub query: Vec<(&'a str, Cow<'a, str>)>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    user_agent: Option<HeaderValue>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// Relative paths are joined onto the base, so a base that should keep its
    /// last path segment needs a trailing slash.
    ///
    /// ```no_run
    /// use buzz_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://search.example.com/realtime/")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            user_agent: None,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Send this `User-Agent` with every request.
    pub fn with_user_agent(mut self, ua: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        self.user_agent = Some(value);
        Ok(self)
    }

    /// Base-relative URL for `path` with `query` appended.
    fn url_for(&self, path: &str, query: &[(&str, Cow<'_, str>)]) -> Result<Url, HttpError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));
        }
        Ok(url)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ua) = &self.user_agent {
            headers.insert(USER_AGENT, ua.clone());
        }
        headers
    }

    /// GET a document and return its body as text.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let url = self.url_for(path, &opts.query)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let headers = self.headers();
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);

        let (host_path, query) = redact_query(&url);
        tracing::debug!(
            req_id,
            host_path = %host_path,
            query = ?query,
            timeout_ms = timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&url, &headers);
            tracing::debug!(target: "http.raw", req_id, %curl, "request");
        }

        let started = Instant::now();
        let network = |stage: &'static str| {
            move |err: reqwest::Error| {
                let message = err.to_string();
                tracing::warn!(req_id, stage, message = %message, "http.network_error");
                HttpError::Network(message)
            }
        };
        let resp = self
            .inner
            .get(url)
            .timeout(timeout)
            .headers(headers)
            .send()
            .await
            .map_err(network("send"))?;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(network("body"))?;

        let upstream_id = upstream_request_id(&resp_headers);
        tracing::debug!(
            req_id,
            %status,
            duration_ms = started.elapsed().as_millis() as u64,
            body_len = body.len(),
            content_len = content_len(&resp_headers, body.len()),
            x_request_id = %upstream_id,
            "http.response.headers"
        );
        if raw_enabled() {
            let shown = &body[..body.len().min(RAW_MAX_BODY)];
            tracing::info!(
                target: "http.raw",
                req_id,
                %status,
                headers = ?redact_headers(&resp_headers),
                body = %String::from_utf8_lossy(shown),
                truncated = body.len() > RAW_MAX_BODY
            );
        }

        if status.is_success() {
            return Ok(String::from_utf8_lossy(&body).into_owned());
        }

        let message = extract_error_message(&body);
        tracing::warn!(
            req_id,
            %status,
            message = %message,
            x_request_id = %upstream_id,
            body_snippet = %snip_body(&body),
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: upstream_id,
        })
    }
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token" | "auth" | "key" | "api_key" | "token" | "secret" | "client_secret"
    )
}

fn is_secret_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization")
        || name.eq_ignore_ascii_case("cookie")
        || name.eq_ignore_ascii_case("set-cookie")
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let val = if is_secret_header(k.as_str()) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (k.as_str().to_string(), val)
        })
        .collect()
}

/// `host + path` and the query pairs with secret values masked.
fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let pairs = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) { "<redacted>".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    (host_path, pairs)
}

/// Best-effort curl line for reproducing a request.
fn make_curl(url: &Url, headers: &HeaderMap) -> String {
    let mut line = String::from("curl -XGET");
    for (name, val) in redact_headers(headers) {
        line.push_str(&format!(" -H '{name}: {}'", val.replace('\'', r"'\''")));
    }
    let (host_path, query) = redact_query(url);
    line.push_str(&format!(" '{}://{host_path}", url.scheme()));
    for (i, (k, v)) in query.iter().enumerate() {
        line.push(if i == 0 { '?' } else { '&' });
        line.push_str(&format!("{k}={v}"));
    }
    line.push('\'');
    line
}

fn upstream_request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .or_else(|| headers.get("x-correlation-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// `message`, `detail` or `error` from a JSON error body, else a snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    serde_json::from_slice::<Msg>(body)
        .ok()
        .and_then(|m| {
            [m.message, m.detail, m.error]
                .into_iter()
                .find(|s| !s.is_empty())
        })
        .unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > SNIPPET_LEN {
        let mut cut = SNIPPET_LEN;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

fn content_len(headers: &HeaderMap, body_len: usize) -> usize {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(body_len)
}
