#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use buzz_common::observability::{LogConfig, LogFormat};
use buzz_realtime::{Endpoint, RealtimeError, Result, Transport};
use serde_json::{Value, json};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "buzz-tests",
            emit_stderr: true,
            format: if std::env::var("BUZZ_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
            log_dir: Some(std::env::temp_dir().join("buzz-tests")),
        };

        buzz_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Replays canned bodies in order and records every endpoint requested.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String>>>,
    seen: Mutex<Vec<Endpoint>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_body(&self, body: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(body.into()));
        self
    }

    pub fn push_json(&self, body: Value) -> &Self {
        self.push_body(body.to_string())
    }

    pub fn push_err(&self, err: RealtimeError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<Endpoint> {
        self.seen.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_text(&self, endpoint: &Endpoint) -> Result<String> {
        self.seen.lock().unwrap().push(endpoint.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {}", endpoint.path))
    }
}

/// Raw timeline entry as the site sends it.
pub fn entry(id: &str, created_at: i64) -> Value {
    json!({
        "id": id,
        "displayText": format!("post \tSTART\t{id}\tEND\t body"),
        "verified": false,
        "urls": [],
        "hashtags": [],
        "mentions": [],
        "createdAt": created_at,
        "replyCount": 1,
        "rtCount": 2,
        "likesCount": 3,
        "userId": "u1",
        "name": "User One",
        "screenName": "user_one"
    })
}

/// Entries whose id doubles as their timestamp, e.g. `[300, 100]`.
pub fn entries(stamps: &[i64]) -> Value {
    Value::Array(stamps.iter().map(|s| entry(&format!("{s}"), *s)).collect())
}

/// Body of a pagination/autoscroll API response.
pub fn timeline(stamps: &[i64]) -> Value {
    json!({ "timeline": { "entry": entries(stamps) } })
}

/// HTML page embedding `page_data` in a `__NEXT_DATA__` script tag.
pub fn next_data_page(page_data: Value) -> String {
    let payload = json!({ "props": { "pageProps": { "pageData": page_data } } });
    format!(
        "<html><head></head><body><div id=\"root\"></div>\
         <script id=\"__NEXT_DATA__\" type=\"application/json\">{payload}</script>\
         </body></html>"
    )
}

/// First search page carrying `stamps` and crumb `CRUMB`.
pub fn search_page(stamps: &[i64]) -> String {
    next_data_page(json!({
        "timeline": { "entry": entries(stamps) },
        "pagination": { "params": { "crumb": "CRUMB" } }
    }))
}

pub fn ids(tweets: &[buzz_realtime::Tweet]) -> Vec<&str> {
    tweets.iter().map(|t| t.id.as_str()).collect()
}
