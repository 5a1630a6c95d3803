//! Tweet-volume time series and sentiment split for one query.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::take;

pub const DEFAULT_INTERVAL_SECS: u64 = 900;
pub const DEFAULT_SPAN_SECS: u64 = 21_600;

/// Bucket size and window for a volume query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOptions {
    pub media_only: bool,
    pub interval_secs: u64,
    pub span_secs: u64,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            media_only: false,
            interval_secs: DEFAULT_INTERVAL_SECS,
            span_secs: DEFAULT_SPAN_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTransition {
    /// Total matching tweets over the whole span.
    pub total: u64,
    pub transitions: Vec<TransitionEntry>,
    pub positive: f64,
    pub negative: f64,
}

/// One time bucket, carried with the fields the site sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionEntry(pub Map<String, Value>);

impl TransitionEntry {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[derive(Deserialize)]
struct Total(#[serde(deserialize_with = "crate::types::lenient_count")] u64);

impl VolumeTransition {
    pub fn from_response(body: &Value) -> Result<Self> {
        let Total(total) = take(body, "/tweetTransition/head/totalResultsAvailable")?;
        Ok(Self {
            total,
            transitions: take(body, "/tweetTransition/entry")?,
            positive: take(body, "/sentimentPieChart/positive")?,
            negative: take(body, "/sentimentPieChart/negative")?,
        })
    }
}
