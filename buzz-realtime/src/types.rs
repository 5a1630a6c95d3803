//! Upstream payload shapes, exactly as the realtime search site sends them.
//!
//! These stay crate-private in spirit: callers get the remapped records from
//! [`crate::record`], [`crate::trend`] and [`crate::transition`].
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RealtimeError, Result};

/// Deserialize the value at a JSON pointer, or fail with a schema error
/// naming the pointer.
pub(crate) fn take<T: DeserializeOwned>(root: &Value, pointer: &str) -> Result<T> {
    let node = root
        .pointer(pointer)
        .ok_or_else(|| RealtimeError::schema(pointer, "field absent"))?;
    T::deserialize(node).map_err(|e| RealtimeError::schema(pointer, e.to_string()))
}

/// Like [`take`], but an absent field yields `None`.
pub(crate) fn take_opt<T: DeserializeOwned>(root: &Value, pointer: &str) -> Result<Option<T>> {
    match root.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(node) => T::deserialize(node)
            .map(Some)
            .map_err(|e| RealtimeError::schema(pointer, e.to_string())),
    }
}

/// Counters sometimes arrive as numbers and sometimes as digit strings
/// (`"1,204"`). Null counts as zero.
pub(crate) fn lenient_count<'de, D>(d: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| de::Error::custom(format!("negative count: {n}"))),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| *c != ',').collect();
            digits
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("not a count: {s:?}")))
        }
        other => Err(de::Error::custom(format!("not a count: {other}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTweet {
    pub id: String,
    pub display_text: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub urls: Vec<RawUrl>,
    #[serde(default)]
    pub hashtags: Vec<RawHashtag>,
    #[serde(default)]
    pub mentions: Vec<RawMention>,
    pub created_at: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reply_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub rt_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes_count: u64,
    pub user_id: String,
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub quoted_tweet: Option<RawQuoted>,
    #[serde(default)]
    pub media: Vec<RawMedia>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUrl {
    pub expanded_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHashtag {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMention {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuoted {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMedia {
    #[serde(rename = "type")]
    pub kind: String,
    pub item: RawMediaItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMediaItem {
    pub url: String,
}

/// One `buzzTrend.items[]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrendItem {
    pub query: String,
    #[serde(default)]
    pub rank_up: Value,
    #[serde(default)]
    pub tweet_count: Value,
    #[serde(default)]
    pub genre: Value,
    #[serde(default)]
    pub child_buzz: Value,
}

/// One `poptw.items[]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPopularTweet {
    pub url: String,
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reply: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub rt: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like: u64,
    #[serde(default)]
    pub time: Value,
}

/// One `hotBuzz.items[]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHotBuzz {
    pub query: String,
}
