//! Stable tweet record produced from upstream timeline entries.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RealtimeError, Result};
use crate::types::RawTweet;

// Search hits are wrapped as "\tSTART\t<hit>\tEND\t" inside displayText.
static HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\tSTART\t(.+?)\tEND\t").expect("static highlight pattern"));

/// An immutable snapshot of one tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub verified: bool,
    pub urls: Vec<String>,
    pub hashtags: Vec<String>,
    /// Ids of mentioned users.
    pub mentions: Vec<String>,
    /// Unix seconds; the newest-first sort key.
    pub created_at: i64,
    pub reply_count: u64,
    pub rt_count: u64,
    pub like_count: u64,
    pub user_id: String,
    pub user_name: String,
    pub user_screen_name: String,
    /// URL of the quoted tweet, query string removed.
    pub quoted_tweet: Option<String>,
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Accept `id` only if it is a non-empty run of ASCII digits, so it can be
/// spliced into a path segment.
pub fn check_tweet_id(id: &str) -> Result<&str> {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(id)
    } else {
        Err(RealtimeError::InvalidInput(format!(
            "tweet id must be numeric: {id:?}"
        )))
    }
}

impl From<RawTweet> for Tweet {
    fn from(raw: RawTweet) -> Self {
        Self {
            text: strip_highlights(&raw.display_text),
            id: raw.id,
            verified: raw.verified,
            urls: raw.urls.into_iter().map(|u| u.expanded_url).collect(),
            hashtags: raw.hashtags.into_iter().map(|h| h.text).collect(),
            mentions: raw.mentions.into_iter().map(|m| m.id).collect(),
            created_at: raw.created_at,
            reply_count: raw.reply_count,
            rt_count: raw.rt_count,
            like_count: raw.likes_count,
            user_id: raw.user_id,
            user_name: raw.name,
            user_screen_name: raw.screen_name,
            quoted_tweet: raw.quoted_tweet.map(|q| strip_query(&q.url).to_string()),
            media: raw
                .media
                .into_iter()
                .map(|m| Media {
                    kind: m.kind,
                    url: m.item.url,
                })
                .collect(),
        }
    }
}

/// Map a JSON array of timeline entries, keeping upstream order.
///
/// `path` only labels schema errors.
pub fn map_entries(entries: &Value, path: &str) -> Result<Vec<Tweet>> {
    let list = entries
        .as_array()
        .ok_or_else(|| RealtimeError::schema(path, "expected an array of entries"))?;
    list.iter()
        .enumerate()
        .map(|(i, entry)| {
            RawTweet::deserialize(entry)
                .map(Tweet::from)
                .map_err(|e| RealtimeError::schema(format!("{path}/{i}"), e.to_string()))
        })
        .collect()
}

pub(crate) fn strip_highlights(text: &str) -> String {
    HIGHLIGHT.replace_all(text, "$1").into_owned()
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
