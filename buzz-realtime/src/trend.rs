//! Trend snapshot: trending terms, popular tweets, and rapidly rising terms.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RealtimeError, Result};
use crate::types::{RawHotBuzz, RawPopularTweet, RawTrendItem, take, take_opt};

static TWEET_ID_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/realtime/search/tweet/(\d+)").expect("static tweet url pattern")
});

const TREND_ITEMS: &str = "/buzzTrend/items";
const POPULAR_ITEMS: &str = "/poptw/items";
const HOTBUZZ_ITEMS: &str = "/hotBuzz/items";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    /// Trending terms.
    pub trend: Vec<TrendTerm>,
    /// Popular tweets.
    pub tweet: Vec<PopularTweet>,
    /// Rapidly rising terms. Only the landing page carries them.
    pub hotbuzz: Vec<String>,
}

/// `rankUp`, `tweetCount`, `genre` and `childBuzz` are passed through as the
/// site sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendTerm {
    pub query: String,
    pub rank_up: Value,
    pub tweet_count: Value,
    pub genre: Value,
    pub child_buzz: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularTweet {
    pub id: String,
    pub body: String,
    pub image_url: Option<String>,
    pub reply_count: u64,
    pub rt_count: u64,
    pub like_count: u64,
    pub time: Value,
}

impl From<RawTrendItem> for TrendTerm {
    fn from(raw: RawTrendItem) -> Self {
        Self {
            query: raw.query,
            rank_up: raw.rank_up,
            tweet_count: raw.tweet_count,
            genre: raw.genre,
            child_buzz: raw.child_buzz,
        }
    }
}

impl PopularTweet {
    fn from_raw(raw: RawPopularTweet, path: &str) -> Result<Self> {
        let id = TWEET_ID_IN_URL
            .captures(&raw.url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                RealtimeError::schema(path, format!("no tweet id in url {:?}", raw.url))
            })?;
        Ok(Self {
            id,
            body: raw.body,
            image_url: raw.image_url,
            reply_count: raw.reply,
            rt_count: raw.rt,
            like_count: raw.like,
            time: raw.time,
        })
    }
}

impl TrendSnapshot {
    /// Full snapshot from the landing page's `pageData`. All three sections
    /// must be present.
    pub fn from_landing_page(page_data: &Value) -> Result<Self> {
        let trend: Vec<RawTrendItem> = take(page_data, TREND_ITEMS)?;
        let tweet: Vec<RawPopularTweet> = take(page_data, POPULAR_ITEMS)?;
        let hotbuzz: Vec<RawHotBuzz> = take(page_data, HOTBUZZ_ITEMS)?;
        Self::assemble(trend, tweet, hotbuzz)
    }

    /// Snapshot embedded in a search page. Absent sections come back empty.
    pub fn from_search_page(page_data: &Value) -> Result<Self> {
        let trend: Vec<RawTrendItem> = take_opt(page_data, TREND_ITEMS)?.unwrap_or_default();
        let tweet: Vec<RawPopularTweet> = take_opt(page_data, POPULAR_ITEMS)?.unwrap_or_default();
        Self::assemble(trend, tweet, Vec::new())
    }

    fn assemble(
        trend: Vec<RawTrendItem>,
        tweet: Vec<RawPopularTweet>,
        hotbuzz: Vec<RawHotBuzz>,
    ) -> Result<Self> {
        let tweet = tweet
            .into_iter()
            .enumerate()
            .map(|(i, raw)| PopularTweet::from_raw(raw, &format!("{POPULAR_ITEMS}/{i}/url")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            trend: trend.into_iter().map(TrendTerm::from).collect(),
            tweet,
            hotbuzz: hotbuzz.into_iter().map(|h| h.query).collect(),
        })
    }
}
