//! Pagination cursors and the single ordering/merge policy behind them.
//!
//! Cursors are plain values. Engine calls take the current cursor and hand
//! back an advanced copy next to the records they fetched; nothing here does
//! I/O. Three traversals share this module:
//!
//! - replies: a positional offset ([`ReplyCursor`])
//! - older results: an id bound in recency mode, a running offset in
//!   popularity mode ([`SearchCursor`] + [`Direction::Older`])
//! - newer results: an id bound ([`SearchCursor`] + [`Direction::Newer`])
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record::Tweet;

/// Result ordering requested from the search endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Newest first (`md=t`).
    #[default]
    Recency,
    /// Most engaged first (`md=h`).
    Popularity,
}

impl SortMode {
    /// Wire value for the `md` parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Recency => "t",
            Self::Popularity => "h",
        }
    }

    /// Whether result ids fall monotonically down a page, so the last id can
    /// bound the next request.
    pub fn is_id_monotonic(self) -> bool {
        matches!(self, Self::Recency)
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recency" | "t" | "new" | "latest" => Ok(Self::Recency),
            "popularity" | "h" | "popular" | "top" => Ok(Self::Popularity),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recency => f.write_str("recency"),
            Self::Popularity => f.write_str("popularity"),
        }
    }
}

/// Which end of the result set a fetch extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Older,
    Newer,
}

/// What the next request must carry to continue from a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// Everything strictly older than this id (`oldestTweetId`).
    OlderThan(String),
    /// Everything strictly newer than this id (`latestTweetId`).
    NewerThan(String),
    /// Skip this many records (`start`).
    Offset(u64),
}

/// Stable newest-first sort. Ties keep upstream order.
pub fn sort_newest_first(records: &mut [Tweet]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Watermarks of one search session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCursor {
    pub query: String,
    pub media_only: bool,
    pub sort: SortMode,
    /// Pagination token issued with the first page.
    pub crumb: String,
    /// Empty until a page has been seen.
    pub oldest_seen_id: String,
    /// Empty until a page has been seen.
    pub newest_seen_id: String,
    pub total_fetched: u64,
}

impl SearchCursor {
    /// A cursor that has seen nothing yet.
    pub fn new(query: impl Into<String>, media_only: bool, sort: SortMode, crumb: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            media_only,
            sort,
            crumb: crumb.into(),
            oldest_seen_id: String::new(),
            newest_seen_id: String::new(),
            total_fetched: 0,
        }
    }

    /// Order the first page in place and return the cursor positioned on it.
    pub fn seed(self, first_page: &mut [Tweet]) -> Self {
        let mut cursor = self.absorb(Direction::Older, first_page);
        if let Some(first) = first_page.first() {
            cursor.newest_seen_id = first.id.clone();
        }
        cursor
    }

    /// The bound to send when extending in `direction`.
    pub fn bound(&self, direction: Direction) -> Bound {
        match direction {
            Direction::Newer => Bound::NewerThan(self.newest_seen_id.clone()),
            Direction::Older if self.sort.is_id_monotonic() => {
                Bound::OlderThan(self.oldest_seen_id.clone())
            }
            Direction::Older => Bound::Offset(self.total_fetched),
        }
    }

    /// Whether a batch fetched in `direction` gets time-sorted before use.
    pub fn sorts(&self, direction: Direction) -> bool {
        direction == Direction::Newer || self.sort.is_id_monotonic()
    }

    /// Merge policy: order `batch` in place and return the advanced cursor.
    ///
    /// Older batches move `oldest_seen_id` to their last record and add their
    /// size to `total_fetched`. Newer batches move `newest_seen_id` to their
    /// first record. An empty batch leaves the id watermarks untouched.
    pub fn absorb(&self, direction: Direction, batch: &mut [Tweet]) -> Self {
        if self.sorts(direction) {
            sort_newest_first(batch);
        }
        let mut next = self.clone();
        match direction {
            Direction::Older => {
                if let Some(last) = batch.last() {
                    next.oldest_seen_id = last.id.clone();
                }
                next.total_fetched += batch.len() as u64;
            }
            Direction::Newer => {
                if let Some(first) = batch.first() {
                    next.newest_seen_id = first.id.clone();
                }
            }
        }
        next
    }
}

/// Offset into one parent tweet's reply thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyCursor {
    pub fetched: u64,
}

impl ReplyCursor {
    /// Advance by the number of replies actually returned. Thread pages keep
    /// upstream order.
    pub fn absorb(&self, page: &[Tweet]) -> Self {
        Self {
            fetched: self.fetched + page.len() as u64,
        }
    }
}

/// Records from one engine call plus the cursor to continue from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<C> {
    pub records: Vec<Tweet>,
    pub cursor: C,
}
