//! Search sessions: the first page of a query plus fetch-more / fetch-latest.
//!
//! The engine functions ([`fetch_older`], [`fetch_newer`]) are pure with respect
//! to their input cursor: they return the advanced cursor in a [`Page`] and
//! leave the caller's copy alone. [`Search`] commits that cursor only after a
//! whole call succeeds, so a failure halfway through `n` rounds discards the
//! rounds already fetched and keeps the previous watermarks.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RealtimeClient;
use crate::cursor::{Bound, Direction, Page, SearchCursor, SortMode};
use crate::error::{RealtimeError, Result};
use crate::record::{Tweet, map_entries};
use crate::transport::{Endpoint, Transport, fetch_json};
use crate::trend::TrendSnapshot;

pub(crate) const PAGE_DATA: &str = "/props/pageProps/pageData";
const TIMELINE_ENTRY: &str = "/timeline/entry";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Only tweets with images (`mtype=image`).
    pub media_only: bool,
    pub sort: SortMode,
}

pub(crate) fn search_endpoint(query: &str, opts: &SearchOptions) -> Endpoint {
    Endpoint::new("search")
        .param("p", query)
        .param("md", opts.sort.as_param())
        .param_if(opts.media_only, "mtype", "image")
}

/// Wire name and value carrying a cursor bound.
fn bound_param(bound: Bound) -> (&'static str, String) {
    match bound {
        Bound::OlderThan(id) => ("oldestTweetId", id),
        Bound::NewerThan(id) => ("latestTweetId", id),
        Bound::Offset(n) => ("start", n.to_string()),
    }
}

fn older_endpoint(cursor: &SearchCursor) -> Endpoint {
    let (key, value) = bound_param(cursor.bound(Direction::Older));
    Endpoint::new("api/v1/pagination")
        .param("crumb", cursor.crumb.as_str())
        .param("p", cursor.query.as_str())
        .param("md", cursor.sort.as_param())
        .param_if(cursor.media_only, "mtype", "image")
        .param(key, value)
}

fn newer_endpoint(cursor: &SearchCursor) -> Endpoint {
    let (key, value) = bound_param(cursor.bound(Direction::Newer));
    Endpoint::new("api/v1/autoscroll")
        .param("crumb", cursor.crumb.as_str())
        .param("p", cursor.query.as_str())
        .param(key, value)
        .param_if(cursor.media_only, "mtype", "image")
}

/// The `pageData` object of an embedded search-site payload.
pub(crate) fn page_data(next_data: &Value) -> Result<&Value> {
    next_data
        .pointer(PAGE_DATA)
        .ok_or_else(|| RealtimeError::schema(PAGE_DATA, "field absent"))
}

/// GET a raw-JSON timeline endpoint and map its `timeline.entry` list.
pub(crate) async fn fetch_timeline(
    transport: &dyn Transport,
    endpoint: &Endpoint,
) -> Result<Vec<Tweet>> {
    let body = fetch_json(transport, endpoint).await?;
    let entries = body
        .pointer(TIMELINE_ENTRY)
        .ok_or_else(|| RealtimeError::schema(TIMELINE_ENTRY, "field absent"))?;
    map_entries(entries, TIMELINE_ENTRY)
}

/// Extend toward older results `times` times, one request per round.
///
/// Recency sessions bound each request by the oldest id seen so far and sort
/// every page newest-first; popularity sessions send the running offset and
/// keep upstream order.
pub async fn fetch_older(
    transport: &dyn Transport,
    cursor: &SearchCursor,
    times: usize,
) -> Result<Page<SearchCursor>> {
    let mut cursor = cursor.clone();
    let mut records = Vec::new();
    for round in 0..times {
        let endpoint = older_endpoint(&cursor);
        let mut page = fetch_timeline(transport, &endpoint).await?;
        cursor = cursor.absorb(Direction::Older, &mut page);
        tracing::debug!(
            query = %cursor.query,
            round,
            page_len = page.len(),
            oldest_seen_id = %cursor.oldest_seen_id,
            total_fetched = cursor.total_fetched,
            "realtime.search.older_page"
        );
        records.extend(page);
    }
    Ok(Page { records, cursor })
}

/// Fetch everything newer than the newest id seen, newest first.
pub async fn fetch_newer(transport: &dyn Transport, cursor: &SearchCursor) -> Result<Page<SearchCursor>> {
    let endpoint = newer_endpoint(cursor);
    let mut batch = fetch_timeline(transport, &endpoint).await?;
    let cursor = cursor.absorb(Direction::Newer, &mut batch);
    tracing::debug!(
        query = %cursor.query,
        batch_len = batch.len(),
        newest_seen_id = %cursor.newest_seen_id,
        "realtime.search.newer_batch"
    );
    Ok(Page {
        records: batch,
        cursor,
    })
}

/// A live search over one query.
///
/// Created by [`RealtimeClient::search`]. Holds the first page, the trend
/// snapshot that came with it, and the cursor later calls advance.
pub struct Search {
    client: RealtimeClient,
    cursor: SearchCursor,
    results: Vec<Tweet>,
    trend: TrendSnapshot,
}

impl Search {
    pub(crate) fn new(
        client: RealtimeClient,
        cursor: SearchCursor,
        results: Vec<Tweet>,
        trend: TrendSnapshot,
    ) -> Self {
        Self {
            client,
            cursor,
            results,
            trend,
        }
    }

    pub fn query(&self) -> &str {
        &self.cursor.query
    }

    /// The first page, newest first in recency mode.
    pub fn results(&self) -> &[Tweet] {
        &self.results
    }

    pub fn trend(&self) -> &TrendSnapshot {
        &self.trend
    }

    pub fn cursor(&self) -> &SearchCursor {
        &self.cursor
    }

    /// Fetch `times` more pages of older results.
    pub async fn fetch_more(&mut self, times: usize) -> Result<Vec<Tweet>> {
        let page = self.client.more(&self.cursor, times).await?;
        self.cursor = page.cursor;
        Ok(page.records)
    }

    /// Fetch results newer than anything seen so far.
    pub async fn fetch_latest(&mut self) -> Result<Vec<Tweet>> {
        let page = self.client.latest(&self.cursor).await?;
        self.cursor = page.cursor;
        Ok(page.records)
    }
}

impl std::fmt::Debug for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("query", &self.cursor.query)
            .field("media_only", &self.cursor.media_only)
            .field("results", &self.results.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_endpoint_shape() {
        let ep = search_endpoint(
            "rust",
            &SearchOptions {
                media_only: true,
                sort: SortMode::Popularity,
            },
        );
        assert_eq!(ep.path, "search");
        assert_eq!(
            ep.query,
            vec![
                ("p", "rust".to_string()),
                ("md", "h".to_string()),
                ("mtype", "image".to_string())
            ]
        );
    }

    #[test]
    fn older_endpoint_uses_id_bound_in_recency_mode() {
        let mut c = SearchCursor::new("rust", false, SortMode::Recency, "CR");
        c.oldest_seen_id = "100".into();
        c.total_fetched = 40;
        let ep = older_endpoint(&c);
        assert_eq!(ep.path, "api/v1/pagination");
        assert_eq!(ep.get("crumb"), Some("CR"));
        assert_eq!(ep.get("md"), Some("t"));
        assert_eq!(ep.get("oldestTweetId"), Some("100"));
        assert_eq!(ep.get("start"), None);
        assert_eq!(ep.get("mtype"), None);
    }

    #[test]
    fn older_endpoint_uses_offset_in_popularity_mode() {
        let mut c = SearchCursor::new("rust", true, SortMode::Popularity, "CR");
        c.oldest_seen_id = "100".into();
        c.total_fetched = 40;
        let ep = older_endpoint(&c);
        assert_eq!(ep.get("start"), Some("40"));
        assert_eq!(ep.get("oldestTweetId"), None);
        assert_eq!(ep.get("mtype"), Some("image"));
    }

    #[test]
    fn newer_endpoint_sends_empty_bound_when_nothing_seen() {
        let c = SearchCursor::new("rust", false, SortMode::Recency, "CR");
        let ep = newer_endpoint(&c);
        assert_eq!(ep.path, "api/v1/autoscroll");
        assert_eq!(ep.get("latestTweetId"), Some(""));
        assert_eq!(ep.get("md"), None);
    }
}
