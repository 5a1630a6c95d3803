//! Entry point for the realtime search site.
//!
//! [`RealtimeClient`] is cheap to clone (two `Arc`s) and hands out the stateful
//! [`Search`] and [`ReplyThread`] objects, which keep a clone of it.
use std::sync::Arc;
use std::time::Duration;

use buzz_http::HttpClient;

use crate::cursor::{Page, ReplyCursor, SearchCursor};
use crate::error::{RealtimeError, Result};
use crate::extract::{PayloadExtractor, ScriptTagExtractor};
use crate::record::{Tweet, check_tweet_id, map_entries};
use crate::replies::{ReplyThread, fetch_replies};
use crate::search::{
    PAGE_DATA, Search, SearchOptions, fetch_newer, fetch_older, page_data, search_endpoint,
};
use crate::transition::{TransitionOptions, VolumeTransition};
use crate::transport::{Endpoint, HttpTransport, Transport, fetch_embedded, fetch_json};
use crate::trend::TrendSnapshot;
use crate::types::{RawTweet, take};

pub const DEFAULT_BASE_URL: &str = "https://search.yahoo.co.jp/realtime/";

/// Where and how to reach the site.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: None,
        }
    }
}

#[derive(Clone)]
pub struct RealtimeClient {
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn PayloadExtractor>,
}

impl RealtimeClient {
    /// Client over HTTP using `settings`.
    ///
    /// ```no_run
    /// use buzz_realtime::{ClientSettings, RealtimeClient};
    ///
    /// let client = RealtimeClient::new(&ClientSettings::default())?;
    /// # Ok::<(), buzz_realtime::RealtimeError>(())
    /// ```
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let mut http = HttpClient::new(&base)?.with_timeout(settings.timeout);
        if let Some(ua) = &settings.user_agent {
            http = http.with_user_agent(ua)?;
        }
        Ok(Self::with_transport(Arc::new(HttpTransport::new(http))))
    }

    /// Client over any transport, extracting `__NEXT_DATA__` payloads.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            extractor: Arc::new(ScriptTagExtractor::next_data()),
        }
    }

    /// Replace the embedded-payload extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn PayloadExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    async fn next_data(&self, endpoint: &Endpoint) -> Result<serde_json::Value> {
        fetch_embedded(self.transport.as_ref(), self.extractor.as_ref(), endpoint).await
    }

    /// Open a search session on `query`.
    ///
    /// The first page is sorted newest-first in recency mode and seeds both id
    /// watermarks; an empty first page leaves them empty.
    pub async fn search(&self, query: &str, opts: SearchOptions) -> Result<Search> {
        let data = self.next_data(&search_endpoint(query, &opts)).await?;
        let page = page_data(&data)?;
        let entries_path = format!("{PAGE_DATA}/timeline/entry");
        let entries = page
            .pointer("/timeline/entry")
            .ok_or_else(|| RealtimeError::schema(&entries_path, "field absent"))?;
        let mut results = map_entries(entries, &entries_path)?;
        let crumb: String = take(page, "/pagination/params/crumb")?;
        let trend = TrendSnapshot::from_search_page(page)?;

        let cursor =
            SearchCursor::new(query, opts.media_only, opts.sort, crumb).seed(&mut results);
        tracing::info!(
            query,
            sort = %opts.sort,
            media_only = opts.media_only,
            results = results.len(),
            "realtime.search.opened"
        );
        Ok(Search::new(self.clone(), cursor, results, trend))
    }

    /// Extend `cursor` toward older results `times` times.
    pub async fn more(&self, cursor: &SearchCursor, times: usize) -> Result<Page<SearchCursor>> {
        fetch_older(self.transport.as_ref(), cursor, times).await
    }

    /// Fetch results newer than `cursor` has seen.
    pub async fn latest(&self, cursor: &SearchCursor) -> Result<Page<SearchCursor>> {
        fetch_newer(self.transport.as_ref(), cursor).await
    }

    /// Fetch `times` pages of replies to `tweet_id` from `cursor`.
    pub async fn replies(
        &self,
        tweet_id: &str,
        cursor: ReplyCursor,
        times: usize,
    ) -> Result<Page<ReplyCursor>> {
        fetch_replies(self.transport.as_ref(), tweet_id, cursor, times).await
    }

    /// Start reading the reply thread of `parent` from its first reply.
    pub fn thread(&self, parent: Tweet) -> ReplyThread {
        ReplyThread::new(self.clone(), parent)
    }

    /// Look up a single tweet by id.
    pub async fn tweet(&self, id: &str) -> Result<Tweet> {
        let id = check_tweet_id(id)?;
        let data = self.next_data(&Endpoint::new(format!("search/tweet/{id}"))).await?;
        let best_path = format!("{PAGE_DATA}/bestTweet");
        let best = page_data(&data)?
            .pointer("/bestTweet")
            .ok_or_else(|| RealtimeError::schema(&best_path, "field absent"))?;
        let raw: RawTweet = serde_json::from_value(best.clone())
            .map_err(|e| RealtimeError::schema(&best_path, e.to_string()))?;
        Ok(Tweet::from(raw))
    }

    /// Trending terms, popular tweets and rising terms from the landing page.
    pub async fn trend(&self) -> Result<TrendSnapshot> {
        let data = self.next_data(&Endpoint::new("")).await?;
        TrendSnapshot::from_landing_page(page_data(&data)?)
    }

    /// Tweet volume over time for `query`.
    pub async fn transition(
        &self,
        query: &str,
        opts: TransitionOptions,
    ) -> Result<VolumeTransition> {
        let endpoint = Endpoint::new("api/v1/transition")
            .param("p", query)
            .param("interval", opts.interval_secs.to_string())
            .param("span", opts.span_secs.to_string())
            .param_if(opts.media_only, "mtype", "image");
        let body = fetch_json(self.transport.as_ref(), &endpoint).await?;
        VolumeTransition::from_response(&body)
    }
}
