//! Reply expansion for a single parent tweet, paged by offset.
use crate::client::RealtimeClient;
use crate::cursor::{Page, ReplyCursor};
use crate::error::Result;
use crate::record::{Tweet, check_tweet_id};
use crate::search::fetch_timeline;
use crate::transport::{Endpoint, Transport};

fn replies_endpoint(tweet_id: &str, cursor: ReplyCursor) -> Endpoint {
    Endpoint::new(format!("api/v1/pagination/tweet/{tweet_id}"))
        .param("start", cursor.fetched.to_string())
}

/// Fetch `times` pages of replies to `tweet_id`, one request per round.
///
/// Each round starts at the running offset and advances it by however many
/// replies came back, so a short or empty page never skips anything. Every
/// round is attempted even after a short page. A non-numeric `tweet_id` is
/// rejected before any request.
pub async fn fetch_replies(
    transport: &dyn Transport,
    tweet_id: &str,
    cursor: ReplyCursor,
    times: usize,
) -> Result<Page<ReplyCursor>> {
    let tweet_id = check_tweet_id(tweet_id)?;
    let mut cursor = cursor;
    let mut records = Vec::new();
    for round in 0..times {
        let endpoint = replies_endpoint(tweet_id, cursor);
        let page = fetch_timeline(transport, &endpoint).await?;
        cursor = cursor.absorb(&page);
        tracing::debug!(
            tweet_id,
            round,
            page_len = page.len(),
            fetched = cursor.fetched,
            "realtime.replies.page"
        );
        records.extend(page);
    }
    Ok(Page { records, cursor })
}

/// A parent tweet together with how far its replies have been read.
pub struct ReplyThread {
    client: RealtimeClient,
    parent: Tweet,
    cursor: ReplyCursor,
}

impl ReplyThread {
    pub(crate) fn new(client: RealtimeClient, parent: Tweet) -> Self {
        Self {
            client,
            parent,
            cursor: ReplyCursor::default(),
        }
    }

    pub fn parent(&self) -> &Tweet {
        &self.parent
    }

    pub fn cursor(&self) -> ReplyCursor {
        self.cursor
    }

    /// Fetch the next `times` pages of replies.
    pub async fn fetch_replies(&mut self, times: usize) -> Result<Vec<Tweet>> {
        let page = self
            .client
            .replies(&self.parent.id, self.cursor, times)
            .await?;
        self.cursor = page.cursor;
        Ok(page.records)
    }
}
