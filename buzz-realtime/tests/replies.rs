mod common;

use std::sync::Arc;

use buzz_realtime::{RealtimeClient, RealtimeError, ReplyCursor};
use common::{ScriptedTransport, entry, ids, init_test_tracing, next_data_page, timeline};
use serde_json::json;

fn stamps(from: i64, n: i64) -> Vec<i64> {
    (from..from + n).collect()
}

#[tokio::test]
async fn thread_advances_by_replies_actually_returned() {
    init_test_tracing();
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_body(next_data_page(json!({ "bestTweet": entry("42", 1_716_000_000) })))
        .push_json(timeline(&stamps(100, 10)))
        .push_json(timeline(&stamps(200, 10)))
        .push_json(timeline(&stamps(300, 4)))
        .push_json(timeline(&[]));
    let client = RealtimeClient::with_transport(transport.clone());

    let parent = client.tweet("42").await.unwrap();
    let mut thread = client.thread(parent);
    assert_eq!(thread.parent().id, "42");
    assert_eq!(thread.cursor(), ReplyCursor::default());

    let replies = thread.fetch_replies(3).await.unwrap();
    assert_eq!(replies.len(), 24);
    assert_eq!(replies[0].id, "100");
    assert_eq!(replies[10].id, "200");
    assert_eq!(replies[23].id, "303");
    assert_eq!(thread.cursor().fetched, 24);

    // a short page does not end the thread; the next call resumes at the offset
    assert!(thread.fetch_replies(1).await.unwrap().is_empty());
    assert_eq!(thread.cursor().fetched, 24);

    let reqs = transport.requests();
    assert_eq!(reqs[0].path, "search/tweet/42");
    let starts: Vec<_> = reqs[1..].iter().map(|r| r.get("start").unwrap()).collect();
    assert_eq!(starts, vec!["0", "10", "20", "24"]);
    assert!(reqs[1..].iter().all(|r| r.path == "api/v1/pagination/tweet/42"));
}

#[tokio::test]
async fn reply_pages_keep_upstream_order() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_json(timeline(&[5, 9, 7]));
    let client = RealtimeClient::with_transport(transport.clone());

    let page = client
        .replies("42", ReplyCursor { fetched: 5 }, 1)
        .await
        .unwrap();
    assert_eq!(ids(&page.records), vec!["5", "9", "7"]);
    assert_eq!(page.cursor.fetched, 8);
    assert_eq!(transport.requests()[0].get("start"), Some("5"));
}

#[tokio::test]
async fn failed_round_leaves_thread_cursor_alone() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_json(timeline(&[1, 2]))
        .push_json(json!({ "timeline": {} }));
    let client = RealtimeClient::with_transport(transport.clone());
    let mut thread = client.thread(buzz_realtime::Tweet {
        id: "42".into(),
        text: String::new(),
        verified: false,
        urls: vec![],
        hashtags: vec![],
        mentions: vec![],
        created_at: 0,
        reply_count: 0,
        rt_count: 0,
        like_count: 0,
        user_id: "u".into(),
        user_name: "u".into(),
        user_screen_name: "u".into(),
        quoted_tweet: None,
        media: vec![],
    });

    let err = thread.fetch_replies(2).await.unwrap_err();
    assert!(
        matches!(err, RealtimeError::Schema { ref path, .. } if path == "/timeline/entry"),
        "got {err:?}"
    );
    assert_eq!(thread.cursor().fetched, 0);
}

#[tokio::test]
async fn path_like_reply_ids_are_rejected_without_a_request() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = RealtimeClient::with_transport(transport.clone());

    let err = client
        .replies("../../search", ReplyCursor::default(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, RealtimeError::InvalidInput(_)), "got {err:?}");
    assert!(transport.requests().is_empty());
}
