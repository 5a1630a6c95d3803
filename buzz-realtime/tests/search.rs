mod common;

use std::sync::Arc;

use buzz_realtime::{RealtimeClient, RealtimeError, SearchOptions, SortMode};
use common::{ScriptedTransport, ids, init_test_tracing, next_data_page, search_page, timeline};
use serde_json::json;

fn client(transport: &Arc<ScriptedTransport>) -> RealtimeClient {
    init_test_tracing();
    RealtimeClient::with_transport(transport.clone())
}

#[tokio::test]
async fn first_page_is_sorted_and_seeds_watermarks() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_body(search_page(&[300, 500, 100, 400, 200]));

    let search = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(search.results()), vec!["500", "400", "300", "200", "100"]);
    assert_eq!(search.cursor().oldest_seen_id, "100");
    assert_eq!(search.cursor().newest_seen_id, "500");
    assert_eq!(search.cursor().total_fetched, 5);
    assert_eq!(search.cursor().crumb, "CRUMB");
    assert_eq!(search.results()[2].text, "post 300 body");
    assert!(search.trend().trend.is_empty());

    let req = &transport.requests()[0];
    assert_eq!(req.path, "search");
    assert_eq!(req.get("p"), Some("rust"));
    assert_eq!(req.get("md"), Some("t"));
    assert_eq!(req.get("mtype"), None);
}

#[tokio::test]
async fn fetch_more_walks_older_by_oldest_id() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_body(search_page(&[300, 500, 100, 400, 200]))
        .push_json(timeline(&[90, 95]))
        .push_json(timeline(&[80, 70, 85]));

    let mut search = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap();
    let older = search.fetch_more(2).await.unwrap();

    assert_eq!(ids(&older), vec!["95", "90", "85", "80", "70"]);
    assert_eq!(search.cursor().oldest_seen_id, "70");
    assert_eq!(search.cursor().total_fetched, 10);
    assert_eq!(search.cursor().newest_seen_id, "500");

    let reqs = transport.requests();
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[1].path, "api/v1/pagination");
    assert_eq!(reqs[1].get("crumb"), Some("CRUMB"));
    assert_eq!(reqs[1].get("oldestTweetId"), Some("100"));
    assert_eq!(reqs[2].get("oldestTweetId"), Some("90"));
    assert_eq!(reqs[2].get("start"), None);
}

#[tokio::test]
async fn popularity_pages_by_running_offset_in_upstream_order() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_body(search_page(&[1, 9]))
        .push_json(timeline(&[5, 7]))
        .push_json(timeline(&[3]));

    let opts = SearchOptions {
        media_only: true,
        sort: SortMode::Popularity,
    };
    let mut search = client(&transport).search("rust", opts).await.unwrap();
    assert_eq!(ids(search.results()), vec!["1", "9"]);

    let older = search.fetch_more(2).await.unwrap();
    assert_eq!(ids(&older), vec!["5", "7", "3"]);
    assert_eq!(search.cursor().total_fetched, 5);

    let reqs = transport.requests();
    assert_eq!(reqs[0].get("md"), Some("h"));
    assert_eq!(reqs[0].get("mtype"), Some("image"));
    assert_eq!(reqs[1].get("start"), Some("2"));
    assert_eq!(reqs[2].get("start"), Some("4"));
    assert_eq!(reqs[2].get("oldestTweetId"), None);
}

#[tokio::test]
async fn fetch_latest_returns_only_newer_results() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_body(search_page(&[300, 500, 100]))
        .push_json(timeline(&[600, 700]))
        .push_json(timeline(&[]));

    let mut search = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap();

    let newer = search.fetch_latest().await.unwrap();
    assert_eq!(ids(&newer), vec!["700", "600"]);
    assert_eq!(search.cursor().newest_seen_id, "700");

    let nothing = search.fetch_latest().await.unwrap();
    assert!(nothing.is_empty());
    assert_eq!(search.cursor().newest_seen_id, "700");

    let reqs = transport.requests();
    assert_eq!(reqs[1].path, "api/v1/autoscroll");
    assert_eq!(reqs[1].get("latestTweetId"), Some("500"));
    assert_eq!(reqs[2].get("latestTweetId"), Some("700"));
}

#[tokio::test]
async fn empty_first_page_sends_empty_bounds() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_body(search_page(&[]))
        .push_json(timeline(&[]))
        .push_json(timeline(&[]));

    let mut search = client(&transport)
        .search("nothing", SearchOptions::default())
        .await
        .unwrap();
    assert!(search.results().is_empty());

    assert!(search.fetch_more(1).await.unwrap().is_empty());
    assert!(search.fetch_latest().await.unwrap().is_empty());

    let reqs = transport.requests();
    assert_eq!(reqs[1].get("oldestTweetId"), Some(""));
    assert_eq!(reqs[2].get("latestTweetId"), Some(""));
}

#[tokio::test]
async fn zero_rounds_sends_nothing() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_body(search_page(&[2, 1]));

    let mut search = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap();
    let before = search.cursor().clone();

    assert!(search.fetch_more(0).await.unwrap().is_empty());
    assert_eq!(search.cursor(), &before);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn failure_mid_call_keeps_previous_cursor() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .push_body(search_page(&[300, 200, 100]))
        .push_json(timeline(&[90]))
        .push_body("<html>maintenance</html>");

    let mut search = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap();
    let before = search.cursor().clone();

    let err = search.fetch_more(2).await.unwrap_err();
    assert!(matches!(err, RealtimeError::Decode(_)), "got {err:?}");
    assert_eq!(search.cursor(), &before);
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn page_without_payload_is_an_extraction_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_body("<html><body>blocked</body></html>");

    let err = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, RealtimeError::Extraction { ref marker, .. } if marker == "__NEXT_DATA__"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn missing_timeline_is_a_schema_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_body(next_data_page(json!({
        "pagination": { "params": { "crumb": "CRUMB" } }
    })));

    let err = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap_err();
    match err {
        RealtimeError::Schema { path, .. } => {
            assert_eq!(path, "/props/pageProps/pageData/timeline/entry")
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_crumb_is_a_schema_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_body(next_data_page(json!({ "timeline": { "entry": [] } })));

    let err = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, RealtimeError::Schema { ref path, .. } if path == "/pagination/params/crumb"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn search_page_trend_is_carried_along() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_body(next_data_page(json!({
        "timeline": { "entry": [] },
        "pagination": { "params": { "crumb": "CRUMB" } },
        "buzzTrend": { "items": [ { "query": "台風", "rankUp": true } ] }
    })));

    let search = client(&transport)
        .search("rust", SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(search.trend().trend[0].query, "台風");
    assert!(search.trend().tweet.is_empty());
    assert!(search.trend().hotbuzz.is_empty());
}
