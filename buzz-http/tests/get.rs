use buzz_http::{HttpClient, HttpError, RequestOpts};
use serde_json::json;
use std::borrow::Cow;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/realtime/", server.uri())).expect("valid base")
}

#[tokio::test]
async fn get_text_sends_query_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/realtime/search"))
        .and(query_param("p", "東京 rust"))
        .and(query_param("md", "t"))
        .and(header("user-agent", "buzz-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_user_agent("buzz-tests/1.0").unwrap();
    let body = client
        .get_text(
            "search",
            RequestOpts {
                query: vec![("p", Cow::Borrowed("東京 rust")), ("md", "t".into())],
                ..Default::default()
            },
        )
        .await
        .expect("page body");

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn per_request_timeout_surfaces_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/realtime/api/v1/autoscroll"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_text(
            "api/v1/autoscroll",
            RequestOpts {
                timeout: Some(Duration::from_millis(50)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn non_success_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "busy"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_text("search", RequestOpts::default())
        .await
        .unwrap_err();
    match err {
        HttpError::Api { status, message, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "busy");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn rejects_invalid_base() {
    assert!(matches!(HttpClient::new("not a url"), Err(HttpError::Url(_))));
}
