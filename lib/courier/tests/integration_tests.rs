//! Integration tests for `Client` over the default transport, using wiremock.

use std::time::Duration;

use courier::{Client, Error, HyperTransport, StatusError, TransportError};
use serde::{Deserialize, Serialize};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string, header, method, path, query_param},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

fn url(server: &MockServer, path: &str) -> url::Url {
    url::Url::parse(&format!("{}{path}", server.uri())).expect("url")
}

#[tokio::test]
async fn test_get_json() {
    let mock_server = MockServer::start().await;

    let user = User {
        id: 1,
        name: "Alice".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&user))
        .mount(&mock_server)
        .await;

    let client = Client::new();
    let response = client
        .get(url(&mock_server, "/users/1"))
        .header("Accept", "application/json")
        .send()
        .await
        .decode_json::<User>()
        .await
        .expect("user");

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), &user);
    assert!(client.transport().is_some());
}

#[tokio::test]
async fn test_post_json_into_destination() {
    let mock_server = MockServer::start().await;

    let input = User {
        id: 0,
        name: "Bob".to_string(),
    };
    let output = User {
        id: 42,
        name: "Bob".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(&input))
        .respond_with(ResponseTemplate::new(201).set_body_json(&output))
        .mount(&mock_server)
        .await;

    let mut created = User {
        id: 0,
        name: String::new(),
    };
    let response = Client::new()
        .post(url(&mock_server, "/users"))
        .encode_json(&input)
        .send()
        .await
        .decode_json_into(Some(&mut created))
        .await
        .expect("created");

    assert_eq!(response.status(), 201);
    assert_eq!(created, output);
}

#[tokio::test]
async fn test_raw_body_and_response_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/notes/7"))
        .and(body_string("plain text"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-Id", "abc123")
                .set_body_string("stored"),
        )
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .put(url(&mock_server, "/notes/7"))
        .with_request_body("plain text")
        .send()
        .await
        .raw_bytes()
        .await
        .expect("response");

    assert_eq!(response.headers().get("x-request-id").map(|v| v.as_bytes()), Some(&b"abc123"[..]));
    assert_eq!(response.body().as_ref(), b"stored");
}

#[tokio::test]
async fn test_stream_response() {
    let mock_server = MockServer::start().await;

    let content = "line\n".repeat(10_000);
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content.clone()))
        .mount(&mock_server)
        .await;

    let mut sink = Vec::new();
    let response = Client::new()
        .get(url(&mock_server, "/download"))
        .send()
        .await
        .stream_response(&mut sink)
        .await
        .expect("streamed");

    assert_eq!(*response.body(), content.len() as u64);
    assert_eq!(sink, content.as_bytes());
}

#[tokio::test]
async fn test_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust lang"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": ["courier", "rustls"]
        })))
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .get(url(&mock_server, "/search"))
        .query("q", "rust lang")
        .query("page", "1")
        .send()
        .await
        .decode_json::<serde_json::Value>()
        .await
        .expect("results");

    assert_eq!(response.body()["results"][0], "courier");
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = Client::new();

    let err = client
        .get(url(&mock_server, "/bad"))
        .send()
        .await
        .decode_json::<User>()
        .await
        .expect_err("expected a status error");
    assert!(StatusError::BAD_REQUEST.matches(&err));
    assert_eq!(err.to_string(), "(400) Bad Request");

    let err = client
        .delete(url(&mock_server, "/broken"))
        .send()
        .await
        .response()
        .await
        .expect_err("expected a status error");
    assert!(err.is(&StatusError::INTERNAL_SERVER_ERROR));
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_head_and_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = Client::new();

    let response = client
        .head(url(&mock_server, "/users/1"))
        .send()
        .await
        .raw_bytes()
        .await
        .expect("head");
    assert!(response.body().is_empty());

    let response = client
        .patch(url(&mock_server, "/users/1"))
        .encode_json(&serde_json::json!({"name": "Carol"}))
        .send()
        .await
        .raw_bytes()
        .await
        .expect("patch");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_custom_method() {
    let mock_server = MockServer::start().await;

    Mock::given(method("USER_SPECIFIED_REQUEST_METHOD"))
        .and(path("/custom"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .new_request("USER_SPECIFIED_REQUEST_METHOD", url(&mock_server, "/custom"))
        .send()
        .await
        .raw_bytes()
        .await
        .expect("response");

    assert_eq!(response.body().as_ref(), b"ok");
}

#[tokio::test]
async fn test_prepare_callback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(header("Authorization", "Bearer token123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .get(url(&mock_server, "/protected"))
        .prepare(|request| {
            request
                .headers_mut()
                .insert("Authorization", http::HeaderValue::from_static("Bearer token123"));
            Ok::<_, courier::BoxError>(())
        })
        .send()
        .await
        .response()
        .await
        .expect("authorized");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    // Delay longer than transport timeout
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder().timeout(Duration::from_millis(100)).build();
    let client = Client::with_transport(transport);

    let outcome = client.get(url(&mock_server, "/slow")).send().await;
    let err = outcome.raw_bytes().await.expect_err("expected timeout error");

    let Error::Transport { source, .. } = &err else {
        panic!("expected a transport error, got: {err}");
    };
    let source = source.downcast_ref::<TransportError>().expect("transport error");
    assert!(source.is_timeout(), "expected timeout error, got: {source}");
}

#[tokio::test]
async fn test_connection_error() {
    let client = Client::new();

    // Try to connect to a non-existent server
    let url = url::Url::parse("http://127.0.0.1:1/").expect("url");
    let err = client
        .get(url)
        .send()
        .await
        .raw_bytes()
        .await
        .expect_err("expected connection error");

    assert!(err.is_transport(), "expected transport error, got: {err}");
    assert!(err.to_string().starts_with("non-protocol request error for 'GET http://127.0.0.1:1/'"));

    let Error::Transport { source, .. } = &err else {
        panic!("expected a transport error, got: {err}");
    };
    let source = source.downcast_ref::<TransportError>().expect("transport error");
    assert!(source.is_connection(), "expected connection error, got: {source}");
}

#[tokio::test]
async fn test_unsupported_scheme() {
    let url = url::Url::parse("mailto:someone@example.com").expect("url");
    let err = Client::new()
        .get(url)
        .send()
        .await
        .raw_bytes()
        .await
        .expect_err("expected an error");

    assert!(!err.is_client_error());
    assert!(err.status().is_none());
}
