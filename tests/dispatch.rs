use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use courier::{
    async_trait, transport_fn, Body, BoxModifier, BoxTransport, Client, Decoded, Error, Headers,
    Method, QueryParams, Request, RequestOptions, Response, ResponseKind, StatusCode, Transport,
    Url, UrlInit,
};
use futures_core::Stream;
use serde_json::json;

fn url() -> Url {
    Url::parse("https://example.com/path").unwrap()
}

/// Returns a fixed response and records every request it sees.
struct MockTransport {
    status: StatusCode,
    headers: Headers,
    body: &'static str,
    seen: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    fn new(status: StatusCode, body: &'static str) -> MockTransport {
        MockTransport {
            status,
            headers: Headers::new(),
            body,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self) -> Arc<Mutex<Vec<Request>>> {
        self.seen.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: Request) -> Result<Response, Error> {
        self.seen.lock().unwrap().push(request);

        Ok(Response {
            status: self.status,
            headers: self.headers.clone(),
            body: Body::once(self.body),
        })
    }
}

/// Yields queued chunks one at a time.
struct ChunkStream {
    chunks: VecDeque<Result<Bytes, io::Error>>,
}

impl ChunkStream {
    fn new(chunks: Vec<Result<Bytes, io::Error>>) -> ChunkStream {
        ChunkStream {
            chunks: chunks.into(),
        }
    }
}

impl Stream for ChunkStream {
    type Item = Result<Bytes, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.chunks.pop_front())
    }
}

#[tokio::test]
async fn method_defaults_to_get() {
    let transport = MockTransport::new(StatusCode::OK, "hello");
    let seen = transport.seen();
    let client = Client::new(transport);

    client
        .dispatch(url(), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0].method, Method::GET);
}

#[tokio::test]
async fn method_is_forwarded() {
    let transport = MockTransport::new(StatusCode::OK, "");
    let seen = transport.seen();
    let client = Client::new(transport);

    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        client
            .dispatch(
                url(),
                RequestOptions {
                    method: method.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[3].method, Method::DELETE);
}

#[tokio::test]
async fn json_payload_sets_body_and_content_type() {
    let payload = json!({ "key": "value" });

    let transport = MockTransport::new(StatusCode::OK, "{}");
    let seen = transport.seen();
    let client = Client::new(transport);

    client
        .dispatch(
            url(),
            RequestOptions {
                method: Method::POST,
                json: Some(payload.clone()),
                response_kind: Some(ResponseKind::Json),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let request = seen.lock().unwrap().remove(0);
    assert_eq!(request.headers.first("content-type"), Some("application/json"));

    let body = request.body.into_bytes().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(sent, payload);
}

#[tokio::test]
async fn json_respects_existing_content_type() {
    let transport = MockTransport::new(StatusCode::OK, "{}");
    let seen = transport.seen();
    let client = Client::new(transport);

    client
        .dispatch(
            url(),
            RequestOptions {
                method: Method::POST,
                json: Some(json!(1)),
                headers: Headers::from([("content-type", "application/vnd.api+json")]),
                response_kind: Some(ResponseKind::Json),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let request = seen.lock().unwrap().remove(0);
    assert!(request
        .headers
        .get("content-type")
        .eq(["application/vnd.api+json"]));
}

#[tokio::test]
async fn accept_header_defaults_follow_response_kind() {
    let transport = MockTransport::new(StatusCode::OK, "{}");
    let seen = transport.seen();
    let client = Client::new(transport);

    for (kind, accept) in [
        (Some(ResponseKind::Json), Some("application/json")),
        (Some(ResponseKind::Text), Some("text/*")),
        (Some(ResponseKind::Bytes), None),
        (None, None),
    ] {
        let _ = client
            .dispatch(
                url(),
                RequestOptions {
                    response_kind: kind,
                    ..Default::default()
                },
            )
            .await;
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].headers.first("accept"), Some("application/json"));
    assert_eq!(seen[1].headers.first("accept"), Some("text/*"));
    assert_eq!(seen[2].headers.first("accept"), None);
    assert_eq!(seen[3].headers.first("accept"), None);
}

#[tokio::test]
async fn existing_accept_header_wins() {
    let transport = MockTransport::new(StatusCode::OK, "{}");
    let seen = transport.seen();
    let client = Client::new(transport);

    client
        .dispatch(
            url(),
            RequestOptions {
                headers: Headers::from([("accept", "application/xml")]),
                response_kind: Some(ResponseKind::Json),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert!(seen[0].headers.get("accept").eq(["application/xml"]));
}

#[tokio::test]
async fn query_replaces_target_query() {
    let transport = MockTransport::new(StatusCode::OK, "");
    let seen = transport.seen();
    let client = Client::new(transport);

    client
        .dispatch(
            Url::parse("https://example.com/path?old=1").unwrap(),
            RequestOptions {
                query: Some(QueryParams::from([("key", "value"), ("numbers", "1")])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].url.query(), Some("key=value&numbers=1"));
}

#[tokio::test]
async fn http_error_on_404() {
    let client = Client::new(MockTransport::new(StatusCode::NOT_FOUND, "missing"));

    let err = client
        .dispatch(url(), RequestOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Http(err) => {
            assert_eq!(err.response.status, StatusCode::NOT_FOUND);
            assert_eq!(err.request.url.as_str(), url().as_str());
            assert_eq!(err.to_string(), "Not Found");
        }
        other => panic!("expected Error::Http, got {:?}", other),
    }
}

#[tokio::test]
async fn void_ignores_body_content() {
    let client = Client::new(MockTransport::new(StatusCode::OK, "ignored"));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Void),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(decoded, Decoded::Void));
}

#[tokio::test]
async fn json_on_204_returns_empty_string() {
    let client = Client::new(MockTransport::new(StatusCode::NO_CONTENT, ""));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Json),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(decoded.into_json(), Some(json!("")));
}

#[tokio::test]
async fn json_on_content_length_zero_returns_empty_string() {
    let mut transport = MockTransport::new(StatusCode::OK, "");
    transport.headers.append("content-length", "0");
    let client = Client::new(transport);

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Json),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(decoded.into_json(), Some(json!("")));
}

#[tokio::test]
async fn decodes_json() {
    let client = Client::new(MockTransport::new(StatusCode::OK, r#"{"message":"hi"}"#));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Json),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(decoded.into_json(), Some(json!({ "message": "hi" })));
}

#[tokio::test]
async fn decodes_text() {
    let client = Client::new(MockTransport::new(StatusCode::OK, "Hello, world!"));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Text),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(decoded.into_text().as_deref(), Some("Hello, world!"));
}

#[tokio::test]
async fn decodes_bytes() {
    let client = Client::new(MockTransport::new(StatusCode::OK, "abc"));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Bytes),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    match decoded {
        Decoded::Bytes(bytes) => assert_eq!(&bytes[..], b"abc"),
        other => panic!("expected Decoded::Bytes, got {:?}", other),
    }
}

#[tokio::test]
async fn decodes_form() {
    let client = Client::new(MockTransport::new(StatusCode::OK, "a=1&b=2"));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Form),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    match decoded {
        Decoded::Form(fields) => {
            assert_eq!(
                fields,
                vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
            );
        }
        other => panic!("expected Decoded::Form, got {:?}", other),
    }
}

#[tokio::test]
async fn streamed_response_body_is_aggregated() {
    let client = Client::new(transport_fn(|_| {
        Box::pin(async {
            let chunks = ChunkStream::new(vec![
                Ok(Bytes::from_static(b"Hello, ")),
                Ok(Bytes::from_static(b"world!")),
            ]);

            Ok(Response {
                status: StatusCode::OK,
                headers: Headers::new(),
                body: Body::stream(chunks),
            })
        })
    }));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Text),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(decoded.into_text().as_deref(), Some("Hello, world!"));
}

#[tokio::test]
async fn stream_chunk_error_surfaces_as_transport_error() {
    let client = Client::new(transport_fn(|_| {
        Box::pin(async {
            let chunks = ChunkStream::new(vec![
                Ok(Bytes::from_static(b"partial")),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
            ]);

            Ok(Response {
                status: StatusCode::OK,
                headers: Headers::new(),
                body: Body::stream(chunks),
            })
        })
    }));

    let err = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Text),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn snapshot_of_a_stream_body_is_empty() {
    let mut request = Request::new(Method::POST, url());
    request.body = Body::stream(ChunkStream::new(vec![Ok(Bytes::from_static(b"streamed"))]));

    let snapshot = request.snapshot();

    assert!(snapshot.body.is_empty());
    assert_eq!(snapshot.method, Method::POST);

    // The original body is untouched and still yields its chunks.
    let bytes = request.body.into_bytes().await.unwrap();
    assert_eq!(&bytes[..], b"streamed");
}

#[tokio::test]
async fn raw_and_unspecified_leave_body_unread() {
    let client = Client::new(MockTransport::new(StatusCode::OK, "raw body"));

    for kind in [Some(ResponseKind::Raw), None] {
        let decoded = client
            .dispatch(
                url(),
                RequestOptions {
                    response_kind: kind,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let response = decoded.into_response().expect("expected a raw response");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "raw body");
    }
}

#[tokio::test]
async fn transport_errors_propagate_unwrapped() {
    let client = Client::new(transport_fn(|_| {
        Box::pin(async { Err(Error::Transport("connection reset".into())) })
    }));

    let err = client
        .dispatch(url(), RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn per_call_transport_overrides_default() {
    let client = Client::new(transport_fn(|_| {
        Box::pin(async { Err(Error::Transport("default must not run".into())) })
    }));

    let override_transport: BoxTransport = Arc::new(MockTransport::new(StatusCode::OK, "ok"));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                transport: Some(override_transport),
                response_kind: Some(ResponseKind::Text),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(decoded.into_text().as_deref(), Some("ok"));
}

#[tokio::test]
async fn first_modifier_is_outermost() {
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    fn recording(label: &'static str, order: Arc<Mutex<Vec<&'static str>>>) -> BoxModifier {
        Arc::new(move |inner: BoxTransport| -> BoxTransport {
            let order = order.clone();

            Arc::new(transport_fn(move |request| {
                let order = order.clone();
                let inner = inner.clone();

                Box::pin(async move {
                    order.lock().unwrap().push(label);
                    inner.call(request).await
                })
            }))
        })
    }

    let transport = MockTransport::new(StatusCode::OK, "");
    let client = Client::new(transport);

    client
        .dispatch(
            url(),
            RequestOptions {
                modifiers: vec![
                    recording("first", order.clone()),
                    recording("second", order.clone()),
                ],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn end_to_end_url_construction() {
    let target = UrlInit::new("https://example.com")
        .pathname("/path")
        .query([("key", "value")])
        .fragment("top")
        .build()
        .unwrap();

    assert_eq!(target.as_str(), "https://example.com/path?key=value#top");

    let transport = MockTransport::new(StatusCode::OK, "");
    let seen = transport.seen();
    let client = Client::new(transport);

    client
        .dispatch(target, RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap()[0].url.as_str(),
        "https://example.com/path?key=value#top"
    );
}

#[tokio::test]
async fn decoding_a_taken_body_fails() {
    let client = Client::new(MockTransport::new(StatusCode::OK, "body"));

    let decoded = client
        .dispatch(
            url(),
            RequestOptions {
                response_kind: Some(ResponseKind::Raw),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut response = decoded.into_response().unwrap();
    response.body.take().unwrap();

    assert!(matches!(response.text().await, Err(Error::BodyConsumed)));
}
