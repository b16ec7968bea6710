//! Mock transport for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// A scripted reply for one route.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(HttpResponse),
    Error(TransportError),
}

type RouteKey = (HttpMethod, String);

/// Mock implementation of the [`Transport`] trait.
///
/// Replies are scripted per method and URL path (the query string is
/// ignored). Each route holds a queue: every request consumes the front
/// reply, except the last one, which keeps answering all further requests.
/// Unscripted routes answer 404.
///
/// Clones share state, so a test can keep a handle while the indexer owns
/// another.
///
/// # Example
///
/// ```rust,ignore
/// let transport = MockTransport::new();
/// transport.set_json(HttpMethod::Post, "/api/login", 200, r#"{"token":"abc"}"#).await;
/// transport.push_json(HttpMethod::Get, "/api/torrent", 401, "").await;
/// transport.push_json(HttpMethod::Get, "/api/torrent", 200, "[]").await;
///
/// // ... run the indexer ...
///
/// assert_eq!(transport.requests_to(HttpMethod::Get, "/api/torrent").await.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<RouteKey, VecDeque<MockReply>>>>,
    requests: Arc<RwLock<Vec<HttpRequest>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("routes", &"<routes>")
            .field("requests", &"<requests>")
            .field("delay", &"<delay>")
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a route.
    pub async fn push_reply(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.routes
            .write()
            .await
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Replace every queued reply of a route with `reply`.
    pub async fn set_reply(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.routes
            .write()
            .await
            .insert((method, path.to_string()), VecDeque::from([reply]));
    }

    /// Queue a response with a text body.
    pub async fn push_json(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.push_reply(
            method,
            path,
            MockReply::Response(HttpResponse::new(status, body)),
        )
        .await;
    }

    /// Make a route always answer with this status and body.
    pub async fn set_json(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.set_reply(
            method,
            path,
            MockReply::Response(HttpResponse::new(status, body)),
        )
        .await;
    }

    /// Make a route always answer with raw bytes.
    pub async fn set_bytes(&self, method: HttpMethod, path: &str, status: u16, body: Vec<u8>) {
        self.set_reply(
            method,
            path,
            MockReply::Response(HttpResponse::new(status, body)),
        )
        .await;
    }

    /// Queue a transport failure.
    pub async fn push_error(&self, method: HttpMethod, path: &str, error: TransportError) {
        self.push_reply(method, path, MockReply::Error(error)).await;
    }

    /// Delay every reply, to widen race windows in concurrency tests.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests.read().await.clone()
    }

    /// Recorded requests matching a method and path.
    pub async fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.method == method && request_path(&r.url) == path)
            .cloned()
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    async fn next_reply(&self, method: HttpMethod, path: &str) -> MockReply {
        let mut routes = self.routes.write().await;
        match routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| MockReply::Response(HttpResponse::new(404, ""))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| MockReply::Response(HttpResponse::new(404, ""))),
            None => MockReply::Response(HttpResponse::new(404, "")),
        }
    }
}

/// URL path without query string; the input itself if it does not parse.
fn request_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split('?').next().unwrap_or(url).to_string(),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = request.method;
        let path = request_path(&request.url);
        self.requests.write().await.push(request);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply(method, &path).await {
            MockReply::Response(response) => Ok(response),
            MockReply::Error(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_route_is_404() {
        let transport = MockTransport::new();

        let response = transport
            .execute(HttpRequest::get("https://t.test/missing"))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(transport.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_queue_then_sticky_last_reply() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, "/a", 401, "").await;
        transport.push_json(HttpMethod::Get, "/a", 200, "ok").await;

        let statuses: Vec<u16> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                out.push(
                    transport
                        .execute(HttpRequest::get("https://t.test/a?x=1"))
                        .await
                        .unwrap()
                        .status,
                );
            }
            out
        };

        assert_eq!(statuses, vec![401, 200, 200]);
    }

    #[tokio::test]
    async fn test_routes_are_keyed_by_method() {
        let transport = MockTransport::new();
        transport.set_json(HttpMethod::Post, "/a", 201, "").await;

        let get = transport
            .execute(HttpRequest::get("https://t.test/a"))
            .await
            .unwrap();
        let post = transport
            .execute(HttpRequest::post("https://t.test/a", "{}"))
            .await
            .unwrap();

        assert_eq!(get.status, 404);
        assert_eq!(post.status, 201);
        assert_eq!(transport.requests_to(HttpMethod::Post, "/a").await.len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let transport = MockTransport::new();
        transport
            .push_error(
                HttpMethod::Get,
                "/a",
                TransportError::ConnectionFailed("refused".to_string()),
            )
            .await;

        let err = transport
            .execute(HttpRequest::get("https://t.test/a"))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::ConnectionFailed("refused".to_string()));
    }

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("https://t.test/api/torrent?search=x"), "/api/torrent");
        assert_eq!(request_path("/relative?x=1"), "/relative");
    }
}
