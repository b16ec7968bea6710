//! reqwest-backed transport with cookie jar, timeout and request throttle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use super::throttle::RequestThrottle;
use super::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

const USER_AGENT: &str = concat!("trackerhub/", env!("CARGO_PKG_VERSION"));

/// Settings for a [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Minimum delay between two request starts, in seconds.
    pub request_delay_secs: f64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: 0.0,
            timeout_secs: 30,
        }
    }
}

/// HTTP transport used by real indexers.
pub struct ReqwestTransport {
    client: Client,
    throttle: RequestThrottle,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            throttle: RequestThrottle::from_secs_f64(config.request_delay_secs),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.throttle.acquire().await;

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        debug!(method = %request.method, url = %request.url, "Sending indexer request");

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        debug!(status, bytes = body.len(), "Indexer response received");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
