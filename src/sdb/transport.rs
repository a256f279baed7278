//! HTTP transport seam
//!
//! The client only needs "GET this URL, give me status and body". The default
//! implementation is a hyper client; tests and offline tools plug in
//! [`ScriptedTransport`].

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::sdb::error::{Result, SdbError};

/// Raw response of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET and returns the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

/// hyper-based transport
///
/// Clone is cheap - the underlying HTTP client uses Arc internally.
#[derive(Clone)]
pub struct HttpTransport {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut http = HttpConnector::new();
        http.set_nodelay(true);
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(10)));

        let tls = TlsConnector::new()
            .map_err(|e| SdbError::Transport(format!("Failed to build TLS connector: {}", e)))?;
        let https = HttpsConnector::from((http, tls.into()));

        let client = HyperClient::builder(TokioExecutor::new()).build(https);

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, url: &str) -> Result<TransportResponse> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(Full::new(Bytes::new()))
            .map_err(|e| SdbError::Transport(format!("Request build error: {}", e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| SdbError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .collect()
            .await
            .map_err(|e| SdbError::Transport(format!("Body error: {}", e)))?
            .to_bytes();

        Ok(TransportResponse::new(status.as_u16(), body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        tokio::time::timeout(self.timeout, self.send(url))
            .await
            .map_err(|_| SdbError::Timeout(self.timeout))?
    }
}

/// In-memory transport that replays queued responses in order and records
/// every requested URL.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body
    pub fn push(&self, body: impl Into<String>) {
        self.push_response(TransportResponse::new(200, body.into()));
    }

    pub fn push_response(&self, response: TransportResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
    }

    /// URLs requested so far, oldest first
    pub fn urls(&self) -> Vec<String> {
        self.urls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.urls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn pending(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        self.urls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());

        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .ok_or_else(|| SdbError::Transport(format!("Unexpected HTTP request {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_transport_replays_in_order() {
        let transport = ScriptedTransport::new();
        transport.push("<a/>");
        transport.push_response(TransportResponse::new(503, "<b/>"));

        let first = transport.get("http://x/?1").await.unwrap();
        let second = transport.get("http://x/?2").await.unwrap();

        assert!(first.is_success());
        assert_eq!(first.body, Bytes::from("<a/>"));
        assert!(!second.is_success());
        assert_eq!(transport.urls(), vec!["http://x/?1", "http://x/?2"]);
        assert_eq!(transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_scripted_transport_rejects_unexpected_request() {
        let transport = ScriptedTransport::new();
        let err = transport.get("http://x/").await.unwrap_err();
        assert!(matches!(err, SdbError::Transport(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_http_transport_builds() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(5));
        let _clone = transport.clone();
    }
}
