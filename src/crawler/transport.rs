//! HTTP transport used by the scheduler and the collaborators
//!
//! Redirects are never followed automatically: a 3xx response is surfaced to
//! the caller so the frontier can record the hop.

use crate::TransportError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A fully buffered HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Value of a header as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Issues a single GET request
///
/// Implementations must not follow redirects. Network failures are returned as
/// [`TransportError`] values rather than panicking.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, uri: &Url) -> Result<HttpResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent string sent with every request
///
/// # Example
///
/// ```no_run
/// use site_crawler::crawler::build_http_client;
///
/// let client = build_http_client("site-crawler/0.1").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default transport backed by a `reqwest::Client`
///
/// The per-request deadline is enforced by the scheduler, not by the client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, uri: &Url) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(uri.clone())
            .send()
            .await
            .map_err(|e| classify_error(uri, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(uri, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn classify_error(uri: &Url, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: uri.to_string(),
            timeout: Duration::ZERO,
        }
    } else if error.is_connect() {
        TransportError::Connection {
            url: uri.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Http {
            url: uri.to_string(),
            source: error,
        }
    }
}
