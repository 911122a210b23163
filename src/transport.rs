//! HTTP seam used by the API client and the upload negotiator

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::Result;

/// Request payload: small bodies are held in memory, media is streamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Bytes(Vec<u8>),

    /// Read from disk chunk by chunk while sending; `len` comes from file metadata
    File { path: PathBuf, len: u64 },
}

impl RequestBody {
    pub fn len(&self) -> u64 {
        match self {
            RequestBody::Bytes(bytes) => bytes.len() as u64,
            RequestBody::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-memory bytes; `None` for streamed files
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Bytes(bytes) => Some(bytes),
            RequestBody::File { .. } => None,
        }
    }
}

/// A fully built outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes(body));
        self
    }

    /// Stream the file at `path` as the body
    pub fn file(mut self, path: impl Into<PathBuf>, len: u64) -> Self {
        self.body = Some(RequestBody::File {
            path: path.into(),
            len,
        });
        self
    }

    /// In-memory body bytes, if any
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_ref().and_then(RequestBody::as_bytes)
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Trait for anything that can carry a request to a server.
///
/// Non-2xx statuses are returned as responses, not errors; only
/// connection-level failures are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// `timeout_seconds == 0` leaves the client without a timeout
    pub fn new(timeout_seconds: u64, user_agent: &str) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent.to_string());
        if timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_seconds));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            crate::error::CatalogError::Validation(format!(
                "unsupported HTTP method: {}",
                request.method
            ))
        })?;

        debug!("{} {}", method, request.url);

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match request.body {
            Some(RequestBody::Bytes(bytes)) => builder = builder.body(bytes),
            Some(RequestBody::File { path, len }) => {
                let file = tokio::fs::File::open(&path).await?;
                builder = builder
                    .header(reqwest::header::CONTENT_LENGTH, len)
                    .body(reqwest::Body::wrap_stream(ReaderStream::new(file)));
            }
            None => {}
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!("{} <- {} ({} bytes)", status, request.url, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_sets_content_type() {
        let request = HttpRequest::new("POST", "http://localhost/api/movies")
            .json(&serde_json::json!({"title": "Heat"}))
            .unwrap();

        assert_eq!(request.header_value("content-type"), Some("application/json"));
        assert_eq!(request.body_bytes(), Some(&br#"{"title":"Heat"}"#[..]));
    }

    #[test]
    fn test_file_body_is_not_buffered() {
        let request = HttpRequest::new("PUT", "https://blob.test/u1").file("/videos/ep1.mp4", 4096);

        let body = request.body.as_ref().unwrap();
        assert_eq!(body.len(), 4096);
        assert_eq!(body.as_bytes(), None);
        assert_eq!(request.body_bytes(), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(204, Vec::new()).is_success());
        assert!(!HttpResponse::new(302, Vec::new()).is_success());
        assert!(!HttpResponse::new(500, "boom").is_success());
    }

    #[test]
    fn test_reqwest_transport_builds_without_timeout() {
        assert!(ReqwestTransport::new(0, "catalog-client-test").is_ok());
    }
}
