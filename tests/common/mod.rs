#![allow(dead_code)]

use async_trait::async_trait;
use catalog_client::{
    Anonymous, CatalogApi, HttpRequest, HttpResponse, Result, StaticToken, TokenProvider,
    Transport, VideoDraft,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;

pub const BASE_URL: &str = "http://api.test";

struct Route {
    method: String,
    prefix: String,
    status: u16,
    body: String,
}

/// Fake server: answers from a route table and records every request
#[derive(Default)]
pub struct RecordingTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// First matching route wins; unmatched requests get a 404
    pub fn route(&self, method: &str, prefix: &str, status: u16, body: &str) -> &Self {
        self.routes.lock().unwrap().push(Route {
            method: method.to_string(),
            prefix: prefix.to_string(),
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose URL starts with `prefix`
    pub fn requests_to(&self, prefix: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.starts_with(prefix))
            .collect()
    }

    fn respond(&self, request: &HttpRequest) -> HttpResponse {
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|r| r.method == request.method && request.url.starts_with(&r.prefix))
            .map(|r| HttpResponse::new(r.status, r.body.clone()))
            .unwrap_or_else(|| HttpResponse::new(404, "no route"))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.respond(&request);
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

/// Holds the first request until `release` is notified
pub struct GatedTransport {
    pub inner: Arc<RecordingTransport>,
    pub entered: Notify,
    pub release: Notify,
    armed: AtomicBool,
}

impl GatedTransport {
    pub fn new(inner: Arc<RecordingTransport>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
            armed: AtomicBool::new(true),
        })
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.send(request).await
    }
}

pub fn api_with(transport: Arc<dyn Transport>, token: Option<&str>) -> CatalogApi {
    let tokens: Arc<dyn TokenProvider> = match token {
        Some(token) => Arc::new(StaticToken::new(token).unwrap()),
        None => Arc::new(Anonymous),
    };
    CatalogApi::new(BASE_URL, transport, tokens).unwrap()
}

pub async fn video_file(dir: &TempDir, name: &str, bytes: &[u8]) -> VideoDraft {
    let path = dir.path().join(name);
    tokio::fs::write(&path, bytes).await.unwrap();
    VideoDraft::from_path(&path).await.unwrap()
}
