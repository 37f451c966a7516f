//! Shared doubles for handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use crate::cache::MemoryCacheStorage;
use crate::config::WorkerConfig;
use crate::models::{Request, Response, ResponseType};
use crate::net::{FetchError, Fetcher};
use crate::platform::{LocalPlatform, PlatformEvent};
use crate::worker::ServiceWorker;

pub const ORIGIN: &str = "http://localhost";

/// Fetcher answering from a fixed route table; unknown URLs are offline.
#[derive(Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn route(&self, url: &str, status: u16, body: &str) {
        self.route_response(url, Response::new(url, status, body.to_string()));
    }

    pub fn route_response(&self, url: &str, response: Response) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn unroute(&self, url: &str) {
        self.routes.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        self.routes
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or(FetchError::Offline(url))
    }
}

pub struct Harness {
    pub worker: ServiceWorker,
    pub storage: Arc<MemoryCacheStorage>,
    pub fetcher: Arc<StubFetcher>,
    pub platform: Arc<LocalPlatform>,
    pub events: mpsc::UnboundedReceiver<PlatformEvent>,
}

impl Harness {
    pub fn new(config: WorkerConfig) -> Self {
        let storage = Arc::new(MemoryCacheStorage::new());
        let fetcher = Arc::new(StubFetcher::default());
        let (platform, events) = LocalPlatform::new();
        let worker = ServiceWorker::new(
            config,
            storage.clone(),
            fetcher.clone(),
            platform.clone(),
            platform.clone(),
        );
        Self {
            worker,
            storage,
            fetcher,
            platform,
            events,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(test_config())
    }

    pub fn drain_events(&mut self) -> Vec<PlatformEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn test_config() -> WorkerConfig {
    WorkerConfig {
        app_id: "app".to_string(),
        version: "1.0.0".to_string(),
        origin: ORIGIN.to_string(),
        assets: vec!["/".to_string(), "/index.html".to_string()],
        ..Default::default()
    }
}

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub fn get(path: &str) -> Request {
    Request::get(url(path))
}

pub fn release_json(tag: &str, download_url: Option<&str>) -> String {
    match download_url {
        Some(download_url) => format!(
            r#"{{"tag_name": "{}", "assets": [{{"browser_download_url": "{}"}}]}}"#,
            tag, download_url
        ),
        None => format!(r#"{{"tag_name": "{}", "assets": []}}"#, tag),
    }
}

pub fn cors(url: &str, status: u16, body: &str) -> Response {
    Response::new(url, status, body.to_string()).with_type(ResponseType::Cors)
}
