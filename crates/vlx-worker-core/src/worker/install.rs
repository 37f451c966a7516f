use futures::future::try_join_all;
use tracing::{info, warn};
use url::Url;

use super::{ServiceWorker, WorkerError};
use crate::models::{Request, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    /// URLs written into the bucket.
    pub cached: Vec<String>,
}

impl ServiceWorker {
    /// Pre-cache the fixed asset list into the live bucket.
    ///
    /// All-or-nothing: every asset is fetched before anything is written, and
    /// a single failed or non-2xx fetch fails the whole install.
    pub async fn install(&self) -> Result<InstallReport, WorkerError> {
        if let Err(e) = self.registration.skip_waiting().await {
            warn!(error = %e, "Failed to skip waiting phase");
        }

        let bucket = self.caches.open(&self.cache_name).await?;
        info!(cache = %self.cache_name, "Cache opened");

        let requests = self.asset_requests()?;
        let responses = try_join_all(requests.iter().map(|r| self.fetch_asset(r))).await?;

        for (request, response) in requests.iter().zip(responses) {
            bucket.put(request, response).await?;
        }

        let cached: Vec<String> = requests.iter().map(|r| r.url.to_string()).collect();
        info!(cache = %self.cache_name, count = cached.len(), "Assets pre-cached");

        Ok(InstallReport {
            cache_name: self.cache_name.to_string(),
            cached,
        })
    }

    fn asset_requests(&self) -> Result<Vec<Request>, WorkerError> {
        self.config
            .assets
            .iter()
            .map(|path| {
                Url::parse(&self.config.origin)
                    .and_then(|origin| origin.join(path))
                    .map(Request::get)
                    .map_err(|source| WorkerError::InvalidAsset {
                        path: path.clone(),
                        source,
                    })
            })
            .collect()
    }

    async fn fetch_asset(&self, request: &Request) -> Result<Response, WorkerError> {
        let url = request.url.to_string();
        let response = self
            .fetcher
            .fetch(request)
            .await
            .map_err(|source| WorkerError::AssetFetch {
                url: url.clone(),
                source,
            })?;
        if !response.ok() {
            return Err(WorkerError::AssetStatus {
                url,
                status: response.status,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStorage;
    use crate::platform::PlatformEvent;
    use crate::test_support::{get, Harness};

    #[tokio::test]
    async fn test_install_caches_fixed_assets() {
        let mut h = Harness::with_defaults();
        h.fetcher.route("http://localhost/", 200, "root");
        h.fetcher.route("http://localhost/index.html", 200, "<html>");

        let report = h.worker.install().await.unwrap();
        assert_eq!(report.cache_name, "app-v1.0.0");
        assert_eq!(report.cached, vec!["http://localhost/", "http://localhost/index.html"]);

        assert_eq!(h.storage.keys().await.unwrap(), vec!["app-v1.0.0"]);
        let bucket = h.storage.open("app-v1.0.0").await.unwrap();
        assert_eq!(
            bucket.match_request(&get("/")).await.unwrap().unwrap().body,
            "root"
        );
        assert_eq!(
            bucket.match_request(&get("/index.html")).await.unwrap().unwrap().body,
            "<html>"
        );
        assert!(h.drain_events().contains(&PlatformEvent::SkippedWaiting));
    }

    #[tokio::test]
    async fn test_install_fails_if_any_asset_unreachable() {
        let h = Harness::with_defaults();
        h.fetcher.route("http://localhost/", 200, "root");

        let err = h.worker.install().await.unwrap_err();
        assert!(matches!(err, WorkerError::AssetFetch { ref url, .. } if url == "http://localhost/index.html"));

        // Nothing partial is written
        let bucket = h.storage.open("app-v1.0.0").await.unwrap();
        assert!(bucket.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_fails_on_error_status() {
        let h = Harness::with_defaults();
        h.fetcher.route("http://localhost/", 200, "root");
        h.fetcher.route("http://localhost/index.html", 404, "missing");

        let err = h.worker.install().await.unwrap_err();
        assert!(matches!(err, WorkerError::AssetStatus { status: 404, .. }));
    }
}
