use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{ServiceWorker, UpdateOutcome};
use crate::cache::CacheError;
use crate::models::{Request, Response};

/// Where the response handed back to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Network failed, an earlier cached copy was used.
    CacheFallback,
    /// Network failed and nothing was cached.
    Unavailable,
}

/// Result of intercepting one request.
///
/// The response is ready as soon as this is returned. Background work it
/// started (cache write-back, update check) keeps running; the handles are
/// exposed so a host may await them, and dropping them detaches the tasks.
#[derive(Debug)]
pub struct FetchOutcome {
    pub response: Option<Response>,
    pub source: ResponseSource,
    pub cache_write: Option<JoinHandle<Result<(), CacheError>>>,
    pub update_check: Option<JoinHandle<UpdateOutcome>>,
}

impl FetchOutcome {
    fn new(response: Option<Response>, source: ResponseSource) -> Self {
        Self {
            response,
            source,
            cache_write: None,
            update_check: None,
        }
    }

    /// Wait for any background work, returning the update check result if one ran.
    pub async fn settle(&mut self) -> Option<UpdateOutcome> {
        if let Some(handle) = self.cache_write.take() {
            match handle.await {
                // Write-back errors are logged by the task itself
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Cache write-back task failed"),
            }
        }
        match self.update_check.take()?.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Update check task failed");
                None
            }
        }
    }
}

impl ServiceWorker {
    /// Intercept an outgoing page request.
    ///
    /// Release API requests go network-first with a cache fallback; every
    /// other request is served cache-first and successful same-origin
    /// responses are written back to the live bucket.
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if self.config.is_release_api(&request.url) {
            self.network_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    async fn network_first(&self, request: Request) -> FetchOutcome {
        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                let mut outcome = FetchOutcome::new(Some(response.clone()), ResponseSource::Network);
                if self.config.is_latest_release(&request.url) {
                    let worker = self.clone();
                    outcome.update_check = Some(tokio::spawn(async move {
                        worker.check_for_update(&response).await
                    }));
                }
                outcome
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Release API unreachable, falling back to cache");
                match self.lookup(&request).await {
                    Some(cached) => FetchOutcome::new(Some(cached), ResponseSource::CacheFallback),
                    None => FetchOutcome::new(None, ResponseSource::Unavailable),
                }
            }
        }
    }

    async fn cache_first(&self, request: Request) -> FetchOutcome {
        if let Some(cached) = self.lookup(&request).await {
            debug!(url = %request.url, "Cache hit");
            return FetchOutcome::new(Some(cached), ResponseSource::Cache);
        }
        debug!(url = %request.url, "Cache miss");

        let response = match self.fetcher.fetch(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Fetch failed with no cached copy");
                return FetchOutcome::new(None, ResponseSource::Unavailable);
            }
        };

        if !response.is_cacheable() {
            debug!(
                url = %request.url,
                status = response.status,
                response_type = ?response.response_type,
                "Not caching response"
            );
            return FetchOutcome::new(Some(response), ResponseSource::Network);
        }

        let worker = self.clone();
        let to_cache = response.clone();
        let mut outcome = FetchOutcome::new(Some(response), ResponseSource::Network);
        outcome.cache_write = Some(tokio::spawn(async move {
            worker.store(&request, to_cache).await
        }));
        outcome
    }

    /// Cache lookup across all buckets. Lookup errors count as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.caches.match_request(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    /// Write-back into the live bucket. Failures are logged here so they
    /// surface even when the outcome is dropped unsettled.
    async fn store(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        let result = self.put_live(request, response).await;
        match &result {
            Ok(()) => debug!(cache = %self.cache_name, url = %request.url, "Cached response"),
            Err(e) => warn!(url = %request.url, error = %e, "Cache write-back failed"),
        }
        result
    }

    async fn put_live(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        let bucket = self.caches.open(&self.cache_name).await?;
        bucket.put(request, response).await
    }
}
