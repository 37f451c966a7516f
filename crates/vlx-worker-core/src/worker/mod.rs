//! Event handlers of the offline worker.
//!
//! Each lifecycle, network, user or sync event maps to one entry point on
//! `ServiceWorker`. Handlers do not call each other, except that the fetch
//! interceptor and the sync handlers both hand release metadata to the
//! update checker.

mod activate;
mod error;
mod fetch;
mod install;
mod notification;
mod sync;
mod update;

use std::sync::Arc;

use crate::cache::CacheStorage;
use crate::config::WorkerConfig;
use crate::net::Fetcher;
use crate::platform::{Clients, Registration};

pub use activate::ActivateReport;
pub use error::WorkerError;
pub use fetch::{FetchOutcome, ResponseSource};
pub use install::InstallReport;
pub use notification::ClickOutcome;
pub use update::UpdateOutcome;

/// The worker and the platform primitives it is bound to.
/// Clone is cheap - every field is shared, so handlers can move a clone into
/// spawned background work.
#[derive(Clone)]
pub struct ServiceWorker {
    config: Arc<WorkerConfig>,
    cache_name: Arc<str>,
    caches: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<dyn Clients>,
    registration: Arc<dyn Registration>,
}

impl ServiceWorker {
    pub fn new(
        config: WorkerConfig,
        caches: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn Clients>,
        registration: Arc<dyn Registration>,
    ) -> Self {
        // Derived once; the version is never re-parsed from the bucket name
        let cache_name: Arc<str> = config.cache_name().into();
        Self {
            config: Arc::new(config),
            cache_name,
            caches,
            fetcher,
            clients,
            registration,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Name of the live cache bucket.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn caches(&self) -> &Arc<dyn CacheStorage> {
        &self.caches
    }
}
