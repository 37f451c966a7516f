//! Core library for the VLX Inventario offline worker.
//!
//! The worker keeps the application's static assets available offline and
//! watches the GitHub release endpoint for new versions. Every handler is an
//! independent entry point on [`ServiceWorker`]:
//!
//! - `install`: pre-caches the fixed asset list into the versioned bucket
//! - `activate`: deletes stale buckets and claims open pages
//! - `handle_fetch`: network-first for the release API, cache-first otherwise
//! - `check_for_update`: compares the latest release tag against the running version
//! - `handle_notification_click`: opens the download URL on "update"
//! - `handle_sync` / `handle_periodic_sync`: poll the release endpoint
//!
//! Platform primitives (cache storage, network, clients, notifications) sit
//! behind async traits so the same handlers run against the disk cache and
//! reqwest in the native host, and against in-memory doubles in tests.

pub mod cache;
pub mod config;
pub mod models;
pub mod net;
pub mod platform;
pub mod version;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use cache::{CacheBucket, CacheError, CacheStorage, DiskCacheStorage, MemoryCacheStorage};
pub use config::WorkerConfig;
pub use models::{
    ClientMessage, NotificationAction, NotificationClick, NotificationData, NotificationOptions,
    ReleaseAsset, ReleaseMetadata, Request, RequestMode, Response, ResponseType,
};
pub use net::{FetchError, Fetcher, HttpFetcher};
pub use platform::{Client, Clients, LocalPlatform, PlatformError, PlatformEvent, Registration};
pub use version::VersionPolicy;
pub use worker::{
    ActivateReport, ClickOutcome, FetchOutcome, InstallReport, ResponseSource, ServiceWorker,
    UpdateOutcome, WorkerError,
};
