//! Named cache buckets mapping request identities to stored responses.
//!
//! This module provides the `CacheStorage` / `CacheBucket` seams the worker
//! handlers use, plus two implementations:
//! - `MemoryCacheStorage`: process-local buckets
//! - `DiskCacheStorage`: one directory per bucket under the cache dir
//!
//! Entries are trusted as-is: there is no expiry or freshness check.
//! Concurrent writes to the same key are unordered; the last one wins.

pub mod disk;
pub mod error;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Request, Response};

pub use disk::DiskCacheStorage;
pub use error::CacheError;
pub use memory::MemoryCacheStorage;

#[async_trait]
pub trait CacheBucket: Send + Sync {
    fn name(&self) -> &str;

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, CacheError>;

    /// Store `response` under the request's key, replacing any previous entry.
    async fn put(&self, request: &Request, response: Response) -> Result<(), CacheError>;

    async fn delete(&self, request: &Request) -> Result<bool, CacheError>;

    /// Keys of all stored entries.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;
}

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the named bucket, creating it if absent.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>, CacheError>;

    async fn has(&self, name: &str) -> Result<bool, CacheError>;

    /// Delete a bucket and all its entries. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;

    /// Names of all existing buckets.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Look the request up across every bucket, in `keys()` order.
    async fn match_request(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        for name in self.keys().await? {
            let bucket = self.open(&name).await?;
            if let Some(response) = bucket.match_request(request).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
