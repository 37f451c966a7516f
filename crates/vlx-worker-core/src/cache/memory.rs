use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheBucket, CacheError, CacheStorage};
use crate::models::{Request, Response};

/// Buckets kept in process memory, listed in creation order.
#[derive(Default)]
pub struct MemoryCacheStorage {
    buckets: RwLock<Vec<Arc<MemoryBucket>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>, CacheError> {
        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.iter().find(|b| b.name == name) {
            return Ok(bucket.clone());
        }
        let bucket = Arc::new(MemoryBucket::new(name));
        buckets.push(bucket.clone());
        Ok(bucket)
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.buckets.read().await.iter().any(|b| b.name == name))
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|b| b.name != name);
        Ok(buckets.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .buckets
            .read()
            .await
            .iter()
            .map(|b| b.name.clone())
            .collect())
    }
}

pub struct MemoryBucket {
    name: String,
    entries: RwLock<HashMap<String, Response>>,
}

impl MemoryBucket {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheBucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let Some(key) = request.cache_key() else {
            return Ok(None);
        };
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        let key = request
            .cache_key()
            .ok_or_else(|| CacheError::UnsupportedMethod(request.method.to_string()))?;
        self.entries.write().await.insert(key, response);
        Ok(())
    }

    async fn delete(&self, request: &Request) -> Result<bool, CacheError> {
        let Some(key) = request.cache_key() else {
            return Ok(false);
        };
        Ok(self.entries.write().await.remove(&key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use url::Url;

    fn request(path: &str) -> Request {
        Request::get(Url::parse("http://localhost").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_open_creates_and_reuses_bucket() {
        let storage = MemoryCacheStorage::new();
        assert!(!storage.has("app-v1.0.0").await.unwrap());

        let bucket = storage.open("app-v1.0.0").await.unwrap();
        bucket
            .put(&request("/index.html"), Response::new("http://localhost/index.html", 200, "<html>"))
            .await
            .unwrap();

        let reopened = storage.open("app-v1.0.0").await.unwrap();
        let hit = reopened.match_request(&request("/index.html")).await.unwrap();
        assert_eq!(hit.unwrap().body, "<html>");
        assert_eq!(storage.keys().await.unwrap(), vec!["app-v1.0.0"]);
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let storage = MemoryCacheStorage::new();
        storage.open("b").await.unwrap();
        storage.open("a").await.unwrap();
        storage.open("b").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_delete_bucket() {
        let storage = MemoryCacheStorage::new();
        storage.open("app-v0.9.0").await.unwrap();
        assert!(storage.delete("app-v0.9.0").await.unwrap());
        assert!(!storage.delete("app-v0.9.0").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites_last_write_wins() {
        let storage = MemoryCacheStorage::new();
        let bucket = storage.open("app").await.unwrap();
        bucket.put(&request("/"), Response::new("http://localhost/", 200, "one")).await.unwrap();
        bucket.put(&request("/"), Response::new("http://localhost/", 200, "two")).await.unwrap();

        let hit = bucket.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.body, "two");
        assert_eq!(bucket.keys().await.unwrap(), vec!["http://localhost/"]);
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let storage = MemoryCacheStorage::new();
        let bucket = storage.open("app").await.unwrap();
        let post = request("/api").with_method(Method::POST);
        let result = bucket.put(&post, Response::new("http://localhost/api", 200, "")).await;
        assert!(matches!(result, Err(CacheError::UnsupportedMethod(_))));
        assert!(bucket.match_request(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_match_searches_all_buckets() {
        let storage = MemoryCacheStorage::new();
        storage.open("empty").await.unwrap();
        let bucket = storage.open("full").await.unwrap();
        bucket.put(&request("/a"), Response::new("http://localhost/a", 200, "a")).await.unwrap();

        assert!(storage.match_request(&request("/a")).await.unwrap().is_some());
        assert!(storage.match_request(&request("/b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let storage = MemoryCacheStorage::new();
        let bucket = storage.open("app").await.unwrap();
        bucket.put(&request("/a"), Response::new("http://localhost/a", 200, "a")).await.unwrap();
        assert!(bucket.delete(&request("/a")).await.unwrap());
        assert!(!bucket.delete(&request("/a")).await.unwrap());
    }
}
