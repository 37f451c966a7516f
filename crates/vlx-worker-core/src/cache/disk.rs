//! Disk-backed cache storage.
//!
//! Layout: `<root>/<bucket-name>/<sha256(key)>.entry`. Each entry file is a
//! single-line JSON header followed by the raw response body. Writes go to a
//! temporary file that is renamed into place, so concurrent writers to the
//! same key never interleave; the last rename wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{CacheBucket, CacheError, CacheStorage};
use crate::models::{Request, Response, ResponseType};

const ENTRY_EXTENSION: &str = "entry";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryHeader {
    key: String,
    url: String,
    status: u16,
    status_text: String,
    response_type: ResponseType,
    headers: Vec<(String, String)>,
    cached_at: DateTime<Utc>,
}

pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, name: &str) -> Result<PathBuf, CacheError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

/// Bucket names become directory names, so only a safe subset is allowed.
fn validate_name(name: &str) -> Result<(), CacheError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidName(name.to_string()))
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>, CacheError> {
        let dir = self.bucket_dir(name)?;
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Arc::new(DiskBucket {
            name: name.to_string(),
            dir,
        }))
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        let dir = self.bucket_dir(name)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let dir = self.bucket_dir(name)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub struct DiskBucket {
    name: String,
    dir: PathBuf,
}

impl DiskBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        self.dir.join(format!("{}.{}", hex, ENTRY_EXTENSION))
    }

    async fn read_entry(path: &Path) -> Result<Option<(EntryHeader, Bytes)>, CacheError> {
        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let split = contents
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(contents.len());
        let header: EntryHeader = serde_json::from_slice(&contents[..split])?;
        let body = if split < contents.len() {
            Bytes::copy_from_slice(&contents[split + 1..])
        } else {
            Bytes::new()
        };
        Ok(Some((header, body)))
    }
}

#[async_trait]
impl CacheBucket for DiskBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let Some(key) = request.cache_key() else {
            return Ok(None);
        };
        let Some((header, body)) = Self::read_entry(&self.entry_path(&key)).await? else {
            return Ok(None);
        };
        // Hash collision or foreign file
        if header.key != key {
            return Ok(None);
        }
        Ok(Some(Response {
            url: header.url,
            status: header.status,
            status_text: header.status_text,
            response_type: header.response_type,
            headers: header.headers,
            body,
        }))
    }

    async fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        let key = request
            .cache_key()
            .ok_or_else(|| CacheError::UnsupportedMethod(request.method.to_string()))?;
        let path = self.entry_path(&key);

        let header = EntryHeader {
            key,
            url: response.url,
            status: response.status,
            status_text: response.status_text,
            response_type: response.response_type,
            headers: response.headers,
            cached_at: Utc::now(),
        };
        let mut contents = serde_json::to_vec(&header)?;
        contents.push(b'\n');
        contents.extend_from_slice(&response.body);

        let temp = path.with_extension(format!(
            "tmp-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&temp, contents).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        debug!(cache = %self.name, key = %header.key, "Stored cache entry");
        Ok(())
    }

    async fn delete(&self, request: &Request) -> Result<bool, CacheError> {
        let Some(key) = request.cache_key() else {
            return Ok(false);
        };
        match tokio::fs::remove_file(self.entry_path(&key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some((header, _)) = Self::read_entry(&path).await? {
                keys.push(header.key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(path: &str) -> Request {
        Request::get(Url::parse("http://localhost").unwrap().join(path).unwrap())
    }

    fn storage() -> (tempfile::TempDir, DiskCacheStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskCacheStorage::new(dir.path().join("buckets")).unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_and_match_preserves_response() {
        let (_dir, storage) = storage();
        let bucket = storage.open("vlx-inventario-v1.0.0").await.unwrap();

        let body: Vec<u8> = vec![0x89, b'P', b'N', b'G', b'\n', 0, 255];
        let response = Response::new("http://localhost/icon-192.png", 200, body.clone())
            .with_header("Content-Type", "image/png");
        bucket.put(&request("/icon-192.png"), response.clone()).await.unwrap();

        let hit = bucket
            .match_request(&request("/icon-192.png"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit, response);
        assert_eq!(hit.body.as_ref(), body.as_slice());
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let (dir, storage) = storage();
        let bucket = storage.open("app-v1.0.0").await.unwrap();
        bucket
            .put(&request("/"), Response::new("http://localhost/", 200, "root"))
            .await
            .unwrap();
        drop(storage);

        let reopened = DiskCacheStorage::new(dir.path().join("buckets")).unwrap();
        assert!(reopened.has("app-v1.0.0").await.unwrap());
        let hit = reopened.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.body, "root");
    }

    #[tokio::test]
    async fn test_keys_and_delete_bucket() {
        let (_dir, storage) = storage();
        storage.open("app-v1.0.0").await.unwrap();
        storage.open("app-v0.9.0").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["app-v0.9.0", "app-v1.0.0"]);

        assert!(storage.delete("app-v0.9.0").await.unwrap());
        assert!(!storage.delete("app-v0.9.0").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["app-v1.0.0"]);
    }

    #[tokio::test]
    async fn test_bucket_keys_and_entry_delete() {
        let (_dir, storage) = storage();
        let bucket = storage.open("app").await.unwrap();
        bucket.put(&request("/b"), Response::new("http://localhost/b", 200, "")).await.unwrap();
        bucket.put(&request("/a"), Response::new("http://localhost/a", 200, "")).await.unwrap();
        assert_eq!(
            bucket.keys().await.unwrap(),
            vec!["http://localhost/a", "http://localhost/b"]
        );

        assert!(bucket.delete(&request("/a")).await.unwrap());
        assert!(bucket.match_request(&request("/a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_keeps_last_write() {
        let (_dir, storage) = storage();
        let bucket = storage.open("app").await.unwrap();
        bucket.put(&request("/"), Response::new("http://localhost/", 200, "old")).await.unwrap();
        bucket.put(&request("/"), Response::new("http://localhost/", 200, "new")).await.unwrap();
        let hit = bucket.match_request(&request("/")).await.unwrap().unwrap();
        assert_eq!(hit.body, "new");
        assert_eq!(bucket.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_unsafe_names() {
        let (_dir, storage) = storage();
        assert!(matches!(storage.open("../escape").await, Err(CacheError::InvalidName(_))));
        assert!(matches!(storage.open("").await, Err(CacheError::InvalidName(_))));
        assert!(matches!(storage.open("a/b").await, Err(CacheError::InvalidName(_))));
    }
}
