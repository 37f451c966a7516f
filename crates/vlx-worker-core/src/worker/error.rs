use thiserror::Error;

use crate::cache::CacheError;
use crate::net::FetchError;
use crate::platform::PlatformError;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid asset path {path}: {source}")]
    InvalidAsset {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch asset {url}: {source}")]
    AssetFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Asset {url} returned status {status}")]
    AssetStatus { url: String, status: u16 },
}
