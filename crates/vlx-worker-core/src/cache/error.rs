use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Only GET requests can be cached, got {0}")]
    UnsupportedMethod(String),

    #[error("Invalid cache name: {0}")]
    InvalidName(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}
