use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Cross-origin request to {0} not allowed in same-origin mode")]
    CrossOrigin(String),

    #[error("Offline: {0}")]
    Offline(String),
}

impl FetchError {
    /// Classify a reqwest failure, keeping timeouts distinct.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(url.to_string())
        } else {
            FetchError::Network(err)
        }
    }
}
