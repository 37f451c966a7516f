//! Network access for the worker.
//!
//! `Fetcher` is the seam every handler goes through; `HttpFetcher` is the
//! reqwest-backed implementation used by the native host. Non-success HTTP
//! statuses are responses, not errors: only transport failures are `Err`.

pub mod error;
pub mod http;

use async_trait::async_trait;

use crate::models::{Request, Response};

pub use error::FetchError;
pub use http::HttpFetcher;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}
