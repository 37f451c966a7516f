//! reqwest-backed fetcher.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{FetchError, Fetcher};
use crate::config::WorkerConfig;
use crate::models::{Request, RequestMode, Response, ResponseType};

/// GitHub rejects API requests without a user agent.
const USER_AGENT: &str = concat!("vlx-worker/", env!("CARGO_PKG_VERSION"));

/// HTTP fetcher scoped to the worker's origin.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: Url,
}

impl HttpFetcher {
    pub fn new(origin: Url, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            origin,
        })
    }

    pub fn from_config(config: &WorkerConfig) -> Result<Self> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        Ok(Self::new(config.origin_url()?, timeout)?)
    }

    fn response_type(&self, request: &Request) -> ResponseType {
        if request.is_same_origin(&self.origin) {
            ResponseType::Basic
        } else if request.mode == RequestMode::NoCors {
            ResponseType::Opaque
        } else {
            ResponseType::Cors
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url.as_str();
        let response_type = self.response_type(request);
        if request.mode == RequestMode::SameOrigin && response_type != ResponseType::Basic {
            return Err(FetchError::CrossOrigin(url.to_string()));
        }

        let mut builder = self.client.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        debug!(url = url, status = status.as_u16(), "Fetched");

        if response_type == ResponseType::Opaque {
            return Ok(Response::opaque(url));
        }

        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(Response {
            url: final_url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            response_type,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Url::parse("http://localhost:8080").unwrap(), None).unwrap()
    }

    fn request(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_response_type_by_origin_and_mode() {
        let fetcher = fetcher();
        assert_eq!(
            fetcher.response_type(&request("http://localhost:8080/index.html")),
            ResponseType::Basic
        );
        assert_eq!(
            fetcher.response_type(&request("https://api.github.com/repos/a/b/releases/latest")),
            ResponseType::Cors
        );
        assert_eq!(
            fetcher.response_type(
                &request("https://cdn.example.com/font.woff2").with_mode(RequestMode::NoCors)
            ),
            ResponseType::Opaque
        );
        // Same-origin no-cors is still readable
        assert_eq!(
            fetcher.response_type(
                &request("http://localhost:8080/app.js").with_mode(RequestMode::NoCors)
            ),
            ResponseType::Basic
        );
    }

    #[tokio::test]
    async fn test_same_origin_mode_rejects_cross_origin() {
        let result = fetcher()
            .fetch(&request("https://example.com/").with_mode(RequestMode::SameOrigin))
            .await;
        assert!(matches!(result, Err(FetchError::CrossOrigin(_))));
    }

    #[test]
    fn test_from_config() {
        let config = WorkerConfig {
            request_timeout_secs: Some(10),
            ..Default::default()
        };
        assert!(HttpFetcher::from_config(&config).is_ok());
    }
}
