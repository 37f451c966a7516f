use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Response tainting as seen by the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    #[default]
    Basic,
    /// Cross-origin response readable by the page.
    Cors,
    /// Cross-origin `no-cors` response: status 0, no headers, no body.
    Opaque,
    Error,
}

/// A network or cached response. Cloning shares the body buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            status,
            status_text: String::new(),
            response_type: ResponseType::Basic,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn opaque(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 0,
            status_text: String::new(),
            response_type: ResponseType::Opaque,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Status in the 200-299 range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete same-origin 200 responses are written back to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
