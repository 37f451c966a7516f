use reqwest::Method;
use url::Url;

/// How a request treats cross-origin responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// Page navigation.
    Navigate,
    SameOrigin,
    /// Cross-origin reads allowed, response type is `cors`.
    #[default]
    Cors,
    /// Cross-origin responses come back opaque.
    NoCors,
}

/// An outgoing request from a controlled page.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::default(),
            headers: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Identity of this request in a cache bucket.
    ///
    /// Only GET requests are cacheable. The fragment never reaches the
    /// network, so it is not part of the key.
    pub fn cache_key(&self) -> Option<String> {
        if self.method != Method::GET {
            return None;
        }
        let mut url = self.url.clone();
        url.set_fragment(None);
        Some(url.to_string())
    }

    pub fn is_same_origin(&self, origin: &Url) -> bool {
        self.url.origin() == origin.origin()
    }
}
