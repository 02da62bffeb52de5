use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{Result, StoreError};

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of raw page bodies for [`crate::sync`].
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP GET with a browser user agent.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Fetch { url: String::new(), message: format!("failed to build HTTP client: {e}") })?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let fail = |message: String| StoreError::Fetch { url: url.to_string(), message };
        let resp = self.client.get(url).send().map_err(|e| fail(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(fail(format!("server returned {status}")));
        }
        resp.text().map_err(|e| fail(e.to_string()))
    }
}
