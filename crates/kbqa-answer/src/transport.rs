use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::TransportError;

/// Status and raw body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

/// Minimal HTTP surface the generator needs. HTTP error statuses are returned
/// as responses; only connect, timeout and body-read failures are `Err`.
pub trait Transport: Send + Sync {
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError>;
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

fn into_response(resp: reqwest::blocking::Response) -> Result<HttpResponse, TransportError> {
    let status = resp.status().as_u16();
    let body = resp.text().map_err(|e| TransportError::Body(e.without_url().to_string()))?;
    Ok(HttpResponse { status, body })
}

impl Transport for ReqwestTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .map_err(|e| TransportError::Send(e.without_url().to_string()))?;
        into_response(resp)
    }

    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let resp = self.client.get(url).send().map_err(|e| TransportError::Send(e.without_url().to_string()))?;
        into_response(resp)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        (**self).post_json(url, body)
    }

    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}
