//! Podio Client
//!
//! Main client for the Podio API, combining the configured endpoint, the
//! access token and the HTTP layer. This is the [`Transport`] used outside
//! of tests.

use super::http::PodioHttpClient;
use super::transport::{query_pairs, Response, Transport};
use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://api.podio.com";

/// Main Podio client
#[derive(Clone)]
pub struct PodioClient {
    pub http: PodioHttpClient,
    base_url: String,
    access_token: Option<String>,
}

impl PodioClient {
    /// Create a new client for `api_url`, authenticating with a pre-obtained token
    pub fn new(api_url: &str, access_token: Option<String>) -> Result<Self> {
        Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;

        Ok(Self {
            http: PodioHttpClient::new()?,
            base_url: api_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (the path may carry a query string)
    pub fn api_url(&self, path: &str) -> Result<Url> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&url).with_context(|| format!("Invalid API path: {}", path))
    }

    fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl Transport for PodioClient {
    async fn get(&self, path: &str, query: &Value) -> Result<Response> {
        let url = self.api_url(path)?;
        self.http.get(url, self.token(), &query_pairs(query)).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.api_url(path)?;
        self.http.post(url, self.token(), body).await
    }

    async fn put(&self, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.api_url(path)?;
        self.http.put(url, self.token(), body).await
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        let url = self.api_url(path)?;
        self.http.delete(url, self.token()).await
    }
}
