//! HTTP utilities for Podio REST API calls

use super::transport::Response;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// User agent sent with every request
const USER_AGENT: &str = concat!("podio-tasks/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for Podio API calls
#[derive(Clone)]
pub struct PodioHttpClient {
    client: Client,
}

impl PodioHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: Url, token: Option<&str>, query: &[(String, String)]) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let request = self.client.get(url).query(query);
        self.execute(request, token).await
    }

    /// Make a POST request
    pub async fn post(&self, url: Url, token: Option<&str>, body: Option<&Value>) -> Result<Response> {
        tracing::debug!("POST {}", url);
        let request = with_body(self.client.post(url), body);
        self.execute(request, token).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: Url, token: Option<&str>, body: Option<&Value>) -> Result<Response> {
        tracing::debug!("PUT {}", url);
        let request = with_body(self.client.put(url), body);
        self.execute(request, token).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: Url, token: Option<&str>) -> Result<Response> {
        tracing::debug!("DELETE {}", url);
        self.execute(self.client.delete(url), token).await
    }

    async fn execute(&self, mut request: RequestBuilder, token: Option<&str>) -> Result<Response> {
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        Ok(Response::new(status.as_u16(), body))
    }
}

fn with_body(request: RequestBuilder, body: Option<&Value>) -> RequestBuilder {
    match body {
        Some(body) => request.json(body),
        None => request,
    }
}

/// Format a Podio API error for display
pub fn format_api_error(error: &anyhow::Error) -> String {
    let error_str = error.to_string();

    if error_str.contains("401") {
        return "Authentication failed. Check your access token.".to_string();
    }
    if error_str.contains("403") {
        return "Permission denied for this task.".to_string();
    }
    if error_str.contains("404") || error_str.contains("410") {
        return "Task not found.".to_string();
    }
    if error_str.contains("420") || error_str.contains("429") {
        return "Rate limit exceeded. Please try again later.".to_string();
    }
    if error_str.contains("400") {
        return "Invalid request. Check your parameters.".to_string();
    }
    if error_str.contains("500") || error_str.contains("502") || error_str.contains("503") {
        return "Podio is temporarily unavailable. Please try again.".to_string();
    }
    if error_str.contains("API request failed") {
        return "Request failed. Check your network connection and try again.".to_string();
    }

    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_body() {
        let body = "x".repeat(500);
        let logged = sanitize_for_log(&body);
        assert!(logged.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(logged.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("bad\nline\t"), "badline");
    }

    #[test]
    fn test_format_api_error_messages() {
        let err = anyhow::anyhow!("API request failed: 404 Not Found");
        assert_eq!(format_api_error(&err), "Task not found.");

        let err = anyhow::anyhow!("API request failed: 401 Unauthorized");
        assert_eq!(format_api_error(&err), "Authentication failed. Check your access token.");

        let err = anyhow::anyhow!("API request failed: 418 I'm a teapot");
        assert_eq!(
            format_api_error(&err),
            "Request failed. Check your network connection and try again."
        );
    }
}
