//! Transport seam
//!
//! Remote operations talk to the API only through [`Transport`]. Failures are
//! returned as the transport produced them; nothing here retries or interprets
//! them.

use anyhow::{Context, Result};
use serde_json::Value;

/// Raw response of one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Raw body text
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON (`null` for an empty body)
    pub fn json_body(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).context("Failed to parse response JSON")
    }
}

/// Query-string options accepted by write and fetch endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Suppress notifications and stream events
    pub silent: bool,
    /// `Some(false)` disables webhooks for this call
    pub hook: Option<bool>,
    /// Field selection, e.g. `items.view(micro)`
    pub fields: Option<String>,
    /// Free-form extra parameters
    pub params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn hook(mut self, hook: bool) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Encoded query string, or `None` when no option applies
    pub fn query_string(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();

        if self.silent {
            parts.push("silent=1".to_string());
        }
        if self.hook == Some(false) {
            parts.push("hook=false".to_string());
        }
        if let Some(fields) = self.fields.as_deref().filter(|f| !f.is_empty()) {
            parts.push(format!("fields={}", urlencoding::encode(fields)));
        }
        for (key, value) in &self.params {
            parts.push(format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("&"))
        }
    }

    /// Append the options to a path
    pub fn apply(&self, path: &str) -> String {
        match self.query_string() {
            Some(query) if path.contains('?') => format!("{}&{}", path, query),
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        }
    }
}

/// HTTP collaborator used by every remote operation
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// GET `path`, with `query` (a JSON object) as query parameters
    async fn get(&self, path: &str, query: &Value) -> Result<Response>;

    /// POST `path` with an optional JSON body
    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Response>;

    /// PUT `path` with an optional JSON body
    async fn put(&self, path: &str, body: Option<&Value>) -> Result<Response>;

    /// DELETE `path`
    async fn delete(&self, path: &str) -> Result<Response>;

    /// Path with the option query string appended
    fn url_with_options(&self, path: &str, options: &RequestOptions) -> String {
        options.apply(path)
    }
}

/// Flatten a JSON object into query pairs.
/// Arrays repeat the key; null values and nested objects are skipped.
pub fn query_pairs(query: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = query else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            },
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            },
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
