//! Shared test helpers: an in-memory transport that records every call and
//! replays queued responses.

#![allow(dead_code)]

use anyhow::Result;
use podio_tasks::{Response, Transport};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    /// Query for GET, body for POST/PUT
    pub payload: Option<Value>,
}

/// Transport double: returns queued responses in order, records requests
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Result<Response>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with a JSON body
    pub fn respond_json(self, body: Value) -> Self {
        self.push(Ok(Response::new(200, body.to_string())))
    }

    /// Queue a 200 response with a raw body
    pub fn respond_text(self, body: &str) -> Self {
        self.push(Ok(Response::new(200, body)))
    }

    /// Queue a transport failure
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(anyhow::anyhow!(message.to_string())))
    }

    fn push(self, response: Result<Response>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls().pop().expect("no request was made")
    }

    fn record(&self, method: &'static str, path: &str, payload: Option<Value>) -> Result<Response> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            payload,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::new(204, "")))
    }
}

impl Transport for RecordingTransport {
    async fn get(&self, path: &str, query: &Value) -> Result<Response> {
        let query = (!query.is_null()).then(|| query.clone());
        self.record("GET", path, query)
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Response> {
        self.record("POST", path, body.cloned())
    }

    async fn put(&self, path: &str, body: Option<&Value>) -> Result<Response> {
        self.record("PUT", path, body.cloned())
    }

    async fn delete(&self, path: &str) -> Result<Response> {
        self.record("DELETE", path, None)
    }
}
