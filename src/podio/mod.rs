//! Podio API interaction module
//!
//! # Module Structure
//!
//! - [`transport`] - The `Transport` trait, raw responses and request options
//! - [`http`] - HTTP utilities for REST API calls
//! - [`client`] - Main Podio client (the reqwest-backed transport)
//!
//! # Example
//!
//! ```no_run
//! use podio_tasks::podio::{PodioClient, Transport};
//! use serde_json::json;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = PodioClient::new("https://api.podio.com", Some("token".to_string()))?;
//!     let response = client.get("/task/", &json!({"limit": 10})).await?;
//!     println!("{}", response.json_body()?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod transport;

pub use client::{PodioClient, DEFAULT_API_URL};
pub use http::format_api_error;
pub use transport::{query_pairs, RequestOptions, Response, Transport};
