//! Podio Tasks Library
//!
//! Typed client for the Podio task API. Resources are described by
//! declarative field tables; a single mapping engine hydrates JSON responses
//! into typed instances and dehydrates them back into write requests.
//!
//! # Architecture
//!
//! - **Mapping**: [`resource`] - schemas, registry, hydrate/dehydrate
//! - **Operations**: [`task`] - every task endpoint as a narrow async function
//! - **Transport**: [`podio`] - the `Transport` trait and its reqwest client
//!
//! # Example
//!
//! ```no_run
//! use podio_tasks::{PodioClient, Task};
//!
//! #[tokio::main]
//! async fn main() -> podio_tasks::Result<()> {
//!     let client = PodioClient::new("https://api.podio.com", Some("token".to_string()))?;
//!
//!     let mut task = Task::new();
//!     task.set_text("Send quarterly report").set_responsible(1234);
//!     task.save(&client).await?;
//!
//!     task.completed(&client).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod podio;
pub mod resource;
pub mod task;

pub use config::Config;
pub use error::{Error, MappingError, Result, SchemaError};
pub use podio::{PodioClient, RequestOptions, Response, Transport};
pub use resource::{registry, FieldValue, Resource};
pub use task::{SummaryBucket, Task, TaskSummary};
