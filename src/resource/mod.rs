//! Resource mapping layer
//!
//! This module provides a data-driven approach to mapping remote resources.
//! Each resource type is a declarative field table; one generic engine turns
//! JSON payloads into typed instances and back.
//!
//! # Architecture
//!
//! - [`schema`] - Field and relation declarations, validated on build
//! - [`value`] - Field values and lenient JSON coercion
//! - [`instance`] - Resource instances: hydrate, dehydrate, typed access
//! - [`registry`] - Validated set of schemas, member/listing conversion
//! - [`declarations`] - Built-in resource declarations (task and friends)
//!
//! # Example
//!
//! ```
//! use podio_tasks::resource::registry;
//! use serde_json::json;
//!
//! let task = registry().hydrate("task", &json!({"task_id": 7, "text": "Call Bob"})).unwrap();
//! assert_eq!(task.integer("task_id"), Some(7));
//! assert!(!task.is_set("description"));
//! ```

pub mod declarations;
mod instance;
mod registry;
pub mod schema;
mod value;

pub use instance::Resource;
pub use registry::{registry, Registry};
pub use schema::{FieldDef, FieldKind, PropertyKind, PropertyOptions, Relation, RelationOptions, Schema, SchemaBuilder};
pub use value::{format_datetime, FieldValue, DATETIME_FORMAT, DATE_FORMAT};
