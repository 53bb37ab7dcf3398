//! Error types
//!
//! Transport failures are carried through untouched; everything the mapping
//! layer itself can reject has its own variant.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by remote operations
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the transport (connectivity, non-2xx status, bad JSON body)
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    /// Response or attribute could not be mapped onto the resource schema
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Operation needs an identifier but the instance has not been saved yet
    #[error("{0} has no identifier yet; save it first")]
    NotPersisted(&'static str),
}

/// Errors raised while converting between JSON and resource instances
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("invalid date-time for field '{field}': {value:?}")]
    InvalidDateTime { field: String, value: String },

    #[error("resource '{resource}' has no field '{field}'")]
    UnknownField { resource: String, field: String },

    #[error("value does not match the declared type of '{resource}.{field}'")]
    TypeMismatch { resource: String, field: String },

    #[error("identifier '{resource}.{field}' is already set")]
    IdentifierAlreadySet { resource: String, field: String },

    #[error("expected a JSON object for resource '{resource}'")]
    NotAnObject { resource: String },

    #[error("expected a JSON array of '{resource}' objects")]
    NotAnArray { resource: String },

    #[error("response for '{resource}' carries no identifier")]
    MissingIdentifier { resource: String },

    #[error("unknown resource type '{0}'")]
    UnknownResource(String),
}

/// Errors in resource declarations, caught when a schema or registry is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("resource '{resource}' declares field '{field}' twice")]
    DuplicateField { resource: String, field: String },

    #[error("resource '{resource}' declares two identifiers: '{first}' and '{second}'")]
    DuplicateIdentifier {
        resource: String,
        first: String,
        second: String,
    },

    #[error("resource '{0}' is declared twice")]
    DuplicateResource(String),

    #[error("relation '{resource}.{field}' points at undeclared resource '{target}'")]
    UnknownTarget {
        resource: String,
        field: String,
        target: String,
    },
}
