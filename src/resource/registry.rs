//! Resource Registry - validated set of resource schemas
//!
//! All resource types are declared once (see [`super::declarations`]) and
//! checked together: relation targets must exist and names must be unique.
//! The built-in registry is built on first access and shared afterwards.

use super::declarations;
use super::instance::Resource;
use super::schema::Schema;
use crate::error::{MappingError, SchemaError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Lookup table of resource schemas
#[derive(Debug)]
pub struct Registry {
    schemas: HashMap<&'static str, Arc<Schema>>,
}

impl Registry {
    /// Validate and index a set of schemas
    pub fn new(schemas: Vec<Schema>) -> Result<Self, SchemaError> {
        let mut map: HashMap<&'static str, Arc<Schema>> = HashMap::new();

        for schema in schemas {
            let name = schema.name();
            if map.insert(name, Arc::new(schema)).is_some() {
                return Err(SchemaError::DuplicateResource(name.to_string()));
            }
        }

        for schema in map.values() {
            for (field, target) in schema.targets() {
                if !map.contains_key(target) {
                    return Err(SchemaError::UnknownTarget {
                        resource: schema.name().to_string(),
                        field: field.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(Self { schemas: map })
    }

    pub fn schema(&self, name: &str) -> Result<Arc<Schema>, MappingError> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| MappingError::UnknownResource(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// All resource names (sorted)
    pub fn resource_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Empty transient instance of a resource type
    pub fn new_resource(&self, name: &str) -> Result<Resource, MappingError> {
        Ok(Resource::new(self.schema(name)?))
    }

    /// Member conversion: one JSON object into one instance
    pub fn hydrate(&self, name: &str, raw: &Value) -> Result<Resource, MappingError> {
        Resource::hydrate(self, self.schema(name)?, raw)
    }

    /// Listing conversion: a JSON array into instances, order preserved
    pub fn listing(&self, name: &str, raw: &Value) -> Result<Vec<Resource>, MappingError> {
        match raw {
            Value::Array(items) => items.iter().map(|item| self.hydrate(name, item)).collect(),
            Value::Null => Ok(Vec::new()),
            _ => Err(MappingError::NotAnArray {
                resource: name.to_string(),
            }),
        }
    }
}

/// Global registry of the built-in resource declarations
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Get the built-in registry (validated on first access)
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let schemas = declarations::all()
            .unwrap_or_else(|e| panic!("Invalid built-in resource declaration: {}", e));
        Registry::new(schemas).unwrap_or_else(|e| panic!("Invalid built-in resource registry: {}", e))
    })
}
