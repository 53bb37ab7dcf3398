//! Resource instances
//!
//! A [`Resource`] is a value store keyed by declared field names. A key is
//! present only if the field was assigned (by hydration or by `set`), so the
//! store doubles as the record of touched fields that `dehydrate` emits.

use super::registry::Registry;
use super::schema::{FieldDef, FieldKind, Relation, Schema};
use super::value::{coerce_scalar, FieldValue};
use crate::error::MappingError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One typed record of a remote entity
#[derive(Clone)]
pub struct Resource {
    schema: Arc<Schema>,
    values: BTreeMap<&'static str, FieldValue>,
}

impl Resource {
    /// Create an empty (transient) instance
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Build an instance from a JSON object, resolving relations through `registry`
    pub fn hydrate(registry: &Registry, schema: Arc<Schema>, raw: &Value) -> Result<Self, MappingError> {
        let Value::Object(map) = raw else {
            return Err(MappingError::NotAnObject {
                resource: schema.name().to_string(),
            });
        };

        let mut resource = Resource::new(schema.clone());

        for field in schema.fields() {
            let value = match &field.kind {
                FieldKind::Property(kind) => match map.get(field.name) {
                    Some(raw) => coerce_scalar(field.name, *kind, raw)?,
                    None => None,
                },
                FieldKind::HasOne(rel) => match map.get(field.name) {
                    Some(raw) => hydrate_nested(registry, rel, raw)?.map(|r| FieldValue::One(Box::new(r))),
                    None => None,
                },
                FieldKind::HasMany(rel) => hydrate_many(registry, field, rel, map)?,
            };

            if let Some(value) = value {
                resource.values.insert(field.name, value);
            }
        }

        Ok(resource)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.name()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names of the fields currently set, in declaration order
    pub fn set_fields(&self) -> Vec<&'static str> {
        self.schema
            .fields()
            .iter()
            .filter(|f| self.values.contains_key(f.name))
            .map(|f| f.name)
            .collect()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.get(name)? {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name)? {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn json(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            FieldValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn one(&self, name: &str) -> Option<&Resource> {
        match self.get(name)? {
            FieldValue::One(res) => Some(res),
            _ => None,
        }
    }

    pub fn many(&self, name: &str) -> Option<&[Resource]> {
        match self.get(name)? {
            FieldValue::Many(items) => Some(items),
            _ => None,
        }
    }

    /// Current identifier value, if the schema declares one and it is set
    pub fn identifier(&self) -> Option<&FieldValue> {
        self.schema.identifier().and_then(|f| self.values.get(f.name))
    }

    /// Persisted instances carry an identifier
    pub fn is_persisted(&self) -> bool {
        self.identifier().is_some()
    }

    /// Assign a field. The value must match the declared type; a present
    /// identifier can not be overwritten.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<&mut Self, MappingError> {
        let value = value.into();
        let field = *self.declared(name)?;

        if !accepts(&field, &value) {
            return Err(MappingError::TypeMismatch {
                resource: self.type_name().to_string(),
                field: name.to_string(),
            });
        }
        self.guard_identifier(&field)?;

        self.values.insert(field.name, value);
        Ok(self)
    }

    /// Assign a value already known to fit the declaration (typed wrappers)
    pub(crate) fn store(&mut self, name: &'static str, value: FieldValue) {
        debug_assert!(self.schema.field(name).is_some(), "undeclared field {}", name);
        self.values.insert(name, value);
    }

    /// Clear a field so it is no longer written out
    pub fn unset(&mut self, name: &str) -> Result<Option<FieldValue>, MappingError> {
        let field = *self.declared(name)?;
        self.guard_identifier(&field)?;
        Ok(self.values.remove(field.name))
    }

    /// Mapping for a write request: set fields only, relations remapped per
    /// their `json_value` / `json_target` options
    pub fn dehydrate(&self) -> Value {
        let mut out = Map::new();

        for field in self.schema.fields() {
            let Some(value) = self.values.get(field.name) else {
                continue;
            };

            match (&field.kind, value) {
                (FieldKind::HasOne(rel), FieldValue::One(nested)) => match rel.options.json_value {
                    Some(key) => {
                        if let Some(id) = nested.get(key) {
                            out.insert(field.name.to_string(), id.to_json());
                        }
                    },
                    None => {
                        out.insert(field.name.to_string(), nested.dehydrate());
                    },
                },
                (FieldKind::HasMany(rel), FieldValue::Many(items)) => {
                    let array: Vec<Value> = match rel.options.json_value {
                        Some(key) => items.iter().filter_map(|item| item.get(key)).map(FieldValue::to_json).collect(),
                        None => items.iter().map(Resource::dehydrate).collect(),
                    };
                    out.insert(field.write_key().to_string(), Value::Array(array));
                },
                (_, value) => {
                    out.insert(field.name.to_string(), value.to_json());
                },
            }
        }

        Value::Object(out)
    }

    /// Full representation with nested objects kept whole
    pub fn to_json(&self) -> Value {
        let out: Map<String, Value> = self
            .schema
            .fields()
            .iter()
            .filter_map(|f| self.values.get(f.name).map(|v| (f.name.to_string(), v.to_json())))
            .collect();
        Value::Object(out)
    }

    fn declared(&self, name: &str) -> Result<&FieldDef, MappingError> {
        self.schema.field(name).ok_or_else(|| MappingError::UnknownField {
            resource: self.type_name().to_string(),
            field: name.to_string(),
        })
    }

    fn guard_identifier(&self, field: &FieldDef) -> Result<(), MappingError> {
        if field.identifier && self.values.contains_key(field.name) {
            return Err(MappingError::IdentifierAlreadySet {
                resource: self.type_name().to_string(),
                field: field.name.to_string(),
            });
        }
        Ok(())
    }
}

fn accepts(field: &FieldDef, value: &FieldValue) -> bool {
    match (&field.kind, value) {
        (FieldKind::Property(kind), value) => value.matches(*kind),
        (FieldKind::HasOne(rel), FieldValue::One(res)) => res.type_name() == rel.target,
        (FieldKind::HasMany(rel), FieldValue::Many(items)) => items.iter().all(|r| r.type_name() == rel.target),
        _ => false,
    }
}

/// Hydrate one nested value. Objects hydrate fully; a bare scalar becomes an
/// instance holding only the identifier.
fn hydrate_nested(registry: &Registry, rel: &Relation, raw: &Value) -> Result<Option<Resource>, MappingError> {
    let schema = registry.schema(rel.target)?;

    match raw {
        Value::Null | Value::Array(_) => Ok(None),
        Value::Object(_) => Resource::hydrate(registry, schema, raw).map(Some),
        scalar => {
            let id_key = rel
                .options
                .json_value
                .or_else(|| schema.identifier().map(|f| f.name));
            let Some(id_key) = id_key else {
                return Ok(None);
            };

            let mut wrapped = Map::new();
            wrapped.insert(id_key.to_string(), scalar.clone());
            Resource::hydrate(registry, schema, &Value::Object(wrapped)).map(Some)
        },
    }
}

fn hydrate_many(
    registry: &Registry,
    field: &FieldDef,
    rel: &Relation,
    map: &Map<String, Value>,
) -> Result<Option<FieldValue>, MappingError> {
    let raw = match map.get(field.name) {
        Some(raw) => raw,
        None => {
            // Identifier arrays written by `dehydrate` read back as id-only instances
            let fallback = rel.options.json_value.and(rel.options.json_target);
            match fallback.and_then(|key| map.get(key)) {
                Some(raw) => raw,
                None => return Ok(None),
            }
        },
    };

    let items = match raw {
        Value::Null => return Ok(None),
        Value::Array(elements) => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                if let Some(item) = hydrate_nested(registry, rel, element)? {
                    items.push(item);
                }
            }
            items
        },
        single => hydrate_nested(registry, rel, single)?.into_iter().collect(),
    };

    Ok(Some(FieldValue::Many(items)))
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.values == other.values
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("type", &self.type_name())
            .field("values", &self.values)
            .finish()
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
