//! Resource Schema - declarative field tables
//!
//! Each resource type is described once by an ordered list of field
//! definitions. Hydration and dehydration walk this table; nothing about a
//! resource's shape lives anywhere else.

use crate::error::SchemaError;

/// Scalar property types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Integer,
    String,
    Boolean,
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    DateTime,
    /// `YYYY-MM-DD`
    Date,
    /// Opaque hash or array, passed through as-is
    Json,
}

/// Options for a scalar property
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyOptions {
    /// Marks the resource identifier (at most one per resource)
    pub id: bool,
}

impl PropertyOptions {
    pub fn identifier() -> Self {
        Self { id: true }
    }
}

/// Options for has-one / has-many relations
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationOptions {
    /// Key inside the nested object that holds its identifier.
    /// When set, the relation is written back as identifier(s) only.
    pub json_value: Option<&'static str>,
    /// Top-level key the identifiers are written under (has-many only)
    pub json_target: Option<&'static str>,
}

impl RelationOptions {
    pub fn json_value(key: &'static str) -> Self {
        Self {
            json_value: Some(key),
            json_target: None,
        }
    }

    pub fn json_target(mut self, key: &'static str) -> Self {
        self.json_target = Some(key);
        self
    }
}

/// Relation definition
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub target: &'static str,
    pub options: RelationOptions,
}

/// What a field holds
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Property(PropertyKind),
    HasOne(Relation),
    HasMany(Relation),
}

/// Field definition
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub identifier: bool,
}

impl FieldDef {
    pub fn relation(&self) -> Option<&Relation> {
        match &self.kind {
            FieldKind::HasOne(rel) | FieldKind::HasMany(rel) => Some(rel),
            FieldKind::Property(_) => None,
        }
    }

    /// Key the field is written under by `dehydrate`
    pub fn write_key(&self) -> &'static str {
        match &self.kind {
            FieldKind::HasMany(rel) if rel.options.json_value.is_some() => {
                rel.options.json_target.unwrap_or(self.name)
            }
            _ => self.name,
        }
    }
}

/// Validated schema for one resource type
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldDef>,
    id_index: Option<usize>,
}

impl Schema {
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identifier(&self) -> Option<&FieldDef> {
        self.id_index.map(|i| &self.fields[i])
    }

    /// Names of every resource this schema relates to
    pub fn targets(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.fields
            .iter()
            .filter_map(|f| f.relation().map(|rel| (f.name, rel.target)))
    }
}

/// Collects field declarations; validated by [`SchemaBuilder::build`]
#[derive(Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    /// Declare a scalar property
    pub fn property(mut self, name: &'static str, kind: PropertyKind, options: PropertyOptions) -> Self {
        self.fields.push(FieldDef {
            name,
            kind: FieldKind::Property(kind),
            identifier: options.id,
        });
        self
    }

    /// Declare a has-one relation
    pub fn has_one(mut self, name: &'static str, target: &'static str, options: RelationOptions) -> Self {
        self.fields.push(FieldDef {
            name,
            kind: FieldKind::HasOne(Relation { target, options }),
            identifier: false,
        });
        self
    }

    /// Declare a has-many relation
    pub fn has_many(mut self, name: &'static str, target: &'static str, options: RelationOptions) -> Self {
        self.fields.push(FieldDef {
            name,
            kind: FieldKind::HasMany(Relation { target, options }),
            identifier: false,
        });
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut id_index: Option<usize> = None;

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    resource: self.name.to_string(),
                    field: field.name.to_string(),
                });
            }

            if field.identifier {
                if let Some(first) = id_index {
                    return Err(SchemaError::DuplicateIdentifier {
                        resource: self.name.to_string(),
                        first: self.fields[first].name.to_string(),
                        second: field.name.to_string(),
                    });
                }
                id_index = Some(i);
            }
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            id_index,
        })
    }
}
