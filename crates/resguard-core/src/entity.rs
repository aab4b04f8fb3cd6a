//! Entity model shared by the engine and its collaborators.
//!
//! Entities are schemaless JSON objects tagged with a resource kind. The set of
//! assignable fields for a kind lives in an explicit [`EntitySchema`] served by
//! the data store.

use std::collections::BTreeSet;

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Field name -> value mapping used for attribute assignment.
pub type Attributes = Map<String, Value>;

/// A single domain entity (persisted row or freshly constructed instance).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: String,
    fields: Attributes,
    persisted: bool,
}

impl Entity {
    /// Construct an unsaved entity with no fields set.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Attributes::new(),
            persisted: false,
        }
    }

    /// Wrap an existing row.
    pub fn persisted(kind: impl Into<String>, fields: Attributes) -> Self {
        Self {
            kind: kind.into(),
            fields,
            persisted: true,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn fields(&self) -> &Attributes {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `id` field rendered as a string (numbers are accepted too).
    pub fn id(&self) -> Option<String> {
        self.get("id").and_then(value_key)
    }

    /// True when `field` holds `value`, comparing strings and numbers by text.
    pub fn matches(&self, field: &str, value: &Value) -> bool {
        match (self.get(field).and_then(value_key), value_key(value)) {
            (Some(have), Some(want)) => have == want,
            _ => false,
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Assign every attribute onto the entity, overwriting existing values.
    pub fn assign(&mut self, attributes: Attributes) {
        for (k, v) in attributes {
            self.fields.insert(k, v);
        }
    }

    /// Human-readable reference used in error messages: `invoice/42` or `invoice/new`.
    pub fn label(&self) -> String {
        match self.id() {
            Some(id) => format!("{}/{}", self.kind, id),
            None => format!("{}/new", self.kind),
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Normalize scalar JSON values to a comparable key.
pub fn value_key(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Result of resolving one rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resolved {
    Single(Entity),
    Collection(Vec<Entity>),
    #[default]
    Absent,
}

impl Resolved {
    pub fn from_option(entity: Option<Entity>) -> Self {
        match entity {
            Some(e) => Resolved::Single(e),
            None => Resolved::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Resolved::Collection(_))
    }

    pub fn as_single(&self) -> Option<&Entity> {
        match self {
            Resolved::Single(e) => Some(e),
            _ => None,
        }
    }

    /// The single entity, or the first of a collection.
    pub fn into_first(self) -> Option<Entity> {
        match self {
            Resolved::Single(e) => Some(e),
            Resolved::Collection(v) => v.into_iter().next(),
            Resolved::Absent => None,
        }
    }

    /// Flatten into a list (Single -> one element, Absent -> empty).
    pub fn into_vec(self) -> Vec<Entity> {
        match self {
            Resolved::Single(e) => vec![e],
            Resolved::Collection(v) => v,
            Resolved::Absent => Vec::new(),
        }
    }
}

impl Serialize for Resolved {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Resolved::Single(e) => e.serialize(serializer),
            Resolved::Collection(v) => v.serialize(serializer),
            Resolved::Absent => serializer.serialize_none(),
        }
    }
}

/// Explicit field registry for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    kind: String,
    fields: BTreeSet<String>,
}

impl EntitySchema {
    pub fn new<I, S>(kind: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}
