//! In-memory data store backed by `DashMap`.
//!
//! Relations follow naming conventions: a plural association on a parent of
//! kind `account` yields rows of the singular kind whose `account_id` equals
//! the parent's id; a singular association yields the first such row.

use std::collections::{BTreeMap, HashMap};

use dashmap::DashMap;
use serde_json::{Map, Value};

use resguard_core::error::{Result, ResguardError};
use resguard_core::naming::singularize;
use resguard_core::{DataStore, Entity, EntitySchema, Resolved};

#[derive(Default)]
pub struct MemoryStore {
    schemas: HashMap<String, EntitySchema>,
    rows: DashMap<String, Vec<Entity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from declared types and seed rows.
    pub fn from_config(
        types: &BTreeMap<String, Vec<String>>,
        seed: &BTreeMap<String, Vec<Map<String, Value>>>,
    ) -> Result<Self> {
        let mut store = Self::new();
        for (kind, fields) in types {
            store.define(EntitySchema::new(kind.clone(), fields.iter().cloned()));
        }
        for (kind, rows) in seed {
            for row in rows {
                store.insert(Entity::persisted(kind.clone(), row.clone()))?;
            }
        }
        Ok(store)
    }

    pub fn define(&mut self, schema: EntitySchema) {
        self.schemas.insert(schema.kind().to_string(), schema);
    }

    /// Insert or replace a row (by id).
    pub fn insert(&self, entity: Entity) -> Result<()> {
        if !self.schemas.contains_key(entity.kind()) {
            return Err(ResguardError::BadRequest(format!(
                "cannot store undeclared type: {}",
                entity.kind()
            )));
        }
        let id = entity
            .id()
            .ok_or_else(|| ResguardError::BadRequest(format!("{} row without id", entity.kind())))?;

        let mut rows = self.rows.entry(entity.kind().to_string()).or_default();
        let want = Value::String(id);
        match rows.iter_mut().find(|e| e.matches("id", &want)) {
            Some(existing) => *existing = entity,
            None => rows.push(entity),
        }
        Ok(())
    }

    pub fn count(&self, kind: &str) -> usize {
        self.rows.get(kind).map(|r| r.len()).unwrap_or(0)
    }

    fn rows_where(&self, kind: &str, pred: impl Fn(&Entity) -> bool) -> Vec<Entity> {
        self.rows
            .get(kind)
            .map(|r| r.iter().filter(|e| pred(e)).cloned().collect())
            .unwrap_or_default()
    }
}

impl DataStore for MemoryStore {
    fn schema(&self, kind: &str) -> Option<&EntitySchema> {
        self.schemas.get(kind)
    }

    fn all(&self, kind: &str) -> Result<Vec<Entity>> {
        Ok(self.rows_where(kind, |_| true))
    }

    fn find_by_id(&self, kind: &str, id: &str) -> Result<Option<Entity>> {
        let want = Value::String(id.to_string());
        Ok(self.rows_where(kind, |e| e.matches("id", &want)).into_iter().next())
    }

    fn find_by(&self, kind: &str, conditions: &[(String, Value)]) -> Result<Option<Entity>> {
        Ok(self
            .rows_where(kind, |e| conditions.iter().all(|(f, v)| e.matches(f, v)))
            .into_iter()
            .next())
    }

    fn query_relation(&self, parent: &Entity, association: &str) -> Result<Resolved> {
        let kind = singularize(association);
        if !self.schemas.contains_key(&kind) {
            return Err(ResguardError::MisconfiguredRule(format!(
                "{} has no association `{association}`",
                parent.kind()
            )));
        }
        let Some(parent_id) = parent.id() else {
            return Ok(if kind == association {
                Resolved::Absent
            } else {
                Resolved::Collection(Vec::new())
            });
        };

        let fk = format!("{}_id", parent.kind());
        let want = Value::String(parent_id);
        let members = self.rows_where(&kind, |e| e.matches(&fk, &want));
        if kind == association {
            Ok(Resolved::from_option(members.into_iter().next()))
        } else {
            Ok(Resolved::Collection(members))
        }
    }
}
