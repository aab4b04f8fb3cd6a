//! Data-store collaborator interface.
//!
//! The engine never persists anything; it only asks the store for schemas,
//! lookups, relation traversal and fresh unsaved instances.

use serde_json::Value;

use crate::entity::{Entity, EntitySchema, Resolved};
use crate::error::Result;

pub trait DataStore {
    /// Field registry for `kind`. `None` means the kind is unknown.
    fn schema(&self, kind: &str) -> Option<&EntitySchema>;

    /// Every entity of `kind` (input to policy scoping).
    fn all(&self, kind: &str) -> Result<Vec<Entity>>;

    fn find_by_id(&self, kind: &str, id: &str) -> Result<Option<Entity>>;

    /// First entity of `kind` matching every `(field, value)` condition.
    fn find_by(&self, kind: &str, conditions: &[(String, Value)]) -> Result<Option<Entity>>;

    /// Traverse `association` on `parent`. Singular association names yield
    /// `Single`/`Absent`, plural names yield `Collection`.
    fn query_relation(&self, parent: &Entity, association: &str) -> Result<Resolved>;

    /// Construct an unsaved entity of `kind`.
    fn new_entity(&self, kind: &str) -> Result<Entity> {
        Ok(Entity::new(kind))
    }
}
