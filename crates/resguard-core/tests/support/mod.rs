//! In-test collaborators shared by the behavior suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use resguard_core::naming::singularize;
use resguard_core::{
    Attributes, DataStore, Decision, Entity, EntitySchema, Policy, Resolved, Result, Target,
};

#[derive(Default)]
pub struct FakeStore {
    schemas: HashMap<String, EntitySchema>,
    rows: Vec<Entity>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, kind: &str, fields: &[&str]) -> Self {
        self.schemas
            .insert(kind.to_string(), EntitySchema::new(kind, fields.iter().copied()));
        self
    }

    pub fn with_row(mut self, kind: &str, row: Value) -> Self {
        let Value::Object(fields) = row else {
            panic!("row must be an object");
        };
        self.rows.push(Entity::persisted(kind, fields));
        self
    }

    pub fn row(&self, kind: &str, id: &str) -> Entity {
        self.find_by_id(kind, id).unwrap().expect("row exists")
    }

    /// account(1, 2), invoice(10, 11 under account 1; 20 under account 2),
    /// user(5), membership(account 1 x user 5), profile(user 5).
    pub fn billing() -> Self {
        Self::new()
            .with_type("account", &["id", "name"])
            .with_type("invoice", &["id", "account_id", "number", "amount", "note", "hidden"])
            .with_type("project", &["id", "account_id", "title"])
            .with_type("user", &["id", "email"])
            .with_type("membership", &["id", "account_id", "user_id", "role"])
            .with_type("profile", &["id", "user_id", "bio"])
            .with_row("account", serde_json::json!({ "id": "1", "name": "Acme" }))
            .with_row("account", serde_json::json!({ "id": "2", "name": "Globex" }))
            .with_row(
                "invoice",
                serde_json::json!({ "id": "10", "account_id": "1", "number": "INV-10", "amount": 100 }),
            )
            .with_row(
                "invoice",
                serde_json::json!({ "id": "11", "account_id": "1", "number": "INV-11", "amount": 5, "hidden": true }),
            )
            .with_row(
                "invoice",
                serde_json::json!({ "id": "20", "account_id": "2", "number": "INV-20", "amount": 7 }),
            )
            .with_row("project", serde_json::json!({ "id": "3", "account_id": "1", "title": "Apollo" }))
            .with_row("project", serde_json::json!({ "id": "4", "account_id": "1", "title": "Gemini" }))
            .with_row("user", serde_json::json!({ "id": "5", "email": "ada@example.com" }))
            .with_row(
                "membership",
                serde_json::json!({ "id": "7", "account_id": "2", "user_id": "5", "role": "viewer" }),
            )
            .with_row(
                "membership",
                serde_json::json!({ "id": "8", "account_id": "1", "user_id": "5", "role": "owner" }),
            )
            .with_row("profile", serde_json::json!({ "id": "9", "user_id": "5", "bio": "hi" }))
    }
}

impl DataStore for FakeStore {
    fn schema(&self, kind: &str) -> Option<&EntitySchema> {
        self.schemas.get(kind)
    }

    fn all(&self, kind: &str) -> Result<Vec<Entity>> {
        Ok(self.rows.iter().filter(|e| e.kind() == kind).cloned().collect())
    }

    fn find_by_id(&self, kind: &str, id: &str) -> Result<Option<Entity>> {
        self.find_by(kind, &[("id".to_string(), Value::String(id.to_string()))])
    }

    fn find_by(&self, kind: &str, conditions: &[(String, Value)]) -> Result<Option<Entity>> {
        Ok(self
            .rows
            .iter()
            .find(|e| e.kind() == kind && conditions.iter().all(|(f, v)| e.matches(f, v)))
            .cloned())
    }

    fn query_relation(&self, parent: &Entity, association: &str) -> Result<Resolved> {
        let kind = singularize(association);
        let fk = format!("{}_id", parent.kind());
        let pid = Value::String(parent.id().unwrap_or_default());
        let members: Vec<Entity> = self
            .rows
            .iter()
            .filter(|e| e.kind() == kind && e.matches(&fk, &pid))
            .cloned()
            .collect();
        if kind == association {
            Ok(Resolved::from_option(members.into_iter().next()))
        } else {
            Ok(Resolved::Collection(members))
        }
    }
}

/// Allows everything except the configured capabilities and records every call.
#[derive(Default)]
pub struct RecordingPolicy {
    pub checks: RefCell<Vec<(String, String)>>,
    pub scopes: RefCell<Vec<String>>,
    denied: Vec<String>,
    permitted: Option<Attributes>,
}

impl RecordingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying(mut self, capability: &str) -> Self {
        self.denied.push(capability.to_string());
        self
    }

    pub fn permitting(mut self, attributes: Value) -> Self {
        let Value::Object(map) = attributes else {
            panic!("permitted attributes must be an object");
        };
        self.permitted = Some(map);
        self
    }

    pub fn checks(&self) -> Vec<(String, String)> {
        self.checks.borrow().clone()
    }

    pub fn checked(&self, target: &str, capability: &str) -> bool {
        self.checks
            .borrow()
            .iter()
            .any(|(t, c)| t == target && c == capability)
    }
}

impl Policy for RecordingPolicy {
    fn check(&self, target: Target<'_>, capability: &str) -> Result<Decision> {
        self.checks
            .borrow_mut()
            .push((target.to_string(), capability.to_string()));
        if self.denied.iter().any(|c| c == capability) {
            Ok(Decision::Deny)
        } else {
            Ok(Decision::Allow)
        }
    }

    /// Hides rows flagged `hidden: true`.
    fn scope(&self, kind: &str, candidates: Vec<Entity>) -> Result<Vec<Entity>> {
        self.scopes.borrow_mut().push(kind.to_string());
        Ok(candidates
            .into_iter()
            .filter(|e| e.get("hidden") != Some(&Value::Bool(true)))
            .collect())
    }

    fn permitted_attributes(&self, _resource: &Entity, _action: &str) -> Option<Attributes> {
        self.permitted.clone()
    }
}

pub fn ids(resolved: &Resolved) -> Vec<String> {
    resolved
        .clone()
        .into_vec()
        .iter()
        .filter_map(Entity::id)
        .collect()
}
