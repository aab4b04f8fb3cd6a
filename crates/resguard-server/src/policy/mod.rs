//! Static allowlist policy.
//!
//! `PolicyRules` is compiled once at startup; `RequestPolicy` borrows it
//! together with the request body for the lifetime of one request.

pub mod allowlist;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use resguard_core::context::INDEX;
use resguard_core::error::Result;
use resguard_core::{Attributes, Decision, Entity, Policy, Target};

use crate::config::PolicyConfig;

use allowlist::{compile_rules, is_allowed, CapabilityRule};

/// Compiled policy configuration. Construct once at startup, then share.
#[derive(Debug, Clone)]
pub struct PolicyRules {
    allow: Vec<CapabilityRule>,
    permitted: BTreeMap<String, BTreeSet<String>>,
}

impl PolicyRules {
    pub fn new(cfg: &PolicyConfig) -> Result<Self> {
        Ok(Self {
            allow: compile_rules(&cfg.allow)?,
            permitted: cfg
                .permitted
                .iter()
                .map(|(kind, fields)| (kind.clone(), fields.iter().cloned().collect()))
                .collect(),
        })
    }

    pub fn allows(&self, kind: &str, capability: &str) -> bool {
        is_allowed(&self.allow, kind, capability)
    }

    /// Policy view for one request.
    pub fn for_request<'a>(&'a self, body: &'a Attributes) -> RequestPolicy<'a> {
        RequestPolicy { rules: self, body }
    }
}

pub struct RequestPolicy<'a> {
    rules: &'a PolicyRules,
    body: &'a Attributes,
}

impl Policy for RequestPolicy<'_> {
    fn check(&self, target: Target<'_>, capability: &str) -> Result<Decision> {
        if self.rules.allows(target.kind(), capability) {
            Ok(Decision::Allow)
        } else {
            Ok(Decision::Deny)
        }
    }

    /// Everything when `kind:index` is allowed, nothing otherwise.
    fn scope(&self, kind: &str, candidates: Vec<Entity>) -> Result<Vec<Entity>> {
        if self.rules.allows(kind, INDEX) {
            Ok(candidates)
        } else {
            Ok(Vec::new())
        }
    }

    /// Body fields listed for the resource's kind. Accepts the fields either
    /// nested under the kind (`{"invoice": {...}}`) or at the top level.
    fn permitted_attributes(&self, resource: &Entity, _action: &str) -> Option<Attributes> {
        let fields = self.rules.permitted.get(resource.kind())?;
        let source = match self.body.get(resource.kind()) {
            Some(Value::Object(nested)) => nested,
            _ => self.body,
        };
        Some(
            source
                .iter()
                .filter(|(k, _)| fields.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}
