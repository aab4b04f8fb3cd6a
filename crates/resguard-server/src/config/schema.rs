//! Config schema (`resguard.yaml`).
//!
//! Every section denies unknown fields; `validate()` checks cross-references
//! between types, handlers, policy and seed rows.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;

use serde::Deserialize;
use serde_json::{Map, Value};

use resguard_core::error::{Result, ResguardError};
use resguard_core::naming::singularize;
use resguard_core::{ActionFilter, HandlerDef, RuleKind, RuleOptions};

use crate::policy::allowlist::compile_rules;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    /// kind -> field names
    #[serde(default)]
    pub types: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// kind -> rows
    #[serde(default)]
    pub seed: BTreeMap<String, Vec<Map<String, Value>>>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ResguardError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        if self.handlers.is_empty() {
            return Err(ResguardError::BadRequest("handlers must not be empty".into()));
        }

        self.server.validate()?;

        let mut seen = BTreeSet::new();
        for h in &self.handlers {
            if h.collection.is_empty() {
                return Err(ResguardError::BadRequest("handler collection must not be empty".into()));
            }
            if !seen.insert(h.collection.as_str()) {
                return Err(ResguardError::BadRequest(format!(
                    "duplicate handler collection: {}",
                    h.collection
                )));
            }
            h.validate(|kind| self.types.contains_key(kind))?;
        }

        for (kind, rows) in &self.seed {
            self.require_type(kind, "seed")?;
            if rows.iter().any(|r| !r.contains_key("id")) {
                return Err(ResguardError::BadRequest(format!("seed.{kind}: every row needs an id")));
            }
        }

        for kind in self.policy.permitted.keys() {
            self.require_type(kind, "policy.permitted")?;
        }
        compile_rules(&self.policy.allow)?;

        Ok(())
    }

    fn require_type(&self, kind: &str, section: &str) -> Result<()> {
        if self.types.contains_key(kind) {
            Ok(())
        } else {
            Err(ResguardError::BadRequest(format!("{section} references undeclared type: {kind}")))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|_| {
            ResguardError::BadRequest(format!("server.listen must be a socket address: {}", self.listen))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    /// Plural collection name (`invoices`).
    pub collection: String,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default)]
    pub skip_authorization: Vec<ActionFilter>,
}

impl HandlerConfig {
    fn validate(&self, declared: impl Fn(&str) -> bool) -> Result<()> {
        let primary = singularize(&self.collection);
        for (i, rule) in self.rules.iter().enumerate() {
            let at = format!("handlers[{}].rules[{i}]", self.collection);
            let resource = rule.resource.clone().unwrap_or_else(|| primary.clone());
            if !declared(&resource) {
                return Err(ResguardError::BadRequest(format!(
                    "{at}: undeclared resource type {resource}"
                )));
            }
            for parent in &rule.options.through {
                if !declared(&singularize(parent)) {
                    return Err(ResguardError::BadRequest(format!(
                        "{at}: undeclared through parent {parent}"
                    )));
                }
            }
            if rule.options.find_by.is_empty() {
                return Err(ResguardError::BadRequest(format!("{at}: find_by must not be empty")));
            }
        }
        Ok(())
    }

    /// Register the configured rules on a fresh handler definition.
    pub fn build(&self) -> HandlerDef {
        let mut handler = HandlerDef::new(self.collection.clone());
        for rule in &self.rules {
            let name = rule.resource.clone();
            let options = rule.options.clone();
            match rule.kind {
                RuleKind::Load => handler.register_load(name, options),
                RuleKind::Authorize => handler.register_authorize(name, options),
                RuleKind::LoadAndAuthorize => handler.register_load_and_authorize(name, options),
            };
        }
        for skip in &self.skip_authorization {
            handler.register_skip(skip.clone());
        }
        handler
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub kind: RuleKind,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub options: RuleOptions,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// `kind:capability` entries, `*` allowed on either side.
    #[serde(default)]
    pub allow: Vec<String>,
    /// kind -> fields accepted from the request body.
    #[serde(default)]
    pub permitted: BTreeMap<String, Vec<String>>,
}
