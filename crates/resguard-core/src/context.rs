//! Per-request inputs and scratch space.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::entity::{Attributes, Entity, Resolved};
use crate::error::{Result, ResguardError};
use crate::handler::HandlerDef;
use crate::policy::Policy;
use crate::store::DataStore;

/// Lists the collection.
pub const INDEX: &str = "index";
/// Capability used for visibility checks.
pub const SHOW: &str = "show";
pub const CREATE: &str = "create";
pub const UPDATE: &str = "update";

/// The parts of an incoming request the engine reads.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub action: String,
    pub path_params: BTreeMap<String, String>,
    /// Decoded request body (input to parameter extractors and permitted attributes).
    pub body: Attributes,
}

impl Request {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    /// Replace the body. Non-object values are ignored.
    pub fn body(mut self, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.body = map;
        }
        self
    }

    pub fn path_param(&self, key: &str) -> Option<&str> {
        self.path_params.get(key).map(String::as_str)
    }
}

/// Mutable per-request state. Never shared across requests.
pub struct ResolutionContext<'a> {
    request: Request,
    instances: HashMap<String, Resolved>,
    store: &'a dyn DataStore,
    policy: &'a dyn Policy,
    authorized: bool,
    scoped: bool,
    skip_authorization: bool,
    skip_scope: bool,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(request: Request, store: &'a dyn DataStore, policy: &'a dyn Policy) -> Self {
        Self {
            request,
            instances: HashMap::new(),
            store,
            policy,
            authorized: false,
            scoped: false,
            skip_authorization: false,
            skip_scope: false,
        }
    }

    /// Seed an instance before the pipeline runs (e.g. loaded by an outer layer).
    pub fn with_instance(mut self, name: impl Into<String>, value: Resolved) -> Self {
        self.bind(name, value);
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn action(&self) -> &str {
        &self.request.action
    }

    pub fn path_param(&self, key: &str) -> Option<&str> {
        self.request.path_param(key)
    }

    pub fn store(&self) -> &'a dyn DataStore {
        self.store
    }

    pub fn policy(&self) -> &'a dyn Policy {
        self.policy
    }

    /// Bind `value` under `name`; the last write wins.
    pub fn bind(&mut self, name: impl Into<String>, value: Resolved) {
        self.instances.insert(name.into(), value);
    }

    pub fn instance(&self, name: &str) -> Option<&Resolved> {
        self.instances.get(name)
    }

    /// A bound single entity; collections and absent values don't count.
    pub fn single(&self, name: &str) -> Option<&Entity> {
        self.instances.get(name).and_then(Resolved::as_single)
    }

    pub fn instances(&self) -> &HashMap<String, Resolved> {
        &self.instances
    }

    pub fn into_instances(self) -> HashMap<String, Resolved> {
        self.instances
    }

    /// The handler's primary instance, if bound under its resource name.
    pub fn resource_instance(&self, handler: &HandlerDef) -> Option<&Entity> {
        self.single(&handler.resource_name())
    }

    pub(crate) fn mark_authorized(&mut self) {
        self.authorized = true;
    }

    pub(crate) fn mark_scoped(&mut self) {
        self.scoped = true;
    }

    /// Record that authorization (and, for `index`, scoping) is not required.
    pub(crate) fn skip_authorization(&mut self) {
        if self.action() == INDEX {
            self.skip_scope = true;
        }
        self.skip_authorization = true;
    }

    pub fn authorization_performed(&self) -> bool {
        self.authorized
    }

    pub fn policy_scoped(&self) -> bool {
        self.scoped
    }

    pub fn authorization_skipped(&self) -> bool {
        self.skip_authorization
    }

    /// Fails unless a capability check ran or authorization was skipped.
    pub fn verify_authorized(&self) -> Result<()> {
        if self.authorized || self.skip_authorization {
            return Ok(());
        }
        Err(ResguardError::AuthorizationNotPerformed(self.action().to_string()))
    }

    /// For `index`, fails unless a policy scope was applied or skipped.
    pub fn verify_policy_scoped(&self) -> Result<()> {
        if self.action() != INDEX || self.scoped || self.skip_scope {
            return Ok(());
        }
        Err(ResguardError::PolicyScopingNotPerformed(self.action().to_string()))
    }
}
