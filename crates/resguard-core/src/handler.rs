//! Handler-type definitions: the collection a handler serves, its rules, and
//! its named parameter extractors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::Request;
use crate::entity::Attributes;
use crate::naming;
use crate::rules::{ActionFilter, ResourceArg, RuleKind, RuleOptions, RuleStore};

/// Named parameter extraction function (`create_params`, `invoice_params`, ...).
pub type ParamExtractor = Arc<dyn Fn(&Request) -> Attributes + Send + Sync>;

/// Built once at startup, then shared read-only across requests.
#[derive(Clone)]
pub struct HandlerDef {
    collection: String,
    rules: RuleStore,
    extractors: HashMap<String, ParamExtractor>,
}

impl HandlerDef {
    /// `collection` is the plural resource name the handler serves (`invoices`).
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            rules: RuleStore::new(),
            extractors: HashMap::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Singular name of the handler's primary resource.
    pub fn resource_name(&self) -> String {
        naming::inflect(&self.collection, false)
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn register_load(&mut self, arg: impl Into<ResourceArg>, options: RuleOptions) -> &mut Self {
        self.rules.register(RuleKind::Load, arg, options);
        self
    }

    pub fn register_authorize(
        &mut self,
        arg: impl Into<ResourceArg>,
        options: RuleOptions,
    ) -> &mut Self {
        self.rules.register(RuleKind::Authorize, arg, options);
        self
    }

    pub fn register_load_and_authorize(
        &mut self,
        arg: impl Into<ResourceArg>,
        options: RuleOptions,
    ) -> &mut Self {
        self.rules.register(RuleKind::LoadAndAuthorize, arg, options);
        self
    }

    pub fn register_skip(&mut self, filter: ActionFilter) -> &mut Self {
        self.rules.register_skip(filter);
        self
    }

    /// Register a named parameter extractor.
    pub fn params<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Request) -> Attributes + Send + Sync + 'static,
    {
        self.extractors.insert(name.into(), Arc::new(f));
        self
    }

    pub fn extractor(&self, name: &str) -> Option<&ParamExtractor> {
        self.extractors.get(name)
    }
}

impl fmt::Debug for HandlerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.extractors.keys().collect();
        names.sort();
        f.debug_struct("HandlerDef")
            .field("collection", &self.collection)
            .field("rules", &self.rules)
            .field("extractors", &names)
            .finish()
    }
}
