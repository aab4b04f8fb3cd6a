//! Shared application state for the resguard server.
//!
//! Built once from a validated `ServerConfig`; cheap to clone into handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;

use resguard_core::error::{Result, ResguardError};
use resguard_core::{Attributes, HandlerDef, Request, RequestPipeline, Resolved, ResolutionContext};

use crate::config::ServerConfig;
use crate::policy::PolicyRules;
use crate::routing::ResourceRoutes;
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    store: MemoryStore,
    policy: PolicyRules,
    handlers: HashMap<String, Arc<HandlerDef>>,
    routes: ResourceRoutes,
}

/// What one request resolved to.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub collection: String,
    pub action: String,
    pub instances: BTreeMap<String, Resolved>,
}

impl AppState {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let store = MemoryStore::from_config(&cfg.types, &cfg.seed)?;
        let policy = PolicyRules::new(&cfg.policy)
            .map_err(|e| ResguardError::BadRequest(format!("policy compile failed: {e}")))?;

        let handlers: HashMap<_, _> = cfg
            .handlers
            .iter()
            .map(|h| (h.collection.clone(), Arc::new(h.build())))
            .collect();
        let routes = ResourceRoutes::new(handlers.keys().cloned());

        // allowlist entries naming undeclared types can never match
        for rule in &cfg.policy.allow {
            if let Some((kind, _)) = rule.split_once(':') {
                if kind != "*" && !cfg.types.contains_key(kind) {
                    tracing::warn!(rule = %rule, "policy.allow refers to undeclared type");
                }
            }
        }

        tracing::info!(
            handlers = handlers.len(),
            types = cfg.types.len(),
            "resguard state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                policy,
                handlers,
                routes,
            }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> &MemoryStore {
        &self.inner.store
    }

    pub fn handler(&self, collection: &str) -> Option<Arc<HandlerDef>> {
        self.inner.handlers.get(collection).cloned()
    }

    /// Route the request, run the verified pipeline and collect the bound instances.
    pub fn resolve(&self, method: &Method, path: &str, body: Attributes) -> Result<Resolution> {
        let route = self.inner.routes.resolve(method, path)?;
        let handler = self
            .handler(&route.collection)
            .ok_or_else(|| ResguardError::NotFound(format!("no handler for {}", route.collection)))?;

        let mut request = Request::new(route.action.clone());
        request.path_params = route.path_params;
        request.body = body;

        let policy_body = request.body.clone();
        let policy = self.inner.policy.for_request(&policy_body);
        let mut ctx = ResolutionContext::new(request, &self.inner.store, &policy);

        RequestPipeline::new(&handler).run_verified(&mut ctx)?;

        let instances: BTreeMap<_, _> = ctx.into_instances().into_iter().collect();
        tracing::debug!(
            collection = %route.collection,
            action = %route.action,
            bound = instances.len(),
            "request resolved"
        );

        Ok(Resolution {
            collection: route.collection,
            action: route.action,
            instances,
        })
    }
}
