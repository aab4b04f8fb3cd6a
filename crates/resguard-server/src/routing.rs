//! Conventional resource routing.
//!
//! Maps `(method, path)` onto a handler collection, an action name and the
//! path parameters the pipeline reads. Parent segments (`/accounts/1/...`)
//! become `account_id` style parameters; the member id becomes `id`.

use std::collections::{BTreeMap, BTreeSet};

use axum::http::Method;

use resguard_core::error::{Result, ResguardError};
use resguard_core::naming::singularize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub collection: String,
    pub action: String,
    pub path_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceRoutes {
    collections: BTreeSet<String>,
}

impl ResourceRoutes {
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: collections.into_iter().map(Into::into).collect(),
        }
    }

    pub fn knows(&self, collection: &str) -> bool {
        self.collections.contains(collection)
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Result<Route> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let no_route = || ResguardError::NotFound(format!("no route for {method} /{}", segments.join("/")));

        let mut path_params = BTreeMap::new();
        let mut i = 0;
        loop {
            let Some(&collection) = segments.get(i) else {
                return Err(no_route());
            };
            if !self.knows(collection) {
                return Err(no_route());
            }
            let rest = &segments[i + 1..];

            let action = match rest {
                [] => match *method {
                    Method::GET => "index".to_string(),
                    Method::POST => "create".to_string(),
                    _ => return Err(not_allowed(method, collection)),
                },
                ["new"] if *method == Method::GET => "new".to_string(),
                [id] => {
                    let action = match *method {
                        Method::GET => "show",
                        Method::PUT | Method::PATCH => "update",
                        Method::DELETE => "destroy",
                        _ => return Err(not_allowed(method, collection)),
                    };
                    path_params.insert("id".to_string(), id.to_string());
                    action.to_string()
                }
                [parent_id, next, ..] if self.knows(next) => {
                    path_params.insert(format!("{}_id", singularize(collection)), parent_id.to_string());
                    i += 2;
                    continue;
                }
                [id, verb] => {
                    path_params.insert("id".to_string(), id.to_string());
                    verb.to_string()
                }
                _ => return Err(no_route()),
            };

            return Ok(Route {
                collection: collection.to_string(),
                action,
                path_params,
            });
        }
    }
}

fn not_allowed(method: &Method, collection: &str) -> ResguardError {
    ResguardError::BadRequest(format!("method {method} not allowed on {collection}"))
}
