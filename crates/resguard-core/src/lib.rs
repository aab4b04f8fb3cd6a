//! resguard core: declarative resource loading and authorization for request handlers.
//!
//! Handlers register rules once at startup ("load this resource", "authorize
//! it", "load and authorize", "skip authorization"). At request time the
//! [`pipeline::RequestPipeline`] replays those rules against the action, path
//! parameters and already-bound instances to decide which entity to load and
//! which capability to check.
//!
//! Persistence and policy evaluation are collaborators behind the
//! [`store::DataStore`] and [`policy::Policy`] traits; this crate carries no
//! runtime or transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `ResguardError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod attributes;
pub mod authorize;
pub mod context;
pub mod entity;
pub mod error;
pub mod handler;
pub mod naming;
pub mod pipeline;
pub mod policy;
pub mod resolve;
pub mod rules;
pub mod store;

/// Shared result type.
pub use error::{Result, ResguardError};

pub use context::{Request, ResolutionContext};
pub use entity::{Attributes, Entity, EntitySchema, Resolved};
pub use handler::HandlerDef;
pub use pipeline::RequestPipeline;
pub use policy::{Decision, Policy, Target};
pub use rules::{ActionFilter, Rule, RuleKind, RuleOptions};
pub use store::DataStore;
