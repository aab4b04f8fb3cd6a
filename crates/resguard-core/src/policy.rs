//! Policy collaborator interface.
//!
//! The engine decides *which* capability to check on *which* target; the
//! policy decides whether the current viewer holds it.

use std::fmt;

use crate::entity::{Attributes, Entity};
use crate::error::Result;

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// What a capability is checked against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A loaded (or freshly constructed) entity.
    Instance(&'a Entity),
    /// A bound collection of `kind`.
    Collection { kind: &'a str, entities: &'a [Entity] },
    /// The bare type, when nothing has been bound yet.
    Type(&'a str),
}

impl Target<'_> {
    pub fn kind(&self) -> &str {
        match self {
            Target::Instance(e) => e.kind(),
            Target::Collection { kind, .. } | Target::Type(kind) => kind,
        }
    }
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Instance(e) => write!(f, "{}", e.label()),
            Target::Collection { kind, entities } => write!(f, "{kind}[{}]", entities.len()),
            Target::Type(kind) => write!(f, "{kind}"),
        }
    }
}

pub trait Policy {
    fn check(&self, target: Target<'_>, capability: &str) -> Result<Decision>;

    /// Narrow `candidates` of `kind` to what the current viewer may see.
    fn scope(&self, kind: &str, candidates: Vec<Entity>) -> Result<Vec<Entity>>;

    /// Sanitized attributes for `resource` under `action`, or `None` when the
    /// policy does not manage attributes for this resource.
    fn permitted_attributes(&self, _resource: &Entity, _action: &str) -> Option<Attributes> {
        None
    }
}
