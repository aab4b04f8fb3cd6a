//! Attribute extraction for mutation actions.
//!
//! Sources, in priority order: the policy's permitted attributes, then the
//! first named parameter extractor (`{action}_params`, `{resource}_params`).
//! Path parameters naming a schema field fill in whatever is still missing.

use serde_json::Value;

use crate::context::ResolutionContext;
use crate::entity::{Attributes, Entity};
use crate::handler::HandlerDef;

/// Path parameter never copied into attributes.
const IDENTITY_PARAM: &str = "id";

pub struct AttributeExtractor<'h> {
    handler: &'h HandlerDef,
}

impl<'h> AttributeExtractor<'h> {
    pub fn new(handler: &'h HandlerDef) -> Self {
        Self { handler }
    }

    pub fn extract(&self, resource: &Entity, ctx: &ResolutionContext<'_>) -> Attributes {
        let action = ctx.action();
        let mut attributes = match ctx.policy().permitted_attributes(resource, action) {
            Some(permitted) => permitted,
            None => self.extracted_params(ctx),
        };

        if let Some(schema) = ctx.store().schema(resource.kind()) {
            for (key, value) in &ctx.request().path_params {
                if key == IDENTITY_PARAM || !schema.has_field(key) {
                    continue;
                }
                let present = attributes.get(key).is_some_and(|v| !v.is_null());
                if !present {
                    attributes.insert(key.clone(), Value::String(value.clone()));
                }
            }
        }

        attributes
    }

    /// Extract and assign onto `resource`.
    pub fn apply(&self, resource: &mut Entity, ctx: &ResolutionContext<'_>) {
        let attributes = self.extract(resource, ctx);
        tracing::trace!(resource = %resource.label(), fields = attributes.len(), "assigning attributes");
        resource.assign(attributes);
    }

    fn extracted_params(&self, ctx: &ResolutionContext<'_>) -> Attributes {
        let candidates = [
            format!("{}_params", ctx.action()),
            format!("{}_params", self.handler.resource_name()),
        ];
        candidates
            .iter()
            .find_map(|name| self.handler.extractor(name))
            .map(|f| f(ctx.request()))
            .unwrap_or_default()
    }
}
