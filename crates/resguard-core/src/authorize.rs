//! Capability selection and policy invocation for `authorize` rules.

use crate::context::{ResolutionContext, SHOW};
use crate::entity::Resolved;
use crate::error::{Result, ResguardError};
use crate::handler::HandlerDef;
use crate::policy::{Decision, Policy, Target};
use crate::rules::Rule;

pub struct AuthorizationDispatcher<'h> {
    handler: &'h HandlerDef,
}

impl<'h> AuthorizationDispatcher<'h> {
    pub fn new(handler: &'h HandlerDef) -> Self {
        Self { handler }
    }

    /// Authorize the instance bound for `rule`, or its bare type when nothing is bound.
    ///
    /// Bound instances of parent resources (named in any rule's `through`) and
    /// of secondary resources are only checked for `show`. A bare type is
    /// always checked against the current action.
    pub fn authorize(&self, rule: &Rule, ctx: &mut ResolutionContext<'_>) -> Result<()> {
        let primary = self.handler.resource_name();
        let resource = rule.resource_name.clone().unwrap_or_else(|| primary.clone());
        let instance = rule
            .options
            .instance_name
            .clone()
            .unwrap_or_else(|| resource.clone());

        let natural = if self.handler.rules().is_through_target(&resource) || resource != primary {
            SHOW
        } else {
            ctx.action()
        };

        let policy = ctx.policy();
        match ctx.instance(&instance) {
            Some(Resolved::Single(entity)) => enforce(policy, Target::Instance(entity), natural)?,
            Some(Resolved::Collection(entities)) => enforce(
                policy,
                Target::Collection {
                    kind: &resource,
                    entities,
                },
                natural,
            )?,
            None | Some(Resolved::Absent) => {
                if ctx.store().schema(&resource).is_none() {
                    return Err(ResguardError::unknown_type(&resource));
                }
                enforce(policy, Target::Type(&resource), ctx.action())?
            }
        }

        ctx.mark_authorized();
        Ok(())
    }
}

/// Ask the policy; a deny becomes `AuthorizationDenied`.
pub(crate) fn enforce(policy: &dyn Policy, target: Target<'_>, capability: &str) -> Result<()> {
    let decision = policy.check(target, capability)?;
    tracing::debug!(subject = %target, capability, ?decision, "capability check");
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(ResguardError::AuthorizationDenied {
            capability: capability.to_string(),
            target: target.to_string(),
        }),
    }
}
