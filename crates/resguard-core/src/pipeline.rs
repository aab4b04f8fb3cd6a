//! Per-request orchestration: filter each rule, then load and/or authorize.

use crate::authorize::AuthorizationDispatcher;
use crate::context::ResolutionContext;
use crate::error::Result;
use crate::handler::HandlerDef;
use crate::resolve::ResourceResolver;

pub struct RequestPipeline<'h> {
    handler: &'h HandlerDef,
    resolver: ResourceResolver<'h>,
    dispatcher: AuthorizationDispatcher<'h>,
}

impl<'h> RequestPipeline<'h> {
    pub fn new(handler: &'h HandlerDef) -> Self {
        Self {
            handler,
            resolver: ResourceResolver::new(handler),
            dispatcher: AuthorizationDispatcher::new(handler),
        }
    }

    /// Run every applicable rule in registration order, then the skip filters.
    /// The first error aborts the request.
    pub fn run(&self, ctx: &mut ResolutionContext<'_>) -> Result<()> {
        let span = tracing::debug_span!(
            "resolve",
            handler = %self.handler.collection(),
            action = %ctx.action()
        );
        let _guard = span.enter();

        for (index, rule) in self.handler.rules().iter().enumerate() {
            let resource = rule.resource_name.as_deref().unwrap_or("<primary>");
            if !rule.options.applies_to(ctx.action()) {
                tracing::trace!(index, kind = rule.kind.as_str(), resource, "rule skipped");
                continue;
            }
            tracing::debug!(index, kind = rule.kind.as_str(), resource, "rule");

            if rule.kind.loads() {
                self.resolver.load(rule, ctx)?;
            }
            if rule.kind.authorizes() {
                self.dispatcher.authorize(rule, ctx)?;
            }
        }

        if self
            .handler
            .rules()
            .skips()
            .iter()
            .any(|f| f.applies(ctx.action()))
        {
            tracing::debug!("authorization skipped");
            ctx.skip_authorization();
        }

        Ok(())
    }

    /// Run, then require that authorization and (for `index`) scoping happened.
    pub fn run_verified(&self, ctx: &mut ResolutionContext<'_>) -> Result<()> {
        self.run(ctx)?;
        ctx.verify_authorized()?;
        ctx.verify_policy_scoped()
    }
}
