//! Resource resolution: turn a `load` rule into a bound entity or collection.
//!
//! A rule is *primary* when it names the handler's own resource and
//! *secondary* otherwise. Secondary resources are looked up as single
//! entities and checked for `show`. Primary resources branch on the action
//! and on whether they are nested `through` parents.

use serde_json::Value;

use crate::attributes::AttributeExtractor;
use crate::authorize::enforce;
use crate::context::{ResolutionContext, CREATE, INDEX, SHOW, UPDATE};
use crate::entity::{Entity, Resolved};
use crate::error::{Result, ResguardError};
use crate::handler::HandlerDef;
use crate::naming::{humanize, inflect};
use crate::policy::Target;
use crate::rules::{Rule, RuleOptions};
use crate::store::DataStore;

/// Names and lookup keys derived for one rule on one request.
struct Lookup<'r> {
    resource: String,
    id_param: String,
    id: Option<String>,
    options: &'r RuleOptions,
}

impl Lookup<'_> {
    fn find_by(&self, id: &str) -> Vec<(String, Value)> {
        vec![(self.options.find_by.clone(), Value::String(id.to_string()))]
    }

    fn not_found(&self) -> ResguardError {
        ResguardError::NotFound(format!(
            "Couldn't find {} with {} == {}",
            humanize(&self.resource),
            self.id_param,
            self.id.as_deref().unwrap_or("nil")
        ))
    }
}

pub struct ResourceResolver<'h> {
    handler: &'h HandlerDef,
}

impl<'h> ResourceResolver<'h> {
    pub fn new(handler: &'h HandlerDef) -> Self {
        Self { handler }
    }

    /// Resolve `rule` and bind the result. Collections bind under the plural
    /// of the instance name.
    pub fn load(&self, rule: &Rule, ctx: &mut ResolutionContext<'_>) -> Result<()> {
        let primary = self.handler.resource_name();
        let options = &rule.options;
        let resource = rule.resource_name.clone().unwrap_or_else(|| primary.clone());
        let instance = options
            .instance_name
            .clone()
            .unwrap_or_else(|| resource.clone());
        let id_param = options
            .id_param
            .clone()
            .unwrap_or_else(|| format!("{resource}_id"));
        let id = ctx
            .path_param(&id_param)
            .or_else(|| ctx.path_param("id"))
            .map(str::to_string);

        if ctx.store().schema(&resource).is_none() {
            return Err(ResguardError::unknown_type(&resource));
        }

        let lookup = Lookup {
            resource,
            id_param,
            id,
            options,
        };

        let resolved = if lookup.resource != primary {
            tracing::debug!(resource = %lookup.resource, "resolving secondary resource");
            self.load_secondary(&lookup, ctx)?
        } else if options.through.is_empty() {
            tracing::debug!(resource = %lookup.resource, action = ctx.action(), "resolving direct resource");
            self.load_direct(&lookup, ctx)?
        } else {
            tracing::debug!(resource = %lookup.resource, through = ?options.through, "resolving nested resource");
            self.load_through(&lookup, ctx)?
        };

        if resolved.is_absent() {
            return Err(lookup.not_found());
        }

        let varname = if resolved.is_collection() {
            inflect(&instance, true)
        } else {
            instance
        };
        tracing::debug!(%varname, collection = resolved.is_collection(), "bound");
        ctx.bind(varname, resolved);
        Ok(())
    }

    fn load_secondary(&self, l: &Lookup<'_>, ctx: &mut ResolutionContext<'_>) -> Result<Resolved> {
        let store = ctx.store();
        let through = &l.options.through;

        let found = if through.is_empty() {
            match &l.id {
                Some(id) => store.find_by_id(&l.resource, id)?,
                None => None,
            }
        } else {
            let parent = through
                .iter()
                .find_map(|name| ctx.single(&inflect(name, false)))
                .ok_or_else(|| {
                    ResguardError::NotFound(format!(
                        "No valid parent instance found through {}",
                        through.join(", ")
                    ))
                })?;

            if l.options.singleton {
                store.query_relation(parent, &l.resource)?.into_first()
            } else {
                let mut members = store
                    .query_relation(parent, &inflect(&l.resource, true))?
                    .into_vec()
                    .into_iter();
                match &l.id {
                    Some(id) => members.find(|e| e.matches("id", &Value::String(id.clone()))),
                    None => members.next(),
                }
            }
        };

        let entity = found.ok_or_else(|| l.not_found())?;
        enforce(ctx.policy(), Target::Instance(&entity), SHOW)?;
        ctx.mark_authorized();
        Ok(Resolved::Single(entity))
    }

    fn load_direct(&self, l: &Lookup<'_>, ctx: &mut ResolutionContext<'_>) -> Result<Resolved> {
        let store = ctx.store();
        let action = ctx.action().to_string();

        match (action.as_str(), l.id.as_deref()) {
            (CREATE, Some(id)) => Ok(Resolved::from_option(
                store.find_by(&l.resource, &l.find_by(id))?,
            )),
            (CREATE, None) => self.build(&l.resource, ctx),
            (UPDATE, id) => {
                let found = match id {
                    Some(id) => store.find_by(&l.resource, &l.find_by(id))?,
                    None => None,
                };
                self.update(found, ctx)
            }
            (INDEX, _) => self.scope(&l.resource, store.all(&l.resource)?, ctx),
            (_, Some(id)) => Ok(Resolved::from_option(
                store.find_by(&l.resource, &l.find_by(id))?,
            )),
            (_, None) => self.scope(&l.resource, store.all(&l.resource)?, ctx),
        }
    }

    fn load_through(&self, l: &Lookup<'_>, ctx: &mut ResolutionContext<'_>) -> Result<Resolved> {
        let store = ctx.store();
        let action = ctx.action().to_string();
        let association = inflect(&l.resource, true);

        let parents: Vec<Entity> = l
            .options
            .through
            .iter()
            .filter_map(|name| ctx.single(&inflect(name, false)).cloned())
            .collect();
        let Some(parent) = parents.first() else {
            return Err(ResguardError::NotFound(format!(
                "No parent instance found for {}",
                l.resource
            )));
        };

        if l.options.singleton {
            if action == CREATE {
                return self.build(&l.resource, ctx);
            }
            return store.query_relation(parent, &l.resource);
        }

        if action == INDEX && l.id.is_none() {
            let members = store.query_relation(parent, &association)?.into_vec();
            return self.scope(&l.resource, members, ctx);
        }

        if let Some(id) = &l.id {
            let found = find_member(store, parent, &association, &l.options.find_by, id)?;
            if action == UPDATE {
                return self.update(found, ctx);
            }
            return Ok(Resolved::from_option(found));
        }

        if action == CREATE {
            return self.build(&l.resource, ctx);
        }

        if action == UPDATE {
            // Without an id there is nothing in the association to update.
            return self.update(None, ctx);
        }

        if parents.len() > 1 {
            // Join entity keyed by every parent at once. An unsaved parent
            // keeps a null key, which matches no row.
            let conditions: Vec<(String, Value)> = parents
                .iter()
                .map(|p| {
                    let key = p.id().map_or(Value::Null, Value::String);
                    (format!("{}_id", p.kind()), key)
                })
                .collect();
            return Ok(Resolved::from_option(store.find_by(&l.resource, &conditions)?));
        }

        self.scope(&l.resource, store.all(&l.resource)?, ctx)
    }

    /// Fresh entity with extracted attributes applied.
    fn build(&self, kind: &str, ctx: &ResolutionContext<'_>) -> Result<Resolved> {
        let mut entity = ctx.store().new_entity(kind)?;
        AttributeExtractor::new(self.handler).apply(&mut entity, ctx);
        Ok(Resolved::Single(entity))
    }

    /// Authorize a found entity for the current action, then assign attributes.
    /// A missing entity resolves to `Absent` without raising here.
    fn update(&self, found: Option<Entity>, ctx: &mut ResolutionContext<'_>) -> Result<Resolved> {
        let Some(mut entity) = found else {
            return Ok(Resolved::Absent);
        };
        enforce(ctx.policy(), Target::Instance(&entity), ctx.action())?;
        ctx.mark_authorized();
        AttributeExtractor::new(self.handler).apply(&mut entity, ctx);
        Ok(Resolved::Single(entity))
    }

    fn scope(
        &self,
        kind: &str,
        candidates: Vec<Entity>,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Resolved> {
        let visible = ctx.policy().scope(kind, candidates)?;
        ctx.mark_scoped();
        Ok(Resolved::Collection(visible))
    }
}

fn find_member(
    store: &dyn DataStore,
    parent: &Entity,
    association: &str,
    field: &str,
    id: &str,
) -> Result<Option<Entity>> {
    let want = Value::String(id.to_string());
    Ok(store
        .query_relation(parent, association)?
        .into_vec()
        .into_iter()
        .find(|e| e.matches(field, &want)))
}
