use std::collections::BTreeSet;

use serde::Deserialize;

use super::filter;

/// What a rule does when it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Load,
    Authorize,
    LoadAndAuthorize,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Load => "load",
            RuleKind::Authorize => "authorize",
            RuleKind::LoadAndAuthorize => "load_and_authorize",
        }
    }

    pub fn loads(self) -> bool {
        matches!(self, RuleKind::Load | RuleKind::LoadAndAuthorize)
    }

    pub fn authorizes(self) -> bool {
        matches!(self, RuleKind::Authorize | RuleKind::LoadAndAuthorize)
    }
}

/// Scoping options attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOptions {
    /// Context variable to bind instead of the resource name.
    #[serde(default)]
    pub instance_name: Option<String>,
    /// Parent resources to nest the lookup under, in priority order.
    #[serde(default)]
    pub through: Vec<String>,
    /// Parent has exactly one of this resource.
    #[serde(default)]
    pub singleton: bool,
    #[serde(default = "default_find_by")]
    pub find_by: String,
    /// Path parameter carrying the id (default `{resource}_id`, then `id`).
    #[serde(default)]
    pub id_param: Option<String>,
    #[serde(default)]
    pub only: Option<BTreeSet<String>>,
    #[serde(default)]
    pub except: Option<BTreeSet<String>>,
}

fn default_find_by() -> String {
    "id".into()
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            instance_name: None,
            through: Vec::new(),
            singleton: false,
            find_by: default_find_by(),
            id_param: None,
            only: None,
            except: None,
        }
    }
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    pub fn through<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.through = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn find_by(mut self, field: impl Into<String>) -> Self {
        self.find_by = field.into();
        self
    }

    pub fn id_param(mut self, param: impl Into<String>) -> Self {
        self.id_param = Some(param.into());
        self
    }

    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    pub fn except<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    pub fn applies_to(&self, action: &str) -> bool {
        filter::applies(self.only.as_ref(), self.except.as_ref(), action)
    }
}

/// First registration argument: a resource name, a full options value, or nothing.
#[derive(Debug, Clone)]
pub enum ResourceArg {
    Name(String),
    Options(RuleOptions),
    Unset,
}

impl From<&str> for ResourceArg {
    fn from(name: &str) -> Self {
        ResourceArg::Name(name.to_string())
    }
}

impl From<String> for ResourceArg {
    fn from(name: String) -> Self {
        ResourceArg::Name(name)
    }
}

impl From<Option<String>> for ResourceArg {
    fn from(name: Option<String>) -> Self {
        name.map_or(ResourceArg::Unset, ResourceArg::Name)
    }
}

impl From<RuleOptions> for ResourceArg {
    fn from(options: RuleOptions) -> Self {
        ResourceArg::Options(options)
    }
}

impl From<()> for ResourceArg {
    fn from(_: ()) -> Self {
        ResourceArg::Unset
    }
}

/// A registered declaration. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    pub resource_name: Option<String>,
    pub options: RuleOptions,
}

impl Rule {
    /// Normalize the registration arguments. An options value in first position
    /// replaces `options` entirely and leaves the name unset.
    pub fn new(kind: RuleKind, arg: impl Into<ResourceArg>, options: RuleOptions) -> Self {
        let (resource_name, options) = match arg.into() {
            ResourceArg::Options(opts) => (None, opts),
            ResourceArg::Name(name) => (Some(name), options),
            ResourceArg::Unset => (None, options),
        };
        Self {
            kind,
            resource_name,
            options,
        }
    }

    /// True when `resource` (singular) is one of this rule's `through` parents.
    pub fn goes_through(&self, resource: &str) -> bool {
        self.options
            .through
            .iter()
            .any(|parent| crate::naming::inflect(parent, false) == resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_in_first_position_replace_second() {
        let rule = Rule::new(
            RuleKind::Load,
            RuleOptions::new().find_by("slug"),
            RuleOptions::new().singleton(),
        );
        assert_eq!(rule.resource_name, None);
        assert_eq!(rule.options.find_by, "slug");
        assert!(!rule.options.singleton);
    }

    #[test]
    fn name_in_first_position_keeps_options() {
        let rule = Rule::new(RuleKind::Authorize, "account", RuleOptions::new().singleton());
        assert_eq!(rule.resource_name.as_deref(), Some("account"));
        assert!(rule.options.singleton);
    }

    #[test]
    fn unset_first_argument_uses_second_as_options() {
        let rule = Rule::new(RuleKind::LoadAndAuthorize, (), RuleOptions::new().id_param("key"));
        assert_eq!(rule.resource_name, None);
        assert_eq!(rule.options.id_param.as_deref(), Some("key"));
        assert_eq!(rule.options.find_by, "id");
    }

    #[test]
    fn through_matches_singular_and_plural_parents() {
        let rule = Rule::new(RuleKind::Load, (), RuleOptions::new().through(["accounts", "project"]));
        assert!(rule.goes_through("account"));
        assert!(rule.goes_through("project"));
        assert!(!rule.goes_through("invoice"));
    }
}
