//! Per-handler rule registry: ordered rules plus skip-authorization filters.

use super::filter::ActionFilter;
use super::rule::{ResourceArg, Rule, RuleKind, RuleOptions};

/// Ordered rules for one handler type. Registration order is execution order.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    skips: Vec<ActionFilter>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: RuleKind, arg: impl Into<ResourceArg>, options: RuleOptions) {
        self.rules.push(Rule::new(kind, arg, options));
    }

    /// Add a skip-authorization filter. Skips never resolve anything.
    pub fn register_skip(&mut self, filter: ActionFilter) {
        self.skips.push(filter);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn skips(&self) -> &[ActionFilter] {
        &self.skips
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when any registered rule lists `resource` in its `through` parents.
    pub fn is_through_target(&self, resource: &str) -> bool {
        self.rules.iter().any(|r| r.goes_through(resource))
    }
}
