//! Rule registry: declarative load/authorize rules and their action filters.

pub mod filter;
pub mod rule;
pub mod store;

pub use filter::ActionFilter;
pub use rule::{ResourceArg, Rule, RuleKind, RuleOptions};
pub use store::RuleStore;
