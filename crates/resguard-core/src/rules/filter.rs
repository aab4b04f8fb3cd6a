//! `only` / `except` applicability of a rule to the current action.

use std::collections::BTreeSet;

use serde::Deserialize;

/// Standalone action filter (used for skip-authorization entries).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionFilter {
    #[serde(default)]
    pub only: Option<BTreeSet<String>>,
    #[serde(default)]
    pub except: Option<BTreeSet<String>>,
}

impl ActionFilter {
    /// Applies to every action.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(actions.into_iter().map(Into::into).collect()),
            except: None,
        }
    }

    pub fn except<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: None,
            except: Some(actions.into_iter().map(Into::into).collect()),
        }
    }

    pub fn applies(&self, action: &str) -> bool {
        applies(self.only.as_ref(), self.except.as_ref(), action)
    }
}

/// `except` is checked first and wins when both lists name the action.
pub fn applies(
    only: Option<&BTreeSet<String>>,
    except: Option<&BTreeSet<String>>,
    action: &str,
) -> bool {
    if except.is_some_and(|set| set.contains(action)) {
        return false;
    }
    if only.is_some_and(|set| !set.contains(action)) {
        return false;
    }
    true
}
