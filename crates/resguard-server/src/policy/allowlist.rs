//! Capability allowlist compilation and matching.
//!
//! Entries are `kind:capability`; either side may be `*`.

use resguard_core::error::{Result, ResguardError};

/// Compiled allowlist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRule {
    pub kind: Option<String>,       // None => wildcard
    pub capability: Option<String>, // None => wildcard
}

pub fn compile_rules(raw: &[String]) -> Result<Vec<CapabilityRule>> {
    let mut out = Vec::with_capacity(raw.len());
    for s in raw {
        let (kind, cap) = s.split_once(':').ok_or_else(|| {
            ResguardError::BadRequest(format!("invalid policy.allow entry: {s} (expected kind:capability)"))
        })?;
        if kind.is_empty() || cap.is_empty() {
            return Err(ResguardError::BadRequest(format!(
                "invalid policy.allow entry: {s} (empty side)"
            )));
        }
        out.push(CapabilityRule {
            kind: wildcard(kind),
            capability: wildcard(cap),
        });
    }
    Ok(out)
}

fn wildcard(s: &str) -> Option<String> {
    if s == "*" {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn is_allowed(rules: &[CapabilityRule], kind: &str, capability: &str) -> bool {
    rules.iter().any(|r| {
        let kind_ok = r.kind.as_deref().map_or(true, |k| k == kind);
        let cap_ok = r.capability.as_deref().map_or(true, |c| c == capability);
        kind_ok && cap_ok
    })
}
