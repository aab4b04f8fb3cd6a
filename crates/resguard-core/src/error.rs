//! Shared error type across resguard crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Requested entity (or a required parent) does not exist.
    NotFound,
    /// Denied by the policy collaborator.
    Forbidden,
    /// A rule references something that cannot be resolved.
    Misconfigured,
    /// Handler finished without authorizing or scoping.
    Unverified,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::Misconfigured => "MISCONFIGURED",
            ClientCode::Unverified => "UNVERIFIED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ResguardError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ResguardError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not authorized to {capability} {target}")]
    AuthorizationDenied { capability: String, target: String },
    #[error("misconfigured rule: {0}")]
    MisconfiguredRule(String),
    #[error("authorization not performed for {0}")]
    AuthorizationNotPerformed(String),
    #[error("policy scoping not performed for {0}")]
    PolicyScopingNotPerformed(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ResguardError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ResguardError::BadRequest(_) => ClientCode::BadRequest,
            ResguardError::NotFound(_) => ClientCode::NotFound,
            ResguardError::AuthorizationDenied { .. } => ClientCode::Forbidden,
            ResguardError::MisconfiguredRule(_) => ClientCode::Misconfigured,
            ResguardError::AuthorizationNotPerformed(_)
            | ResguardError::PolicyScopingNotPerformed(_) => ClientCode::Unverified,
            ResguardError::Internal(_) => ClientCode::Internal,
        }
    }

    pub(crate) fn unknown_type(kind: &str) -> Self {
        ResguardError::MisconfiguredRule(format!("unknown resource type `{kind}`"))
    }
}
