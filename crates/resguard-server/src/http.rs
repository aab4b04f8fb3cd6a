//! Axum router wiring (HTTP -> pipeline).

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};

use resguard_core::error::{ClientCode, ResguardError};
use resguard_core::Attributes;

use crate::app_state::{AppState, Resolution};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/*path", any(resolve))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn resolve(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Json<Resolution>, ApiError> {
    let body = decode_body(&body)?;
    let resolution = state.resolve(&method, &path, body).map_err(|e| {
        tracing::warn!(%method, path = %path, error = %e, "request rejected");
        e
    })?;
    Ok(Json(resolution))
}

/// Empty bodies are an empty object; anything else must be a JSON object.
pub fn decode_body(raw: &[u8]) -> Result<Attributes, ResguardError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Attributes::new());
    }
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ResguardError::BadRequest("request body must be a JSON object".into())),
        Err(e) => Err(ResguardError::BadRequest(format!("invalid json body: {e}"))),
    }
}

/// HTTP rendering of engine errors.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ResguardError);

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Forbidden => StatusCode::FORBIDDEN,
        ClientCode::Misconfigured | ClientCode::Unverified | ClientCode::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        (status_for(code), body).into_response()
    }
}
