use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use pasar_auth::JwtValidator;

use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = {
        let Some(token) = extract_bearer(req.headers()) else {
            return credential_rejected();
        };
        match state.jwt.validate(token, Utc::now()) {
            Ok(claims) => claims,
            Err(_) => return credential_rejected(),
        }
    };

    req.extensions_mut()
        .insert(AuthContext::new(claims.sub, claims.kind));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// The credential boundary reports 422 for missing or malformed tokens; this
/// is the wire contract clients already depend on.
fn credential_rejected() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({
            "message": "Unauthorized! Please input the token you obtained before!"
        })),
    )
        .into_response()
}
