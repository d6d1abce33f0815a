use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(auth): Extension<AuthContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": auth.user_id().to_string(),
        "kind": auth.kind().as_str(),
    }))
}
