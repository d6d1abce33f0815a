use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use pasar_auth::AccountKind;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

/// Buyers register via `/signup` + `/signin`, sellers via `/register` +
/// `/login`; the two populations are separate account spaces.
pub fn public_router() -> Router {
    Router::new()
        .route("/signup", post(buyer_signup))
        .route("/signin", post(buyer_login))
        .route("/register", post(seller_signup))
        .route("/login", post(seller_login))
}

pub fn protected_router() -> Router {
    Router::new().route("/profile", get(profile))
}

pub async fn buyer_signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> axum::response::Response {
    signup(services, AccountKind::Buyer, body).await
}

pub async fn seller_signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> axum::response::Response {
    signup(services, AccountKind::Seller, body).await
}

async fn signup(
    services: Arc<AppServices>,
    kind: AccountKind,
    body: dto::SignupRequest,
) -> axum::response::Response {
    match services.signup(kind, body.into()).await {
        Ok(_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "Account Successfully Registered!" })),
        )
            .into_response(),
        Err(e) => errors::auth_flow_error_to_response(e),
    }
}

pub async fn buyer_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    login(services, AccountKind::Buyer, body).await
}

pub async fn seller_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    login(services, AccountKind::Seller, body).await
}

async fn login(
    services: Arc<AppServices>,
    kind: AccountKind,
    body: dto::LoginRequest,
) -> axum::response::Response {
    match services.login(kind, &body.email, &body.password).await {
        Ok((account, token)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Login Success!",
                "email": account.email,
                "token": token,
            })),
        )
            .into_response(),
        Err(e) => errors::auth_flow_error_to_response(e),
    }
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    match services.profile(auth.user_id()).await {
        Ok(Some(account)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Success",
                "data": dto::account_to_json(&account),
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "Account not found"),
        Err(e) => errors::storage_failure(e),
    }
}
