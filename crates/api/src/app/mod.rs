//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: backend wiring (in-memory vs Postgres store, order manager)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use pasar_auth::Hs256Jwt;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (entrypoint used by tests).
pub async fn build_app(jwt_secret: String) -> Router {
    let (router, _services) = build_app_with_services(jwt_secret).await;
    router
}

/// Build the router and hand back the service wiring; the binary keeps the
/// services so it can release the storage backend after shutdown.
pub async fn build_app_with_services(jwt_secret: String) -> (Router, Arc<AppServices>) {
    let jwt = Arc::new(Hs256Jwt::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt: jwt.clone() };

    let services = Arc::new(services::build_services(jwt).await);

    // Public routes: registration, login, catalog browsing.
    let public = routes::public_router().layer(Extension(services.clone()));

    // Protected routes: credential boundary first, then handler extensions.
    let protected = routes::protected_router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let router = Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
        .layer(ServiceBuilder::new());

    (router, services)
}
