use axum::{Router, routing::get};

pub mod auth;
pub mod orders;
pub mod products;
pub mod system;

/// Routes that require no credential: registration, login, catalog browsing.
pub fn public_router() -> Router {
    Router::new()
        .merge(auth::public_router())
        .merge(products::public_router())
}

/// Routes behind the bearer-credential boundary.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(auth::protected_router())
        .merge(orders::router())
        .merge(products::protected_router())
}
