//! Consistent error responses.
//!
//! Expected domain outcomes keep their exact wire bodies (`"Insufficient
//! stock"`, `"Product not found"`, `"Order not found"`); storage faults are
//! logged with full detail and surfaced as an opaque 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use pasar_infra::{OrderFlowError, StoreError};

use crate::app::services::{AuthFlowError, CatalogFlowError};

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub fn order_flow_error_to_response(err: OrderFlowError) -> Response {
    match err {
        OrderFlowError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        OrderFlowError::ProductNotFound => json_error(StatusCode::NOT_FOUND, "Product not found"),
        OrderFlowError::OrderNotFound => json_error(StatusCode::NOT_FOUND, "Order not found"),
        OrderFlowError::InsufficientStock => {
            json_error(StatusCode::BAD_REQUEST, "Insufficient stock")
        }
        OrderFlowError::Store(e) => storage_failure(e),
    }
}

pub fn auth_flow_error_to_response(err: AuthFlowError) -> Response {
    match err {
        AuthFlowError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        AuthFlowError::AccountExists => (
            StatusCode::CONFLICT,
            Json(json!({ "message": "This account existed" })),
        )
            .into_response(),
        AuthFlowError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Wrong email or password" })),
        )
            .into_response(),
        AuthFlowError::Hash | AuthFlowError::Token => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
        AuthFlowError::Store(e) => storage_failure(e),
    }
}

pub fn catalog_flow_error_to_response(err: CatalogFlowError) -> Response {
    match err {
        CatalogFlowError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        CatalogFlowError::ProductNotFound => {
            json_error(StatusCode::NOT_FOUND, "Product not found")
        }
        CatalogFlowError::SellerRequired => {
            json_error(StatusCode::FORBIDDEN, "only sellers can manage products")
        }
        CatalogFlowError::Store(e) => storage_failure(e),
    }
}

/// Storage faults: full detail to the logs, generic body to the client.
pub fn storage_failure(err: StoreError) -> Response {
    tracing::error!(error = %err, "storage failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
