use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use pasar_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

/// Catalog browsing is open; the storefront renders without a credential.
pub fn public_router() -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search/:name", get(search_products))
        .route("/products/:id", get(get_product))
}

/// Catalog management is seller-only and seller-scoped.
pub fn protected_router() -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_products().await {
        Ok(products) => {
            let data: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "data": data,
                    "message": "all products displayed!",
                })),
            )
                .into_response()
        }
        Err(e) => errors::storage_failure(e),
    }
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.search_products(&name).await {
        Ok(products) => {
            let data: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(e) => errors::storage_failure(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid product id"),
    };

    match services.get_product(id).await {
        Ok(Some(product)) => {
            (StatusCode::OK, Json(dto::product_to_json(&product))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "Product not found"),
        Err(e) => errors::storage_failure(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    match services
        .create_product(auth.user_id(), auth.kind(), body.into())
        .await
    {
        Ok(product) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Product created successfully",
                "id": product.id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::catalog_flow_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid product id"),
    };

    match services
        .update_product(auth.user_id(), auth.kind(), id, body.into())
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "data": "Product updated successfully" })),
        )
            .into_response(),
        Err(e) => errors::catalog_flow_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid product id"),
    };

    match services.delete_product(auth.user_id(), auth.kind(), id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Product deleted!" })),
        )
            .into_response(),
        Err(e) => errors::catalog_flow_error_to_response(e),
    }
}
