use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use pasar_core::{OrderId, ProductId};
use pasar_infra::StatusOutcome;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/order", post(create_order))
        .route("/order/:order_id", put(update_order_status).get(get_order))
        .route("/orders", get(list_orders))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match body.product_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid product id"),
    };

    match services
        .place_order(auth.user_id(), product_id, body.quantity)
        .await
    {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Order created successfully",
                "id": order.id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::order_flow_error_to_response(e),
    }
}

pub async fn update_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(order_id): Path<String>,
    Json(body): Json<dto::UpdateOrderStatusRequest>,
) -> axum::response::Response {
    let order_id: OrderId = match order_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid order id"),
    };

    match services
        .update_order_status(auth.user_id(), order_id, &body.status)
        .await
    {
        Ok(StatusOutcome::Deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Order deleted successfully" })),
        )
            .into_response(),
        Ok(StatusOutcome::Updated) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Order status updated successfully" })),
        )
            .into_response(),
        Err(e) => errors::order_flow_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(order_id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match order_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid order id"),
    };

    match services.get_order(auth.user_id(), order_id).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::order_flow_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_orders().await {
        Ok(orders) => {
            let items: Vec<_> = orders.iter().map(dto::order_to_json).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::order_flow_error_to_response(e),
    }
}
