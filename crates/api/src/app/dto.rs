//! Request/response DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{Value, json};

use pasar_auth::{Account, NewAccount};
use pasar_catalog::{NewProduct, Product, ProductUpdate};
use pasar_orders::Order;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

impl From<SignupRequest> for NewAccount {
    fn from(req: SignupRequest) -> Self {
        NewAccount {
            name: req.name,
            email: req.email,
            password: req.password,
            phone_number: req.phone_number,
            address: req.address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub details: String,
    pub address: String,
    pub price: i64,
    pub stock: i64,
    pub image_url: Option<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        NewProduct {
            name: req.name,
            details: req.details,
            address: req.address,
            price: req.price,
            stock: req.stock,
            image_url: req.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub details: String,
    pub address: String,
    pub price: i64,
    pub stock: i64,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(req: UpdateProductRequest) -> Self {
        ProductUpdate {
            name: req.name,
            details: req.details,
            address: req.address,
            price: req.price,
            stock: req.stock,
        }
    }
}

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id.to_string(),
        "buyer_id": order.buyer_id.to_string(),
        "product_id": order.product_id.to_string(),
        "quantity": order.quantity,
        "total_price": order.total_price,
        "status": order.status.as_str(),
        "created_at": order.created_at.to_rfc3339(),
    })
}

pub fn product_to_json(product: &Product) -> Value {
    json!({
        "id": product.id.to_string(),
        "seller_id": product.seller_id.to_string(),
        "name": product.name,
        "details": product.details,
        "address": product.address,
        "price": product.price,
        "stock": product.stock,
        "image_url": product.image_url,
        "created_at": product.created_at.to_rfc3339(),
    })
}

/// Account representation for clients. The credential hash never reaches this
/// layer at all.
pub fn account_to_json(account: &Account) -> Value {
    json!({
        "id": account.id.to_string(),
        "kind": account.kind.as_str(),
        "name": account.name,
        "email": account.email,
        "phone_number": account.phone_number,
        "address": account.address,
        "created_at": account.created_at.to_rfc3339(),
    })
}
