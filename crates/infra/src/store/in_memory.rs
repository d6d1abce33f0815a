//! In-memory store (dev/test backend).
//!
//! A single mutex guards the whole state, which trivially gives the
//! placement composite its both-or-neither guarantee: every store operation
//! runs under one lock acquisition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use pasar_auth::{Account, AccountKind};
use pasar_catalog::{Product, ProductUpdate};
use pasar_core::{OrderId, ProductId, UserId};
use pasar_orders::{Order, OrderStatus, order_total};

use super::{MarketStore, PlaceOrderError, StoreError};

#[derive(Debug, Default)]
struct MarketState {
    accounts: HashMap<UserId, (Account, String)>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
}

/// Mutex-guarded state maps. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketStore {
    inner: Arc<Mutex<MarketState>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn insert_account(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.inner.lock().unwrap();
        let taken = state
            .accounts
            .values()
            .any(|(a, _)| a.kind == account.kind && a.email == account.email);
        if taken {
            return Err(StoreError::Conflict(format!(
                "email '{}' already registered",
                account.email
            )));
        }
        state
            .accounts
            .insert(account.id, (account.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn find_account(
        &self,
        kind: AccountKind,
        email: &str,
    ) -> Result<Option<(Account, String)>, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .accounts
            .values()
            .find(|(a, _)| a.kind == kind && a.email == email)
            .cloned())
    }

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(state.accounts.get(&id).map(|(a, _)| a.clone()))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut state = self.inner.lock().unwrap();
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(state.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.inner.lock().unwrap();
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        Ok(products)
    }

    async fn search_products(&self, name: &str) -> Result<Vec<Product>, StoreError> {
        let state = self.inner.lock().unwrap();
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect();
        products.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        Ok(products)
    }

    async fn update_product(
        &self,
        seller: UserId,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<u64, StoreError> {
        let mut state = self.inner.lock().unwrap();
        match state.products.get_mut(&id) {
            Some(p) if p.seller_id == seller => {
                p.name = update.name.clone();
                p.details = update.details.clone();
                p.address = update.address.clone();
                p.price = update.price;
                p.stock = update.stock;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_product(&self, seller: UserId, id: ProductId) -> Result<u64, StoreError> {
        let mut state = self.inner.lock().unwrap();
        let owned = state.products.get(&id).is_some_and(|p| p.seller_id == seller);
        if owned {
            state.products.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn stock_and_price(&self, id: ProductId) -> Result<Option<(i64, i64)>, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(state.products.get(&id).map(|p| (p.price, p.stock)))
    }

    async fn place_order(
        &self,
        buyer: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, PlaceOrderError> {
        let mut state = self.inner.lock().unwrap();

        let product = state
            .products
            .get_mut(&product_id)
            .ok_or(PlaceOrderError::ProductNotFound)?;
        if product.stock < quantity {
            return Err(PlaceOrderError::InsufficientStock);
        }

        // Total is computed before any mutation so a failure leaves the
        // product untouched.
        let total = order_total(product.price, quantity)?;
        product.stock -= quantity;

        let order = Order {
            id: OrderId::new(),
            buyer_id: buyer,
            product_id,
            quantity,
            total_price: total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, buyer: UserId, id: OrderId) -> Result<Option<Order>, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .orders
            .get(&id)
            .filter(|o| o.buyer_id == buyer)
            .cloned())
    }

    async fn update_order_status(
        &self,
        buyer: UserId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<u64, StoreError> {
        let mut state = self.inner.lock().unwrap();
        match state.orders.get_mut(&id) {
            Some(o) if o.buyer_id == buyer => {
                o.status = status;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_order(&self, buyer: UserId, id: OrderId) -> Result<u64, StoreError> {
        let mut state = self.inner.lock().unwrap();
        let owned = state.orders.get(&id).is_some_and(|o| o.buyer_id == buyer);
        if owned {
            state.orders.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let state = self.inner.lock().unwrap();
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| (o.created_at, *o.id.as_uuid()));
        Ok(orders)
    }
}
