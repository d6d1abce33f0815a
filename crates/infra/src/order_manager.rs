//! The order workflow: placement, status lifecycle, retrieval.
//!
//! [`OrderManager`] sits between the HTTP layer and a [`MarketStore`]: it
//! validates requests, delegates the atomic placement composite to the store,
//! and turns affected-record counts into not-found results (a delete that
//! matched nothing is a failure here, not a silent success).

use thiserror::Error;
use tracing::instrument;

use pasar_core::{DomainError, OrderId, ProductId, UserId};
use pasar_orders::{Order, OrderStatus, Transition};

use crate::store::{MarketStore, PlaceOrderError, StoreError};

/// Failure taxonomy of the order workflow.
///
/// `Validation`, `ProductNotFound`, `OrderNotFound` and `InsufficientStock`
/// are expected outcomes surfaced to the caller; `Store` is a backend fault
/// and always leaves state as it was before the operation.
#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product not found")]
    ProductNotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("insufficient stock")]
    InsufficientStock,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a status transition did to the order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The status field was overwritten in place.
    Updated,
    /// The order reached its terminal state and the record was removed.
    Deleted,
}

/// Drives order placement and lifecycle over any [`MarketStore`].
pub struct OrderManager<S> {
    store: S,
}

impl<S: MarketStore> OrderManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Place an order: validate the quantity, then run the atomic
    /// reserve-and-record composite. Either the order exists and the stock is
    /// decremented, or neither happened.
    #[instrument(skip(self), fields(buyer = %buyer, product_id = %product_id, quantity))]
    pub async fn place_order(
        &self,
        buyer: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, OrderFlowError> {
        if quantity <= 0 {
            return Err(OrderFlowError::Validation(
                "quantity must be positive".to_string(),
            ));
        }

        let order = self
            .store
            .place_order(buyer, product_id, quantity)
            .await
            .map_err(|e| match e {
                PlaceOrderError::ProductNotFound => OrderFlowError::ProductNotFound,
                PlaceOrderError::InsufficientStock => OrderFlowError::InsufficientStock,
                PlaceOrderError::Domain(e) => OrderFlowError::Validation(e.to_string()),
                PlaceOrderError::Store(e) => OrderFlowError::Store(e),
            })?;

        tracing::info!(order_id = %order.id, total_price = order.total_price, "order placed");
        Ok(order)
    }

    /// Apply a status transition. `delivered` is terminal and removes the
    /// record; anything else in the closed set overwrites the status field.
    /// On both branches, zero affected records means the order does not exist
    /// for this buyer.
    #[instrument(skip(self), fields(buyer = %buyer, order_id = %order_id, raw_status))]
    pub async fn update_status(
        &self,
        buyer: UserId,
        order_id: OrderId,
        raw_status: &str,
    ) -> Result<StatusOutcome, OrderFlowError> {
        let status: OrderStatus = raw_status
            .parse()
            .map_err(|e: DomainError| OrderFlowError::Validation(e.to_string()))?;

        match status.transition() {
            Transition::Remove => {
                if self.store.delete_order(buyer, order_id).await? == 0 {
                    return Err(OrderFlowError::OrderNotFound);
                }
                tracing::info!(order_id = %order_id, "order delivered, record removed");
                Ok(StatusOutcome::Deleted)
            }
            Transition::Set(status) => {
                if self.store.update_order_status(buyer, order_id, status).await? == 0 {
                    return Err(OrderFlowError::OrderNotFound);
                }
                Ok(StatusOutcome::Updated)
            }
        }
    }

    /// Read-only order lookup, scoped to the buyer who placed it.
    pub async fn get_order(&self, buyer: UserId, order_id: OrderId) -> Result<Order, OrderFlowError> {
        self.store
            .get_order(buyer, order_id)
            .await?
            .ok_or(OrderFlowError::OrderNotFound)
    }

    /// Seller-facing snapshot of all current orders.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        Ok(self.store.list_orders().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use pasar_catalog::{NewProduct, Product};

    use crate::store::InMemoryMarketStore;

    async fn seed_product(store: &InMemoryMarketStore, price: i64, stock: i64) -> ProductId {
        let product = Product::create(
            ProductId::new(),
            UserId::new(),
            NewProduct {
                name: "Short ribs".to_string(),
                details: "bone-in".to_string(),
                address: "Surabaya".to_string(),
                price,
                stock,
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap();
        store.insert_product(&product).await.unwrap();
        product.id
    }

    fn manager(store: &InMemoryMarketStore) -> OrderManager<InMemoryMarketStore> {
        OrderManager::new(store.clone())
    }

    #[tokio::test]
    async fn placement_snapshots_total_and_drains_stock_to_zero() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);

        let order = orders.place_order(UserId::new(), product_id, 5).await.unwrap();

        assert_eq!(order.total_price, 50);
        assert_eq!(order.status, OrderStatus::Pending);
        // Quantity equal to the available stock is allowed and leaves exactly 0.
        assert_eq!(
            store.stock_and_price(product_id).await.unwrap(),
            Some((10, 0))
        );
    }

    #[tokio::test]
    async fn short_stock_rejects_without_any_mutation() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);

        let err = orders
            .place_order(UserId::new(), product_id, 6)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderFlowError::InsufficientStock));
        assert_eq!(
            store.stock_and_price(product_id).await.unwrap(),
            Some((10, 5))
        );
        assert!(orders.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_product_rejects_without_creating_an_order() {
        let store = InMemoryMarketStore::new();
        let orders = manager(&store);

        let err = orders
            .place_order(UserId::new(), ProductId::new(), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderFlowError::ProductNotFound));
        assert!(orders.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_positive_quantities_are_rejected_before_the_store() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);

        for quantity in [0, -1] {
            let err = orders
                .place_order(UserId::new(), product_id, quantity)
                .await
                .unwrap_err();
            assert!(matches!(err, OrderFlowError::Validation(_)));
        }
        assert_eq!(
            store.stock_and_price(product_id).await.unwrap(),
            Some((10, 5))
        );
    }

    #[tokio::test]
    async fn failed_placement_leaves_neither_order_nor_decrement() {
        // A failure between the reserve and the record (here: total overflow)
        // must leave both records untouched.
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, i64::MAX, 5).await;
        let orders = manager(&store);

        let err = orders
            .place_order(UserId::new(), product_id, 2)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderFlowError::Validation(_)));
        assert_eq!(
            store.stock_and_price(product_id).await.unwrap(),
            Some((i64::MAX, 5))
        );
        assert!(orders.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_placements_admit_exactly_one_winner() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = Arc::new(manager(&store));

        let a = {
            let orders = orders.clone();
            tokio::spawn(async move { orders.place_order(UserId::new(), product_id, 3).await })
        };
        let b = {
            let orders = orders.clone();
            tokio::spawn(async move { orders.place_order(UserId::new(), product_id, 3).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| matches!(r, Err(OrderFlowError::InsufficientStock)))
            .count();

        assert_eq!(wins, 1);
        assert_eq!(short, 1);
        assert_eq!(
            store.stock_and_price(product_id).await.unwrap(),
            Some((10, 2))
        );
        assert_eq!(orders.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delivered_removes_the_record_and_repeats_report_not_found() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);
        let buyer = UserId::new();

        let order = orders.place_order(buyer, product_id, 2).await.unwrap();

        let outcome = orders
            .update_status(buyer, order.id, "delivered")
            .await
            .unwrap();
        assert_eq!(outcome, StatusOutcome::Deleted);

        assert!(matches!(
            orders.get_order(buyer, order.id).await.unwrap_err(),
            OrderFlowError::OrderNotFound
        ));
        assert!(matches!(
            orders
                .update_status(buyer, order.id, "delivered")
                .await
                .unwrap_err(),
            OrderFlowError::OrderNotFound
        ));
    }

    #[tokio::test]
    async fn non_terminal_status_overwrites_in_place() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);
        let buyer = UserId::new();

        let placed = orders.place_order(buyer, product_id, 2).await.unwrap();

        let outcome = orders
            .update_status(buyer, placed.id, "processing")
            .await
            .unwrap();
        assert_eq!(outcome, StatusOutcome::Updated);

        let fetched = orders.get_order(buyer, placed.id).await.unwrap();
        assert_eq!(fetched.status, OrderStatus::Processing);
        // Everything but the status is untouched.
        assert_eq!(fetched.quantity, placed.quantity);
        assert_eq!(fetched.total_price, placed.total_price);
        assert_eq!(fetched.product_id, placed.product_id);
    }

    #[tokio::test]
    async fn unrecognized_status_is_rejected_without_a_write() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);
        let buyer = UserId::new();

        let order = orders.place_order(buyer, product_id, 1).await.unwrap();

        let err = orders
            .update_status(buyer, order.id, "teleported")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderFlowError::Validation(_)));

        let unchanged = orders.get_order(buyer, order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn updating_an_unknown_order_reports_not_found() {
        let store = InMemoryMarketStore::new();
        let orders = manager(&store);

        let err = orders
            .update_status(UserId::new(), OrderId::new(), "shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderFlowError::OrderNotFound));
    }

    #[tokio::test]
    async fn orders_are_invisible_to_other_buyers() {
        let store = InMemoryMarketStore::new();
        let product_id = seed_product(&store, 10, 5).await;
        let orders = manager(&store);
        let buyer = UserId::new();
        let stranger = UserId::new();

        let order = orders.place_order(buyer, product_id, 1).await.unwrap();

        assert!(matches!(
            orders.get_order(stranger, order.id).await.unwrap_err(),
            OrderFlowError::OrderNotFound
        ));
        assert!(matches!(
            orders
                .update_status(stranger, order.id, "shipped")
                .await
                .unwrap_err(),
            OrderFlowError::OrderNotFound
        ));

        // The owner still sees it untouched.
        let unchanged = orders.get_order(buyer, order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
    }
}
