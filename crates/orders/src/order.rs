use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pasar_core::{DomainError, DomainResult, OrderId, ProductId, UserId};

use crate::status::OrderStatus;

/// A placed order.
///
/// `total_price` is the product price at placement time multiplied by the
/// quantity; later price changes on the product never alter past orders.
/// `product_id` is a non-owning reference captured at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Snapshot of `price * quantity` at placement, in the smallest currency
    /// unit.
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Compute an order total from a unit price and a quantity.
///
/// The quantity must be positive: a zero-quantity order has no effect and
/// would only mask client bugs. The multiplication is overflow-checked so an
/// absurd quantity fails loudly instead of wrapping.
pub fn order_total(price: i64, quantity: i64) -> DomainResult<i64> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    price
        .checked_mul(quantity)
        .ok_or_else(|| DomainError::validation("order total overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn total_is_price_times_quantity() {
        assert_eq!(order_total(10, 5).unwrap(), 50);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(matches!(
            order_total(10, 0).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        assert!(order_total(10, -3).is_err());
    }

    #[test]
    fn overflowing_total_is_rejected() {
        assert!(order_total(i64::MAX, 2).is_err());
    }

    #[test]
    fn order_snapshot_keeps_its_fields() {
        let order = Order {
            id: OrderId::new(),
            buyer_id: UserId::new(),
            product_id: ProductId::new(),
            quantity: 5,
            total_price: order_total(10, 5).unwrap(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        assert_eq!(order.total_price, 50);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    proptest! {
        #[test]
        fn total_is_exact_for_realistic_ranges(
            price in 0i64..=100_000_000,
            quantity in 1i64..=10_000,
        ) {
            prop_assert_eq!(order_total(price, quantity).unwrap(), price * quantity);
        }

        #[test]
        fn non_positive_quantities_never_produce_a_total(quantity in i64::MIN..=0) {
            prop_assert!(order_total(100, quantity).is_err());
        }
    }
}
