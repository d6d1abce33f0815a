use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pasar_core::{DomainError, DomainResult, ProductId, UserId};

/// A sellable catalog entry.
///
/// `stock` is the number of units available for ordering and must never be
/// negative; the only code path that decrements it is order placement, which
/// performs a conditional decrement. `price` is in the smallest currency unit
/// (e.g. cents) so order totals stay exact integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub name: String,
    pub details: String,
    pub address: String,
    /// Price per unit in the smallest currency unit.
    pub price: i64,
    pub stock: i64,
    /// Reference to an externally stored image; upload is not this system's
    /// concern.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub details: String,
    pub address: String,
    pub price: i64,
    pub stock: i64,
    pub image_url: Option<String>,
}

/// Input for overwriting a catalog entry's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub details: String,
    pub address: String,
    pub price: i64,
    pub stock: i64,
}

fn validate_fields(name: &str, price: i64, stock: i64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if price < 0 {
        return Err(DomainError::validation("price cannot be negative"));
    }
    if stock < 0 {
        return Err(DomainError::validation("stock cannot be negative"));
    }
    Ok(())
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, self.price, self.stock)
    }
}

impl ProductUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, self.price, self.stock)
    }
}

impl Product {
    /// Build a product record from validated input.
    pub fn create(
        id: ProductId,
        seller_id: UserId,
        new: NewProduct,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self {
            id,
            seller_id,
            name: new.name,
            details: new.details,
            address: new.address,
            price: new.price,
            stock: new.stock,
            image_url: new.image_url,
            created_at: at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewProduct {
        NewProduct {
            name: "Wagyu ribeye".to_string(),
            details: "Frozen, 500g cut".to_string(),
            address: "Bandung".to_string(),
            price: 185_000_00,
            stock: 12,
            image_url: None,
        }
    }

    #[test]
    fn valid_product_is_created() {
        let product =
            Product::create(ProductId::new(), UserId::new(), valid_input(), Utc::now()).unwrap();
        assert_eq!(product.stock, 12);
        assert_eq!(product.price, 185_000_00);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut input = valid_input();
        input.name = "   ".to_string();
        assert!(matches!(
            input.validate().unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut input = valid_input();
        input.price = -1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn negative_stock_is_rejected() {
        let mut input = valid_input();
        input.stock = -5;
        assert!(input.validate().is_err());
    }

    #[test]
    fn zero_stock_is_allowed() {
        // Sold-out listings are valid catalog entries.
        let mut input = valid_input();
        input.stock = 0;
        assert!(input.validate().is_ok());
    }
}
