//! Storage contract for the marketplace.
//!
//! The contract is deliberately small: leaf reads/writes for accounts,
//! catalog entries and orders, plus one composite write,
//! [`MarketStore::place_order`], the only operation that must touch two
//! records atomically.

use async_trait::async_trait;
use thiserror::Error;

use pasar_auth::{Account, AccountKind};
use pasar_catalog::{Product, ProductUpdate};
use pasar_core::{DomainError, OrderId, ProductId, UserId};
use pasar_orders::{Order, OrderStatus};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryMarketStore;
pub use postgres::PgMarketStore;

/// Failure of the underlying storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique value is already taken (e.g. an account email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed or returned something uninterpretable. The message
    /// is for logs; it is never shown to a client.
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Outcome taxonomy of the composite placement write.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("product not found")]
    ProductNotFound,

    /// The product exists but holds fewer units than requested. Nothing was
    /// written.
    #[error("insufficient stock")]
    InsufficientStock,

    /// Order arithmetic failed (e.g. total overflow). Nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Marketplace persistence contract.
///
/// Write operations that target a specific owner (`update_product`,
/// `delete_order`, ...) return the affected-record count; callers map zero to
/// their own not-found semantics. No method here panics on missing records.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // ── accounts ────────────────────────────────────────────────────────

    /// Persist a new account with its credential hash. An email that is
    /// already registered for the same kind yields [`StoreError::Conflict`].
    async fn insert_account(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    /// Look up an account (and its credential hash) by kind + email.
    async fn find_account(
        &self,
        kind: AccountKind,
        email: &str,
    ) -> Result<Option<(Account, String)>, StoreError>;

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StoreError>;

    // ── catalog ─────────────────────────────────────────────────────────

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn search_products(&self, name: &str) -> Result<Vec<Product>, StoreError>;

    /// Overwrite a product's mutable fields. Scoped to the owning seller;
    /// returns the number of records affected (0 when the product does not
    /// exist or belongs to another seller).
    async fn update_product(
        &self,
        seller: UserId,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<u64, StoreError>;

    /// Delete a product. Seller-scoped; returns the affected count.
    async fn delete_product(&self, seller: UserId, id: ProductId) -> Result<u64, StoreError>;

    /// Read `(price, stock)` for a product, `None` when it does not exist.
    async fn stock_and_price(&self, id: ProductId) -> Result<Option<(i64, i64)>, StoreError>;

    // ── orders ──────────────────────────────────────────────────────────

    /// The composite placement write: decrement the product's stock by
    /// `quantity` **and** record the order, as one atomic unit. Either both
    /// effects are applied or neither is; concurrent placements against the
    /// same product serialize on that product only, and stock can never go
    /// negative.
    ///
    /// The caller has already validated that `quantity` is positive.
    async fn place_order(
        &self,
        buyer: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, PlaceOrderError>;

    /// Read an order, scoped to the buyer who placed it.
    async fn get_order(&self, buyer: UserId, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Overwrite an order's status. Buyer-scoped; returns the affected count.
    async fn update_order_status(
        &self,
        buyer: UserId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<u64, StoreError>;

    /// Remove an order record. Buyer-scoped; returns the affected count.
    async fn delete_order(&self, buyer: UserId, id: OrderId) -> Result<u64, StoreError>;

    /// Snapshot of all current order records (seller-facing listing).
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
}
