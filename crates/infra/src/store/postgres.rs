//! Postgres-backed market store.
//!
//! One connection pool, injected at startup. The placement composite runs as
//! a single transaction around a conditional decrement
//! (`... SET stock = stock - $q WHERE id = $id AND stock >= $q`), so
//! concurrent placements against the same product serialize on that product
//! row only and the `stock >= 0` invariant is enforced by the statement
//! itself, not by a read-then-write sequence.
//!
//! SQLx errors are mapped to [`StoreError`]: unique violations (SQLSTATE
//! 23505) become `Conflict`, everything else `Backend` with an
//! operation-tagged message for the logs.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use async_trait::async_trait;

use pasar_auth::{Account, AccountKind};
use pasar_catalog::{Product, ProductUpdate};
use pasar_core::{OrderId, ProductId, UserId};
use pasar_orders::{Order, OrderStatus, order_total};

use super::{MarketStore, PlaceOrderError, StoreError};

/// Postgres-backed implementation of [`MarketStore`].
///
/// Cloning is cheap (the pool is reference-counted) and the store is
/// `Send + Sync`; all operations go through the pool's thread-safe
/// connection management.
#[derive(Debug, Clone)]
pub struct PgMarketStore {
    pool: PgPool,
}

impl PgMarketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))
    }
}

#[async_trait]
impl MarketStore for PgMarketStore {
    async fn insert_account(
        &self,
        account: &Account,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, kind, name, email, password_hash, phone_number, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.kind.as_str())
        .bind(&account.name)
        .bind(&account.email)
        .bind(password_hash)
        .bind(&account.phone_number)
        .bind(&account.address)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_account", e))?;

        Ok(())
    }

    async fn find_account(
        &self,
        kind: AccountKind,
        email: &str,
    ) -> Result<Option<(Account, String)>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, name, email, password_hash, phone_number, address, created_at
            FROM accounts
            WHERE kind = $1 AND email = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account", e))?;

        row.map(account_from_row).transpose()
    }

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, name, email, password_hash, phone_number, address, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_account", e))?;

        Ok(row.map(account_from_row).transpose()?.map(|(a, _)| a))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, name, details, address, price, stock, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.seller_id.as_uuid())
        .bind(&product.name)
        .bind(&product.details)
        .bind(&product.address)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image_url)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, seller_id, name, details, address, price, stock, image_url, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.map(product_from_row).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, name, details, address, price, stock, image_url, created_at
            FROM products
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.into_iter().map(product_from_row).collect()
    }

    async fn search_products(&self, name: &str) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, name, details, address, price, stock, image_url, created_at
            FROM products
            WHERE name = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_products", e))?;

        rows.into_iter().map(product_from_row).collect()
    }

    async fn update_product(
        &self,
        seller: UserId,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $3, details = $4, address = $5, price = $6, stock = $7
            WHERE id = $1 AND seller_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(seller.as_uuid())
        .bind(&update.name)
        .bind(&update.details)
        .bind(&update.address)
        .bind(update.price)
        .bind(update.stock)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_product(&self, seller: UserId, id: ProductId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
            .bind(id.as_uuid())
            .bind(seller.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected())
    }

    async fn stock_and_price(&self, id: ProductId) -> Result<Option<(i64, i64)>, StoreError> {
        let row = sqlx::query("SELECT price, stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("stock_and_price", e))?;

        row.map(|r| {
            let price: i64 = r
                .try_get("price")
                .map_err(|e| StoreError::Backend(format!("failed to read price: {e}")))?;
            let stock: i64 = r
                .try_get("stock")
                .map_err(|e| StoreError::Backend(format!("failed to read stock: {e}")))?;
            Ok((price, stock))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(buyer = %buyer, product_id = %product_id, quantity), err)]
    async fn place_order(
        &self,
        buyer: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, PlaceOrderError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_place_order", e))?;

        // Conditional decrement: the WHERE clause is the stock check, so the
        // check and the write are one statement and concurrent placements
        // serialize on this product row.
        let reserved = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            RETURNING price
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("reserve_stock", e))?;

        let Some(row) = reserved else {
            // Nothing reserved: unknown product or short stock.
            let exists = sqlx::query("SELECT 1 FROM products WHERE id = $1")
                .bind(product_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("check_product_exists", e))?;

            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback_place_order", e))?;

            return Err(if exists.is_some() {
                PlaceOrderError::InsufficientStock
            } else {
                PlaceOrderError::ProductNotFound
            });
        };

        let price: i64 = row
            .try_get("price")
            .map_err(|e| StoreError::Backend(format!("failed to read price: {e}")))?;

        let total = match order_total(price, quantity) {
            Ok(total) => total,
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback_place_order", e))?;
                return Err(e.into());
            }
        };

        let order = Order {
            id: OrderId::new(),
            buyer_id: buyer,
            product_id,
            quantity,
            total_price: total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, product_id, quantity, total_price, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.buyer_id.as_uuid())
        .bind(order.product_id.as_uuid())
        .bind(order.quantity)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_place_order", e))?;

        Ok(order)
    }

    async fn get_order(&self, buyer: UserId, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, buyer_id, product_id, quantity, total_price, status, created_at
            FROM orders
            WHERE id = $1 AND buyer_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(buyer.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

        row.map(order_from_row).transpose()
    }

    #[instrument(skip(self), fields(buyer = %buyer, order_id = %id, status = %status), err)]
    async fn update_order_status(
        &self,
        buyer: UserId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $3 WHERE id = $1 AND buyer_id = $2",
        )
        .bind(id.as_uuid())
        .bind(buyer.as_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_order_status", e))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(buyer = %buyer, order_id = %id), err)]
    async fn delete_order(&self, buyer: UserId, id: OrderId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND buyer_id = $2")
            .bind(id.as_uuid())
            .bind(buyer.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;

        Ok(result.rows_affected())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, product_id, quantity, total_price, status, created_at
            FROM orders
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.into_iter().map(order_from_row).collect()
    }
}

// Row mapping helpers. Columns are read with `try_get` so a schema drift
// surfaces as a tagged Backend error instead of a panic.

fn account_from_row(row: sqlx::postgres::PgRow) -> Result<(Account, String), StoreError> {
    let read = |e: sqlx::Error| StoreError::Backend(format!("failed to read account row: {e}"));

    let kind_raw: String = row.try_get("kind").map_err(read)?;
    let kind: AccountKind = kind_raw
        .parse()
        .map_err(|e| StoreError::Backend(format!("corrupt account kind: {e}")))?;

    let account = Account {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(read)?),
        kind,
        name: row.try_get("name").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        phone_number: row.try_get("phone_number").map_err(read)?,
        address: row.try_get("address").map_err(read)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?,
    };
    let password_hash: String = row.try_get("password_hash").map_err(read)?;

    Ok((account, password_hash))
}

fn product_from_row(row: sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let read = |e: sqlx::Error| StoreError::Backend(format!("failed to read product row: {e}"));

    Ok(Product {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id").map_err(read)?),
        seller_id: UserId::from_uuid(row.try_get::<Uuid, _>("seller_id").map_err(read)?),
        name: row.try_get("name").map_err(read)?,
        details: row.try_get("details").map_err(read)?,
        address: row.try_get("address").map_err(read)?,
        price: row.try_get("price").map_err(read)?,
        stock: row.try_get("stock").map_err(read)?,
        image_url: row.try_get("image_url").map_err(read)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?,
    })
}

fn order_from_row(row: sqlx::postgres::PgRow) -> Result<Order, StoreError> {
    let read = |e: sqlx::Error| StoreError::Backend(format!("failed to read order row: {e}"));

    let status_raw: String = row.try_get("status").map_err(read)?;
    let status: OrderStatus = status_raw
        .parse()
        .map_err(|e| StoreError::Backend(format!("corrupt order status: {e}")))?;

    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id").map_err(read)?),
        buyer_id: UserId::from_uuid(row.try_get::<Uuid, _>("buyer_id").map_err(read)?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id").map_err(read)?),
        quantity: row.try_get("quantity").map_err(read)?,
        total_price: row.try_get("total_price").map_err(read)?,
        status,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?,
    })
}

/// Map SQLx errors to [`StoreError`].
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            if db_err.code().as_deref() == Some("23505") {
                StoreError::Conflict(msg)
            } else {
                StoreError::Backend(msg)
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
