//! Backend wiring: store selection and the request-facing service flows.
//!
//! `USE_PERSISTENT_STORES=true` selects the Postgres backend (requires
//! `DATABASE_URL`); anything else runs the in-memory store (dev/test).

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use pasar_auth::{Account, AccountKind, Hs256Jwt, JwtClaims, NewAccount, password};
use pasar_catalog::{NewProduct, Product, ProductUpdate};
use pasar_core::{OrderId, ProductId, UserId};
use pasar_infra::{
    InMemoryMarketStore, MarketStore, OrderFlowError, OrderManager, PgMarketStore, StatusOutcome,
    StoreError,
};
use pasar_orders::Order;

/// Lifetime of issued bearer tokens.
const TOKEN_TTL_HOURS: i64 = 1;

/// Failures of the registration/login flows.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("account already exists")]
    AccountExists,

    #[error("wrong email or password")]
    InvalidCredentials,

    #[error("credential hashing failed")]
    Hash,

    #[error("token issuance failed")]
    Token,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the seller-facing catalog flows.
#[derive(Debug, Error)]
pub enum CatalogFlowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product not found")]
    ProductNotFound,

    #[error("only sellers can manage products")]
    SellerRequired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub enum AppServices {
    InMemory {
        store: InMemoryMarketStore,
        orders: OrderManager<InMemoryMarketStore>,
        jwt: Arc<Hs256Jwt>,
    },
    Persistent {
        store: PgMarketStore,
        orders: OrderManager<PgMarketStore>,
        jwt: Arc<Hs256Jwt>,
        pool: PgPool,
    },
}

pub async fn build_services(jwt: Arc<Hs256Jwt>) -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");

        let store = PgMarketStore::new(pool.clone());
        store.migrate().await.expect("failed to run migrations");

        let orders = OrderManager::new(store.clone());
        AppServices::Persistent { store, orders, jwt, pool }
    } else {
        let store = InMemoryMarketStore::new();
        let orders = OrderManager::new(store.clone());
        AppServices::InMemory { store, orders, jwt }
    }
}

impl AppServices {
    // ── identity flows ──────────────────────────────────────────────────

    pub async fn signup(&self, kind: AccountKind, new: NewAccount) -> Result<UserId, AuthFlowError> {
        match self {
            AppServices::InMemory { store, .. } => signup(store, kind, new).await,
            AppServices::Persistent { store, .. } => signup(store, kind, new).await,
        }
    }

    pub async fn login(
        &self,
        kind: AccountKind,
        email: &str,
        password: &str,
    ) -> Result<(Account, String), AuthFlowError> {
        match self {
            AppServices::InMemory { store, jwt, .. } => login(store, jwt, kind, email, password).await,
            AppServices::Persistent { store, jwt, .. } => login(store, jwt, kind, email, password).await,
        }
    }

    pub async fn profile(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        match self {
            AppServices::InMemory { store, .. } => store.get_account(id).await,
            AppServices::Persistent { store, .. } => store.get_account(id).await,
        }
    }

    // ── catalog flows ───────────────────────────────────────────────────

    pub async fn create_product(
        &self,
        seller: UserId,
        kind: AccountKind,
        new: NewProduct,
    ) -> Result<Product, CatalogFlowError> {
        match self {
            AppServices::InMemory { store, .. } => create_product(store, seller, kind, new).await,
            AppServices::Persistent { store, .. } => create_product(store, seller, kind, new).await,
        }
    }

    pub async fn update_product(
        &self,
        seller: UserId,
        kind: AccountKind,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<(), CatalogFlowError> {
        match self {
            AppServices::InMemory { store, .. } => update_product(store, seller, kind, id, update).await,
            AppServices::Persistent { store, .. } => update_product(store, seller, kind, id, update).await,
        }
    }

    pub async fn delete_product(
        &self,
        seller: UserId,
        kind: AccountKind,
        id: ProductId,
    ) -> Result<(), CatalogFlowError> {
        match self {
            AppServices::InMemory { store, .. } => delete_product(store, seller, kind, id).await,
            AppServices::Persistent { store, .. } => delete_product(store, seller, kind, id).await,
        }
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        match self {
            AppServices::InMemory { store, .. } => store.get_product(id).await,
            AppServices::Persistent { store, .. } => store.get_product(id).await,
        }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        match self {
            AppServices::InMemory { store, .. } => store.list_products().await,
            AppServices::Persistent { store, .. } => store.list_products().await,
        }
    }

    pub async fn search_products(&self, name: &str) -> Result<Vec<Product>, StoreError> {
        match self {
            AppServices::InMemory { store, .. } => store.search_products(name).await,
            AppServices::Persistent { store, .. } => store.search_products(name).await,
        }
    }

    // ── order flows ─────────────────────────────────────────────────────

    pub async fn place_order(
        &self,
        buyer: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, OrderFlowError> {
        match self {
            AppServices::InMemory { orders, .. } => orders.place_order(buyer, product_id, quantity).await,
            AppServices::Persistent { orders, .. } => orders.place_order(buyer, product_id, quantity).await,
        }
    }

    pub async fn update_order_status(
        &self,
        buyer: UserId,
        order_id: OrderId,
        raw_status: &str,
    ) -> Result<StatusOutcome, OrderFlowError> {
        match self {
            AppServices::InMemory { orders, .. } => orders.update_status(buyer, order_id, raw_status).await,
            AppServices::Persistent { orders, .. } => orders.update_status(buyer, order_id, raw_status).await,
        }
    }

    pub async fn get_order(&self, buyer: UserId, order_id: OrderId) -> Result<Order, OrderFlowError> {
        match self {
            AppServices::InMemory { orders, .. } => orders.get_order(buyer, order_id).await,
            AppServices::Persistent { orders, .. } => orders.get_order(buyer, order_id).await,
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        match self {
            AppServices::InMemory { orders, .. } => orders.list_orders().await,
            AppServices::Persistent { orders, .. } => orders.list_orders().await,
        }
    }

    /// Release the storage backend. Called after the server has drained.
    pub async fn close(&self) {
        if let AppServices::Persistent { pool, .. } = self {
            pool.close().await;
        }
    }
}

// Flow implementations, generic over the store so both backends share them.

async fn signup<S: MarketStore>(
    store: &S,
    kind: AccountKind,
    new: NewAccount,
) -> Result<UserId, AuthFlowError> {
    new.validate()
        .map_err(|e| AuthFlowError::Validation(e.to_string()))?;

    if store.find_account(kind, &new.email).await?.is_some() {
        return Err(AuthFlowError::AccountExists);
    }

    let hash = password::hash(&new.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        AuthFlowError::Hash
    })?;

    let account = Account::register(UserId::new(), kind, new, Utc::now());
    match store.insert_account(&account, &hash).await {
        Ok(()) => {
            tracing::info!(account_id = %account.id, kind = %kind, "account registered");
            Ok(account.id)
        }
        // The existence pre-check races with concurrent registrations; the
        // store's unique constraint is authoritative.
        Err(StoreError::Conflict(_)) => Err(AuthFlowError::AccountExists),
        Err(e) => Err(e.into()),
    }
}

async fn login<S: MarketStore>(
    store: &S,
    jwt: &Hs256Jwt,
    kind: AccountKind,
    email: &str,
    password_plain: &str,
) -> Result<(Account, String), AuthFlowError> {
    let Some((account, hash)) = store.find_account(kind, email).await? else {
        return Err(AuthFlowError::InvalidCredentials);
    };
    if !password::verify(password_plain, &hash) {
        return Err(AuthFlowError::InvalidCredentials);
    }

    let now = Utc::now();
    let claims = JwtClaims {
        sub: account.id,
        kind,
        issued_at: now,
        expires_at: now + Duration::hours(TOKEN_TTL_HOURS),
    };
    let token = jwt.issue(&claims).map_err(|e| {
        tracing::error!(error = %e, "token issuance failed");
        AuthFlowError::Token
    })?;

    tracing::info!(account_id = %account.id, kind = %kind, "login succeeded");
    Ok((account, token))
}

async fn create_product<S: MarketStore>(
    store: &S,
    seller: UserId,
    kind: AccountKind,
    new: NewProduct,
) -> Result<Product, CatalogFlowError> {
    if kind != AccountKind::Seller {
        return Err(CatalogFlowError::SellerRequired);
    }

    let product = Product::create(ProductId::new(), seller, new, Utc::now())
        .map_err(|e| CatalogFlowError::Validation(e.to_string()))?;
    store.insert_product(&product).await?;

    tracing::info!(product_id = %product.id, seller_id = %seller, "product created");
    Ok(product)
}

async fn update_product<S: MarketStore>(
    store: &S,
    seller: UserId,
    kind: AccountKind,
    id: ProductId,
    update: ProductUpdate,
) -> Result<(), CatalogFlowError> {
    if kind != AccountKind::Seller {
        return Err(CatalogFlowError::SellerRequired);
    }
    update
        .validate()
        .map_err(|e| CatalogFlowError::Validation(e.to_string()))?;

    if store.update_product(seller, id, &update).await? == 0 {
        return Err(CatalogFlowError::ProductNotFound);
    }
    Ok(())
}

async fn delete_product<S: MarketStore>(
    store: &S,
    seller: UserId,
    kind: AccountKind,
    id: ProductId,
) -> Result<(), CatalogFlowError> {
    if kind != AccountKind::Seller {
        return Err(CatalogFlowError::SellerRequired);
    }
    if store.delete_product(seller, id).await? == 0 {
        return Err(CatalogFlowError::ProductNotFound);
    }
    Ok(())
}
