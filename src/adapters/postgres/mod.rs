//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCatalogReader` - Catalog prices
//! - `PostgresCartRepository` - Cart rows keyed by (user, item)
//! - `PostgresOrderRepository` - Orders and line items
//! - `PostgresPaymentRepository` - Transactional reconciliation and payment reads
//! - `PostgresOwnershipLedger` - Ownership grant reads

mod cart_repository;
mod catalog_reader;
mod order_repository;
mod ownership_ledger;
mod payment_repository;
mod rows;

pub use cart_repository::PostgresCartRepository;
pub use catalog_reader::PostgresCatalogReader;
pub use order_repository::PostgresOrderRepository;
pub use ownership_ledger::PostgresOwnershipLedger;
pub use payment_repository::PostgresPaymentRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Creates the connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
