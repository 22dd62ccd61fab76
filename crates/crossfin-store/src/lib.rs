//! Persistent store for CrossFin: kimchi snapshots, registry services, and
//! proxy service-call logs. Everything else in the core is in-memory.

pub mod models;
pub mod pool;
pub mod registry;
pub mod service_calls;
pub mod snapshots;

use sqlx::PgPool;

pub use models::{KimchiSnapshotRow, Service, ServiceCall};

/// Create a Postgres connection pool for the given URL.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url).await?;
    Ok(pool)
}

/// Apply the store's embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
