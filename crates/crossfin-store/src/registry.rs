use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Service;

/// Fresh input for registering a service, before it is given an id.
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub category: String,
    pub is_paid: bool,
    pub metadata: serde_json::Value,
}

/// Insert a service, defaulting its status to `unknown` until the first
/// health probe updates it.
pub async fn insert(pool: &PgPool, service: NewService) -> anyhow::Result<Service> {
    let row = sqlx::query_as!(
        Service,
        r#"
        INSERT INTO services
            (id, name, description, endpoint, category, is_paid, status, metadata, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'unknown', $7, now(), now())
        RETURNING id, name, description, endpoint, category, is_paid, status, metadata, created_at, updated_at
        "#,
        Uuid::new_v4(),
        service.name,
        service.description,
        service.endpoint,
        service.category,
        service.is_paid,
        service.metadata,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<Service>> {
    let rows = sqlx::query_as!(
        Service,
        r#"
        SELECT id, name, description, endpoint, category, is_paid, status, metadata, created_at, updated_at
        FROM services
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Case-insensitive substring search over name and category.
pub async fn search(pool: &PgPool, query: &str) -> anyhow::Result<Vec<Service>> {
    let pattern = format!("%{}%", query.to_lowercase());
    let rows = sqlx::query_as!(
        Service,
        r#"
        SELECT id, name, description, endpoint, category, is_paid, status, metadata, created_at, updated_at
        FROM services
        WHERE lower(name) LIKE $1 OR lower(category) LIKE $1
        ORDER BY created_at ASC
        "#,
        pattern,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn by_category(pool: &PgPool, category: &str) -> anyhow::Result<Vec<Service>> {
    let rows = sqlx::query_as!(
        Service,
        r#"
        SELECT id, name, description, endpoint, category, is_paid, status, metadata, created_at, updated_at
        FROM services
        WHERE category = $1
        ORDER BY created_at ASC
        "#,
        category,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn find(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Service>> {
    let row = sqlx::query_as!(
        Service,
        r#"
        SELECT id, name, description, endpoint, category, is_paid, status, metadata, created_at, updated_at
        FROM services
        WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Update a service's health status, as observed by the background prober.
pub async fn set_status(pool: &PgPool, id: Uuid, status: &str) -> anyhow::Result<()> {
    sqlx::query!(
        r#"UPDATE services SET status = $2, updated_at = now() WHERE id = $1"#,
        id,
        status,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed the registry with a fixed starting set if it is empty. Called once
/// at startup so a fresh database has something to discover.
pub async fn seed_if_empty(pool: &PgPool, seeds: Vec<NewService>) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar!("SELECT count(*) FROM services")
        .fetch_one(pool)
        .await?
        .unwrap_or(0);

    if count > 0 {
        return Ok(());
    }

    for seed in seeds {
        insert(pool, seed).await?;
    }

    Ok(())
}
