use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Record one proxied call for rate-limit accounting and service health.
pub async fn record(
    pool: &PgPool,
    service_id: Uuid,
    agent_id: &str,
    status: &str,
    response_time_ms: i32,
) -> anyhow::Result<()> {
    sqlx::query!(
        r#"
        INSERT INTO service_calls (id, service_id, agent_id, status, response_time_ms, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        "#,
        Uuid::new_v4(),
        service_id,
        agent_id,
        status,
        response_time_ms,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Count calls an agent made to any service since the given instant. Backs
/// the persisted view of the per-agent proxy rate limit; the hot path is
/// served by the in-memory limiter and this is the durable fallback used on
/// restart.
pub async fn count_since(pool: &PgPool, agent_id: &str, since: DateTime<Utc>) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar!(
        r#"SELECT count(*) FROM service_calls WHERE agent_id = $1 AND created_at >= $2"#,
        agent_id,
        since,
    )
    .fetch_one(pool)
    .await?
    .unwrap_or(0);

    Ok(count)
}

/// Count calls an agent made to one specific service since the given
/// instant, used for per-agent/per-service proxy limits.
pub async fn count_for_service_since(
    pool: &PgPool,
    agent_id: &str,
    service_id: Uuid,
    since: DateTime<Utc>,
) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar!(
        r#"
        SELECT count(*) FROM service_calls
        WHERE agent_id = $1 AND service_id = $2 AND created_at >= $3
        "#,
        agent_id,
        service_id,
        since,
    )
    .fetch_one(pool)
    .await?
    .unwrap_or(0);

    Ok(count)
}
