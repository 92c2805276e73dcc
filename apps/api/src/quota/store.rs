use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::usage::UsageRecord;

/// External usage-count store consulted by the quota gate.
///
/// Carried in `AppState` (inside `QuotaGate`) as `Arc<dyn UsageStore>`.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Number of records for `user_id` created at or after `since`.
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    /// Appends one record.
    async fn insert(&self, record: &UsageRecord) -> Result<()>;
}

/// `usage_records` table in Postgres.
pub struct PgUsageStore {
    pool: PgPool,
}

impl PgUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM usage_records WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn insert(&self, record: &UsageRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO usage_records (user_id, file_name, project_name, bid_score, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.user_id)
        .bind(&record.file_name)
        .bind(&record.project_name)
        .bind(record.bid_score)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
