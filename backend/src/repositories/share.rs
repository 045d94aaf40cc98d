//! Schedule sharing repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Share record joined with the recipient's email
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShareRecord {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub shared_with_account_id: Uuid,
    pub email: Option<String>,
    pub permission_level: String,
    pub created_at: DateTime<Utc>,
}

pub struct ShareRepository;

impl ShareRepository {
    /// Grant access, replacing the level of an existing share
    pub async fn upsert(
        pool: &PgPool,
        schedule_id: Uuid,
        shared_with: Uuid,
        shared_by: Uuid,
        permission_level: &str,
    ) -> Result<ShareRecord> {
        let record = sqlx::query_as::<_, ShareRecord>(
            r#"
            WITH upserted AS (
                INSERT INTO schedule_shares
                    (schedule_id, shared_with_account_id, shared_by_account_id, permission_level)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (schedule_id, shared_with_account_id) DO UPDATE
                SET permission_level = EXCLUDED.permission_level
                RETURNING id, schedule_id, shared_with_account_id, permission_level, created_at
            )
            SELECT u.id, u.schedule_id, u.shared_with_account_id, a.email,
                   u.permission_level, u.created_at
            FROM upserted u
            JOIN accounts a ON a.id = u.shared_with_account_id
            "#,
        )
        .bind(schedule_id)
        .bind(shared_with)
        .bind(shared_by)
        .bind(permission_level)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    pub async fn list_for_schedule(pool: &PgPool, schedule_id: Uuid) -> Result<Vec<ShareRecord>> {
        let records = sqlx::query_as::<_, ShareRecord>(
            r#"
            SELECT sh.id, sh.schedule_id, sh.shared_with_account_id, a.email,
                   sh.permission_level, sh.created_at
            FROM schedule_shares sh
            JOIN accounts a ON a.id = sh.shared_with_account_id
            WHERE sh.schedule_id = $1
            ORDER BY sh.created_at
            "#,
        )
        .bind(schedule_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn delete(pool: &PgPool, schedule_id: Uuid, share_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM schedule_shares WHERE id = $1 AND schedule_id = $2")
            .bind(share_id)
            .bind(schedule_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Share level granted to an account, if any
    pub async fn permission_for(pool: &PgPool, schedule_id: Uuid, account_id: Uuid) -> Result<Option<String>> {
        let level: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT permission_level
            FROM schedule_shares
            WHERE schedule_id = $1 AND shared_with_account_id = $2
            "#,
        )
        .bind(schedule_id)
        .bind(account_id)
        .fetch_optional(pool)
        .await?;

        Ok(level.map(|(l,)| l))
    }
}
