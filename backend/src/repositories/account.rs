//! Account mirror repository

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Account record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: Option<String>,
}

pub struct AccountRepository;

impl AccountRepository {
    /// Record an authenticated account, keeping a known email when none is given
    pub async fn upsert(pool: &PgPool, id: Uuid, email: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email)
            VALUES ($1, LOWER($2))
            ON CONFLICT (id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, accounts.email),
                updated_at = NOW()
            "#,
        )
        .bind(id)
        .bind(email)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AccountRecord>> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, email
            FROM accounts
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }
}
