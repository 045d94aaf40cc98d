//! Workout library repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use mile_planner_shared::catalog::CategoryInfo;
use mile_planner_shared::{NewWorkoutVersion, WorkoutDefinition, WorkoutVersion};
use sqlx::PgPool;
use uuid::Uuid;

/// Category record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    pub key: String,
    pub name: String,
    pub description: String,
}

impl From<CategoryRecord> for CategoryInfo {
    fn from(r: CategoryRecord) -> Self {
        Self {
            key: r.key,
            name: r.name,
            description: r.description,
        }
    }
}

/// Workout definition record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutRecord {
    pub id: String,
    pub category: String,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub rx: String,
    pub version: i32,
    pub is_custom: bool,
    pub created_by: Option<Uuid>,
}

impl From<WorkoutRecord> for WorkoutDefinition {
    fn from(r: WorkoutRecord) -> Self {
        Self {
            id: r.id,
            category: r.category,
            name: r.name,
            nickname: r.nickname,
            description: r.description,
            rx: r.rx,
            version: r.version,
            is_custom: r.is_custom,
        }
    }
}

/// Version snapshot record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VersionRecord {
    pub id: Uuid,
    pub workout_id: String,
    pub version_number: i32,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub rx: String,
    pub category: String,
    pub edit_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VersionRecord> for WorkoutVersion {
    fn from(r: VersionRecord) -> Self {
        Self {
            id: r.id,
            workout_id: r.workout_id,
            version_number: r.version_number,
            name: r.name,
            nickname: r.nickname,
            description: r.description,
            rx: r.rx,
            category: r.category,
            edit_reason: r.edit_reason,
            created_at: r.created_at,
        }
    }
}

pub struct CatalogRepository;

impl CatalogRepository {
    pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRecord>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT key, name, description
            FROM workout_categories
            ORDER BY sort_order, key
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn list_workouts(pool: &PgPool) -> Result<Vec<WorkoutRecord>> {
        let records = sqlx::query_as::<_, WorkoutRecord>(
            r#"
            SELECT id, category, name, nickname, description, rx, version, is_custom, created_by
            FROM workout_library
            ORDER BY sort_order, created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn find(pool: &PgPool, id: &str) -> Result<Option<WorkoutRecord>> {
        let record = sqlx::query_as::<_, WorkoutRecord>(
            r#"
            SELECT id, category, name, nickname, description, rx, version, is_custom, created_by
            FROM workout_library
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Insert a custom workout after the built-in ones
    pub async fn create(pool: &PgPool, workout: &WorkoutDefinition, created_by: Uuid) -> Result<WorkoutRecord> {
        let record = sqlx::query_as::<_, WorkoutRecord>(
            r#"
            INSERT INTO workout_library
                (id, category, name, nickname, description, rx, version, is_custom, created_by, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8,
                    (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM workout_library))
            RETURNING id, category, name, nickname, description, rx, version, is_custom, created_by
            "#,
        )
        .bind(&workout.id)
        .bind(&workout.category)
        .bind(&workout.name)
        .bind(&workout.nickname)
        .bind(&workout.description)
        .bind(&workout.rx)
        .bind(workout.version)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Store the prior version and overwrite the definition in one transaction
    ///
    /// Returns `None` when the stored version no longer matches the snapshot,
    /// i.e. someone else edited the workout first.
    pub async fn update_with_snapshot(
        pool: &PgPool,
        snapshot: &NewWorkoutVersion,
        updated: &WorkoutDefinition,
    ) -> Result<Option<WorkoutRecord>> {
        let mut tx = pool.begin().await?;

        let record = sqlx::query_as::<_, WorkoutRecord>(
            r#"
            UPDATE workout_library
            SET category = $3, name = $4, nickname = $5, description = $6, rx = $7,
                version = $8, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING id, category, name, nickname, description, rx, version, is_custom, created_by
            "#,
        )
        .bind(&updated.id)
        .bind(snapshot.version_number)
        .bind(&updated.category)
        .bind(&updated.name)
        .bind(&updated.nickname)
        .bind(&updated.description)
        .bind(&updated.rx)
        .bind(updated.version)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO workout_versions
                (workout_id, version_number, name, nickname, description, rx, category, edit_reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&snapshot.workout_id)
        .bind(snapshot.version_number)
        .bind(&snapshot.name)
        .bind(&snapshot.nickname)
        .bind(&snapshot.description)
        .bind(&snapshot.rx)
        .bind(&snapshot.category)
        .bind(&snapshot.edit_reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(record))
    }

    /// Number of placements referencing a workout across all schedules
    pub async fn count_placements(pool: &PgPool, id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schedule_workouts WHERE workout_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(count.0)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workout_library WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Version snapshots, newest first
    pub async fn list_versions(pool: &PgPool, id: &str) -> Result<Vec<VersionRecord>> {
        let records = sqlx::query_as::<_, VersionRecord>(
            r#"
            SELECT id, workout_id, version_number, name, nickname, description, rx, category,
                   edit_reason, created_at
            FROM workout_versions
            WHERE workout_id = $1
            ORDER BY version_number DESC
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
