//! Workout history repository

use anyhow::Result;
use chrono::NaiveDate;
use mile_planner_shared::{HistoryEntry, NewHistoryEntry};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// History entry record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub workout_id: String,
    pub date: NaiveDate,
    pub actual_times: Vec<String>,
    pub target_times: Vec<String>,
    pub notes: Option<String>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub rating: i32,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(r: HistoryRecord) -> Self {
        Self {
            id: r.id,
            workout_id: r.workout_id,
            date: r.date,
            actual_times: r.actual_times,
            target_times: r.target_times,
            notes: r.notes,
            weather: r.weather,
            location: r.location,
            rating: r.rating,
        }
    }
}

const COLUMNS: &str =
    "id, account_id, workout_id, date, actual_times, target_times, notes, weather, location, rating";

pub struct HistoryRepository;

impl HistoryRepository {
    /// Insert an entry; usable inside a transaction
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        account_id: Uuid,
        entry: &NewHistoryEntry,
    ) -> Result<HistoryRecord> {
        let sql = format!(
            r#"
            INSERT INTO workout_history
                (account_id, workout_id, date, actual_times, target_times, notes, weather, location, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            COLUMNS
        );
        let record = sqlx::query_as::<_, HistoryRecord>(&sql)
            .bind(account_id)
            .bind(&entry.workout_id)
            .bind(entry.date)
            .bind(&entry.actual_times)
            .bind(&entry.target_times)
            .bind(&entry.notes)
            .bind(&entry.weather)
            .bind(&entry.location)
            .bind(entry.rating)
            .fetch_one(executor)
            .await?;

        Ok(record)
    }

    /// All entries of an account, newest first
    pub async fn list(pool: &PgPool, account_id: Uuid) -> Result<Vec<HistoryRecord>> {
        let sql = format!(
            "SELECT {} FROM workout_history WHERE account_id = $1 ORDER BY date DESC, id DESC",
            COLUMNS
        );
        let records = sqlx::query_as::<_, HistoryRecord>(&sql)
            .bind(account_id)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn list_for_workout(
        pool: &PgPool,
        account_id: Uuid,
        workout_id: &str,
    ) -> Result<Vec<HistoryRecord>> {
        let sql = format!(
            "SELECT {} FROM workout_history WHERE account_id = $1 AND workout_id = $2 \
             ORDER BY date DESC, id DESC",
            COLUMNS
        );
        let records = sqlx::query_as::<_, HistoryRecord>(&sql)
            .bind(account_id)
            .bind(workout_id)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn find(pool: &PgPool, account_id: Uuid, id: Uuid) -> Result<Option<HistoryRecord>> {
        let sql = format!(
            "SELECT {} FROM workout_history WHERE account_id = $1 AND id = $2",
            COLUMNS
        );
        let record = sqlx::query_as::<_, HistoryRecord>(&sql)
            .bind(account_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// Overwrite an entry's editable fields
    pub async fn update(pool: &PgPool, account_id: Uuid, entry: &HistoryEntry) -> Result<Option<HistoryRecord>> {
        let sql = format!(
            r#"
            UPDATE workout_history
            SET date = $3, actual_times = $4, target_times = $5, notes = $6,
                weather = $7, location = $8, rating = $9
            WHERE account_id = $1 AND id = $2
            RETURNING {}
            "#,
            COLUMNS
        );
        let record = sqlx::query_as::<_, HistoryRecord>(&sql)
            .bind(account_id)
            .bind(entry.id)
            .bind(entry.date)
            .bind(&entry.actual_times)
            .bind(&entry.target_times)
            .bind(&entry.notes)
            .bind(&entry.weather)
            .bind(&entry.location)
            .bind(entry.rating)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }
}
