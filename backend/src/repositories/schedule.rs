//! Training schedule repository
//!
//! A schedule is stored as a header row, twelve week rows and one row per
//! placement. Edits run inside one transaction that first locks the header
//! row with [`ScheduleRepository::lock_for_update`]; week writes and
//! completions take a `&mut PgConnection` so they can only run inside it.

use crate::repositories::history::{HistoryRecord, HistoryRepository};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use mile_planner_shared::{PendingCompletion, ValidationError, WeekSlot};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::str::FromStr;
use uuid::Uuid;

/// Schedule header record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub training_start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Schedule visible to an account, with the share level when not owned
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleListRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub training_start_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
    pub permission_level: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeekRecord {
    pub id: Uuid,
    pub week_number: i32,
    pub mileage_goal: Option<Decimal>,
    pub actual_mileage: Option<Decimal>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlacementRecord {
    pub id: Uuid,
    pub week_number: i32,
    pub workout_id: String,
    pub position: i32,
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
    pub completed_notes: Option<String>,
}

/// Largest mileage the `NUMERIC(6,2)` columns hold
const MAX_MILEAGE: i64 = 9999;

/// Leading number of free-text mileage, as a browser's `parseFloat` reads it
///
/// `"25 miles"` is 25. Blank text clears the field. Text without a leading
/// number, negative values, values above 9999 and more than two decimal
/// places are rejected rather than stored differently from what was typed.
pub fn parse_mileage(text: &str) -> Result<Option<Decimal>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (int_part, tail) = rest.split_at(int_len);
    let frac_part = tail
        .strip_prefix('.')
        .map(|t| &t[..t.bytes().take_while(u8::is_ascii_digit).count()])
        .unwrap_or("");

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ValidationError::new("mileage", "must start with a number"));
    }
    let literal = format!(
        "{}{}{}",
        if int_part.is_empty() { "0" } else { int_part },
        if frac_part.is_empty() { "" } else { "." },
        frac_part
    );
    let value = Decimal::from_str(&literal)
        .map_err(|_| ValidationError::new("mileage", format!("must be at most {}", MAX_MILEAGE)))?
        .normalize();

    if negative && !value.is_zero() {
        return Err(ValidationError::new("mileage", "must not be negative"));
    }
    if value > Decimal::from(MAX_MILEAGE) {
        return Err(ValidationError::new("mileage", format!("must be at most {}", MAX_MILEAGE)));
    }
    if value.scale() > 2 {
        return Err(ValidationError::new("mileage", "must have at most two decimal places"));
    }
    Ok(Some(value))
}

/// Column value for mileage text already accepted by [`parse_mileage`]
fn stored_mileage(text: Option<&str>) -> Option<Decimal> {
    text.and_then(|t| parse_mileage(t).ok().flatten())
}

pub fn format_mileage(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.normalize().to_string())
}

const HEADER_COLUMNS: &str = "id, owner_id, name, training_start_date, created_at, updated_at";

pub struct ScheduleRepository;

impl ScheduleRepository {
    /// Insert a header and its twelve weeks
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        name: &str,
        start_date: Option<NaiveDate>,
        weeks: &[WeekSlot],
    ) -> Result<ScheduleRecord> {
        let mut tx = pool.begin().await?;

        let sql = format!(
            "INSERT INTO training_schedules (owner_id, name, training_start_date) \
             VALUES ($1, $2, $3) RETURNING {}",
            HEADER_COLUMNS
        );
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(owner_id)
            .bind(name)
            .bind(start_date)
            .fetch_one(&mut *tx)
            .await?;

        for week in weeks {
            sqlx::query(
                r#"
                INSERT INTO schedule_weeks (schedule_id, week_number, mileage_goal, actual_mileage)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(record.id)
            .bind(week.week_number as i32)
            .bind(stored_mileage(week.mileage_goal.as_deref()))
            .bind(stored_mileage(week.actual_mileage.as_deref()))
            .execute(&mut *tx)
            .await?;
        }
        Self::insert_placements(&mut *tx, record.id, weeks).await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Lock a schedule's header row for the rest of the transaction
    ///
    /// Every edit takes this lock before reading the weeks it will rewrite,
    /// so concurrent edits of one schedule apply one after another.
    pub async fn lock_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Option<ScheduleRecord>> {
        let sql = format!(
            "SELECT {} FROM training_schedules WHERE id = $1 FOR UPDATE",
            HEADER_COLUMNS
        );
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record)
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<ScheduleRecord>> {
        let sql = format!("SELECT {} FROM training_schedules WHERE id = $1", HEADER_COLUMNS);
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// Owned and shared schedules, most recently created first
    pub async fn list_for_account(pool: &PgPool, account_id: Uuid) -> Result<Vec<ScheduleListRecord>> {
        let records = sqlx::query_as::<_, ScheduleListRecord>(
            r#"
            SELECT s.id, s.owner_id, s.name, s.training_start_date, s.updated_at,
                   sh.permission_level
            FROM training_schedules s
            LEFT JOIN schedule_shares sh
                ON sh.schedule_id = s.id AND sh.shared_with_account_id = $1
            WHERE s.owner_id = $1 OR sh.id IS NOT NULL
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn load_weeks<'e, E: PgExecutor<'e>>(executor: E, schedule_id: Uuid) -> Result<Vec<WeekRecord>> {
        let records = sqlx::query_as::<_, WeekRecord>(
            r#"
            SELECT id, week_number, mileage_goal, actual_mileage
            FROM schedule_weeks
            WHERE schedule_id = $1
            ORDER BY week_number
            "#,
        )
        .bind(schedule_id)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn load_placements<'e, E: PgExecutor<'e>>(
        executor: E,
        schedule_id: Uuid,
    ) -> Result<Vec<PlacementRecord>> {
        let records = sqlx::query_as::<_, PlacementRecord>(
            r#"
            SELECT sw.id, w.week_number, sw.workout_id, sw.position, sw.completed,
                   sw.completed_date, sw.completed_notes
            FROM schedule_workouts sw
            JOIN schedule_weeks w ON w.id = sw.week_id
            WHERE w.schedule_id = $1
            ORDER BY w.week_number, sw.position
            "#,
        )
        .bind(schedule_id)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn update_header(
        pool: &PgPool,
        id: Uuid,
        name: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Option<ScheduleRecord>> {
        let sql = format!(
            "UPDATE training_schedules SET name = $2, training_start_date = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            HEADER_COLUMNS
        );
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(id)
            .bind(name)
            .bind(start_date)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM training_schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the mileage and placements of the given weeks
    ///
    /// All placements of the affected weeks are deleted before any are
    /// inserted, so an instance moved between two of them keeps its id. Runs
    /// on the caller's transaction, which must hold the schedule lock.
    pub async fn save_weeks(conn: &mut PgConnection, schedule_id: Uuid, weeks: &[WeekSlot]) -> Result<()> {
        for week in weeks {
            sqlx::query(
                r#"
                UPDATE schedule_weeks
                SET mileage_goal = $3, actual_mileage = $4
                WHERE schedule_id = $1 AND week_number = $2
                "#,
            )
            .bind(schedule_id)
            .bind(week.week_number as i32)
            .bind(stored_mileage(week.mileage_goal.as_deref()))
            .bind(stored_mileage(week.actual_mileage.as_deref()))
            .execute(&mut *conn)
            .await?;

            sqlx::query(
                r#"
                DELETE FROM schedule_workouts
                WHERE week_id = (
                    SELECT id FROM schedule_weeks WHERE schedule_id = $1 AND week_number = $2
                )
                "#,
            )
            .bind(schedule_id)
            .bind(week.week_number as i32)
            .execute(&mut *conn)
            .await?;
        }

        Self::insert_placements(conn, schedule_id, weeks).await?;
        Self::touch(conn, schedule_id).await?;
        Ok(())
    }

    async fn insert_placements(
        conn: &mut PgConnection,
        schedule_id: Uuid,
        weeks: &[WeekSlot],
    ) -> Result<()> {
        for week in weeks {
            for (position, placement) in week.workouts.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO schedule_workouts
                        (id, week_id, workout_id, position, completed, completed_date, completed_notes)
                    SELECT $1, w.id, $4, $5, $6, $7, $8
                    FROM schedule_weeks w
                    WHERE w.schedule_id = $2 AND w.week_number = $3
                    "#,
                )
                .bind(placement.instance_id.0)
                .bind(schedule_id)
                .bind(week.week_number as i32)
                .bind(&placement.original_id)
                .bind(position as i32)
                .bind(placement.completed)
                .bind(placement.completed_date)
                .bind(&placement.completed_notes)
                .execute(&mut *conn)
                .await?;
            }
        }
        Ok(())
    }

    async fn touch(conn: &mut PgConnection, schedule_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE training_schedules SET updated_at = NOW() WHERE id = $1")
            .bind(schedule_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Flag a placement completed and append its history entry
    ///
    /// Both writes go to the caller's locked transaction and land together on
    /// commit. Returns `None` when the placement is gone or already
    /// completed; the caller should then roll back.
    pub async fn record_completion(
        conn: &mut PgConnection,
        schedule_id: Uuid,
        account_id: Uuid,
        pending: &PendingCompletion,
    ) -> Result<Option<HistoryRecord>> {
        let flagged = sqlx::query(
            r#"
            UPDATE schedule_workouts sw
            SET completed = TRUE, completed_date = $3, completed_notes = $4
            FROM schedule_weeks w
            WHERE sw.id = $1 AND sw.week_id = w.id AND w.schedule_id = $2 AND NOT sw.completed
            "#,
        )
        .bind(pending.instance_id.0)
        .bind(schedule_id)
        .bind(pending.date)
        .bind(&pending.notes)
        .execute(&mut *conn)
        .await?;

        if flagged.rows_affected() == 0 {
            return Ok(None);
        }

        let record = HistoryRepository::insert(&mut *conn, account_id, &pending.entry).await?;
        Self::touch(conn, schedule_id).await?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(" 25.5 ", Some(Decimal::new(255, 1)))]
    #[case("25 miles", Some(Decimal::new(25, 0)))]
    #[case("25.50", Some(Decimal::new(255, 1)))]
    #[case(".5", Some(Decimal::new(5, 1)))]
    #[case("30.", Some(Decimal::new(30, 0)))]
    #[case("+12", Some(Decimal::new(12, 0)))]
    #[case("9999", Some(Decimal::new(9999, 0)))]
    #[case("", None)]
    #[case("   ", None)]
    fn test_parse_mileage_accepts(#[case] text: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_mileage(text).unwrap(), expected);
    }

    #[rstest]
    #[case("miles")]
    #[case("12345")]
    #[case("25.555")]
    #[case("-3")]
    #[case(".")]
    fn test_parse_mileage_rejects(#[case] text: &str) {
        let err = parse_mileage(text).unwrap_err();
        assert_eq!(err.field, "mileage");
    }

    #[test]
    fn test_stored_mileage_matches_accepted_text() {
        assert_eq!(stored_mileage(Some("25 miles")), Some(Decimal::new(25, 0)));
        assert_eq!(stored_mileage(None), None);
    }

    #[test]
    fn test_format_mileage_drops_trailing_zeros() {
        assert_eq!(format_mileage(Some(Decimal::new(2500, 2))).as_deref(), Some("25"));
        assert_eq!(format_mileage(Some(Decimal::new(255, 1))).as_deref(), Some("25.5"));
        assert_eq!(format_mileage(None), None);
    }
}
