//! Database queries for the pricing engine.
//!
//! Every function takes a generic executor so it can run against the pool or
//! inside a transaction.

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::error::AppError;

use super::models::{AvailabilityDay, NewPeakSeasonRate, PeakSeasonRate, Room, WeekendPeakRule};

/// Get an active (not soft-deleted) room by id
pub async fn find_room_by_id<'e, E>(executor: E, room_id: Uuid) -> Result<Option<Room>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let room = sqlx::query_as::<_, Room>(
        r#"
        SELECT
            id, property_id, name, description, base_price,
            capacity, total_rooms, image_urls,
            weekend_peak_type, weekend_peak_value,
            created_at, deleted_at
        FROM rooms
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(room_id)
    .fetch_optional(executor)
    .await?;

    Ok(room)
}

/// Lock an active room row for the rest of the transaction.
///
/// Serializes availability holds on the same room.
pub async fn lock_room<'e, E>(executor: E, room_id: Uuid) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let locked: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT id
        FROM rooms
        WHERE id = $1
          AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(room_id)
    .fetch_optional(executor)
    .await?;

    Ok(locked.is_some())
}

/// Peak season rates of a room in precedence order, optionally limited to
/// rates overlapping the inclusive range `[from, to]`
pub async fn find_peak_rates_for_room<'e, E>(
    executor: E,
    room_id: Uuid,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<PeakSeasonRate>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let (from, to) = match range {
        Some((from, to)) => (Some(from), Some(to)),
        None => (None, None),
    };

    let rates = sqlx::query_as::<_, PeakSeasonRate>(
        r#"
        SELECT
            id, room_id, start_date, end_date,
            price_change_type, price_change_value, position, created_at
        FROM peak_season_rates
        WHERE room_id = $1
          AND ($2::date IS NULL OR end_date >= $2)
          AND ($3::date IS NULL OR start_date <= $3)
        ORDER BY start_date ASC, created_at ASC, position ASC, id ASC
        "#,
    )
    .bind(room_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    Ok(rates)
}

/// Stored availability rows in `[from, until)`, ascending by date
pub async fn find_availability_days<'e, E>(
    executor: E,
    room_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<AvailabilityDay>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let days = sqlx::query_as::<_, AvailabilityDay>(
        r#"
        SELECT room_id, date, is_available
        FROM room_availability
        WHERE room_id = $1
          AND date >= $2
          AND date < $3
        ORDER BY date ASC
        "#,
    )
    .bind(room_id)
    .bind(from)
    .bind(until)
    .fetch_all(executor)
    .await?;

    Ok(days)
}

/// Every stored availability row of a room, ascending by date
pub async fn find_all_availability_days<'e, E>(
    executor: E,
    room_id: Uuid,
) -> Result<Vec<AvailabilityDay>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let days = sqlx::query_as::<_, AvailabilityDay>(
        r#"
        SELECT room_id, date, is_available
        FROM room_availability
        WHERE room_id = $1
        ORDER BY date ASC
        "#,
    )
    .bind(room_id)
    .fetch_all(executor)
    .await?;

    Ok(days)
}

/// Insert available rows for `days`, skipping days that already exist.
///
/// Returns the number of rows actually inserted.
pub async fn insert_availability_days<'e, E>(
    executor: E,
    room_id: Uuid,
    days: &[NaiveDate],
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO room_availability (room_id, date, is_available)
        SELECT $1, day, TRUE
        FROM UNNEST($2::date[]) AS day
        ON CONFLICT (room_id, date) DO NOTHING
        "#,
    )
    .bind(room_id)
    .bind(days)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Set `is_available` on every stored row in the inclusive range `[start, end]`
pub async fn update_availability<'e, E>(
    executor: E,
    room_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    available: bool,
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE room_availability
        SET is_available = $4
        WHERE room_id = $1
          AND date >= $2
          AND date <= $3
        "#,
    )
    .bind(room_id)
    .bind(start)
    .bind(end)
    .bind(available)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Count stored rows in `[from, until)`
pub async fn count_availability_days<'e, E>(
    executor: E,
    room_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM room_availability
        WHERE room_id = $1
          AND date >= $2
          AND date < $3
        "#,
    )
    .bind(room_id)
    .bind(from)
    .bind(until)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Flip rows in `[from, until)` to unavailable, but only those currently
/// available. The caller compares the affected count with the night count.
pub async fn block_if_available<'e, E>(
    executor: E,
    room_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE room_availability
        SET is_available = FALSE
        WHERE room_id = $1
          AND date >= $2
          AND date < $3
          AND is_available = TRUE
        "#,
    )
    .bind(room_id)
    .bind(from)
    .bind(until)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Remove every peak season rate of a room
pub async fn delete_peak_rates<'e, E>(executor: E, room_id: Uuid) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM peak_season_rates WHERE room_id = $1")
        .bind(room_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Insert one peak season rate at `position` within its batch
pub async fn insert_peak_rate<'e, E>(
    executor: E,
    room_id: Uuid,
    rate: &NewPeakSeasonRate,
    position: i32,
) -> Result<PeakSeasonRate, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let stored = sqlx::query_as::<_, PeakSeasonRate>(
        r#"
        INSERT INTO peak_season_rates
            (id, room_id, start_date, end_date, price_change_type, price_change_value, position)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING
            id, room_id, start_date, end_date,
            price_change_type, price_change_value, position, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(rate.start_date)
    .bind(rate.end_date)
    .bind(rate.price_change_type)
    .bind(rate.price_change_value)
    .bind(position)
    .fetch_one(executor)
    .await?;

    Ok(stored)
}

/// Set or clear the weekend rule of an active room
pub async fn update_weekend_peak<'e, E>(
    executor: E,
    room_id: Uuid,
    rule: Option<&WeekendPeakRule>,
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE rooms
        SET weekend_peak_type = $2,
            weekend_peak_value = $3
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(room_id)
    .bind(rule.map(|r| r.price_change_type))
    .bind(rule.map(|r| r.price_change_value))
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
