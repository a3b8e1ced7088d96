//! Persistence seam for the pricing engine.
//!
//! Services talk to a [`RoomStore`]; [`PgRoomStore`] backs it with Postgres and
//! [`MemoryRoomStore`](super::memory::MemoryRoomStore) with plain maps.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calendar::night_count;
use crate::error::AppError;

use super::calculators::sort_by_precedence;
use super::models::{AvailabilityDay, NewPeakSeasonRate, PeakSeasonRate, Room, WeekendPeakRule};
use super::queries;

#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Active room by id; soft-deleted rooms read as `None`.
    async fn find_room_by_id(&self, room_id: Uuid) -> Result<Option<Room>, AppError>;

    /// Peak rates in precedence order, optionally only those overlapping the
    /// inclusive range.
    async fn find_peak_rates_for_room(
        &self,
        room_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<PeakSeasonRate>, AppError>;

    /// Stored rows in `[from, until)`, ascending.
    async fn find_availability_days(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AvailabilityDay>, AppError>;

    /// Every stored row of the room, ascending.
    async fn find_all_availability_days(&self, room_id: Uuid)
        -> Result<Vec<AvailabilityDay>, AppError>;

    /// Atomically insert available rows, skipping existing days. Returns the
    /// number inserted.
    async fn insert_availability_days(
        &self,
        room_id: Uuid,
        days: &[NaiveDate],
    ) -> Result<u64, AppError>;

    /// Set the flag on every stored row in `[start, end]`. Returns the number
    /// of rows touched.
    async fn update_availability(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        available: bool,
    ) -> Result<u64, AppError>;

    /// All-or-nothing block of `[from, until)`: every night must exist and be
    /// available, otherwise nothing changes.
    async fn hold_availability(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<u64, AppError>;

    /// Replace the room's peak rates wholesale. Returns the stored set in
    /// precedence order.
    async fn replace_peak_rates(
        &self,
        room_id: Uuid,
        rates: &[NewPeakSeasonRate],
    ) -> Result<Vec<PeakSeasonRate>, AppError>;

    /// Set or clear the weekend rule. Returns `false` if the room is missing.
    async fn set_weekend_peak(
        &self,
        room_id: Uuid,
        rule: Option<WeekendPeakRule>,
    ) -> Result<bool, AppError>;
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn find_room_by_id(&self, room_id: Uuid) -> Result<Option<Room>, AppError> {
        queries::find_room_by_id(&self.pool, room_id).await
    }

    async fn find_peak_rates_for_room(
        &self,
        room_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<PeakSeasonRate>, AppError> {
        queries::find_peak_rates_for_room(&self.pool, room_id, range).await
    }

    async fn find_availability_days(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AvailabilityDay>, AppError> {
        queries::find_availability_days(&self.pool, room_id, from, until).await
    }

    async fn find_all_availability_days(
        &self,
        room_id: Uuid,
    ) -> Result<Vec<AvailabilityDay>, AppError> {
        queries::find_all_availability_days(&self.pool, room_id).await
    }

    async fn insert_availability_days(
        &self,
        room_id: Uuid,
        days: &[NaiveDate],
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let inserted = queries::insert_availability_days(&mut *tx, room_id, days).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn update_availability(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        available: bool,
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        if !queries::lock_room(&mut *tx, room_id).await? {
            return Err(AppError::RoomNotFound(room_id));
        }
        let affected = queries::update_availability(&mut *tx, room_id, start, end, available).await?;
        tx.commit().await?;
        Ok(affected)
    }

    async fn hold_availability(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<u64, AppError> {
        let expected = night_count(from, until);
        let mut tx = self.pool.begin().await?;

        if !queries::lock_room(&mut *tx, room_id).await? {
            return Err(AppError::RoomNotFound(room_id));
        }

        let stored = queries::count_availability_days(&mut *tx, room_id, from, until).await?;
        if u64::try_from(stored).unwrap_or(0) != expected {
            return Err(AppError::InvalidRange(format!(
                "{from}..{until} extends outside the availability horizon"
            )));
        }

        let blocked = queries::block_if_available(&mut *tx, room_id, from, until).await?;
        if blocked != expected {
            debug!(
                "Hold on room {} blocked {}/{} nights, rolling back",
                room_id, blocked, expected
            );
            tx.rollback().await?;
            return Err(AppError::ConcurrentUpdateConflict { room_id });
        }

        tx.commit().await?;
        Ok(blocked)
    }

    async fn replace_peak_rates(
        &self,
        room_id: Uuid,
        rates: &[NewPeakSeasonRate],
    ) -> Result<Vec<PeakSeasonRate>, AppError> {
        let mut tx = self.pool.begin().await?;

        if !queries::lock_room(&mut *tx, room_id).await? {
            return Err(AppError::RoomNotFound(room_id));
        }

        let removed = queries::delete_peak_rates(&mut *tx, room_id).await?;
        let mut stored = Vec::with_capacity(rates.len());
        for (rate, position) in rates.iter().zip(0..) {
            stored.push(queries::insert_peak_rate(&mut *tx, room_id, rate, position).await?);
        }

        tx.commit().await?;
        info!(
            "Replaced peak rates for room {}: removed {}, inserted {}",
            room_id,
            removed,
            stored.len()
        );

        sort_by_precedence(&mut stored);
        Ok(stored)
    }

    async fn set_weekend_peak(
        &self,
        room_id: Uuid,
        rule: Option<WeekendPeakRule>,
    ) -> Result<bool, AppError> {
        let affected = queries::update_weekend_peak(&self.pool, room_id, rule.as_ref()).await?;
        Ok(affected > 0)
    }
}
