//! Pricing service functions with store access.
//!
//! These functions combine the store, the profile cache and the pure
//! calculators. Range validation happens here, before any store round-trip.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::calendar::{ensure_inclusive, ensure_stay, horizon_days, previous_day};
use crate::error::AppError;

use super::calculators::{
    price_days, resolve_range_price, validate_change_value, RangePriceResult,
};
use super::models::{NewPeakSeasonRate, PeakSeasonRate, RoomPricingProfile, WeekendPeakRule};
use super::store::RoomStore;

/// Longest availability horizon a single call may generate
pub const MAX_HORIZON_MONTHS: u32 = 24;

/// Priced stay for a half-open `[check_in, check_out)` range
#[derive(Debug, Clone)]
pub struct StayQuote {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub pricing: RangePriceResult,
}

/// Priced full availability horizon of a room
#[derive(Debug, Clone)]
pub struct RoomCalendar {
    pub room_id: Uuid,
    pub base_price: Decimal,
    pub weekend_peak: Option<WeekendPeakRule>,
    pub pricing: RangePriceResult,
}

/// Load a room's pricing profile, from cache when possible.
///
/// The room row is always read from the store, so a room soft-deleted behind
/// the cache's back stops pricing at once. Only the peak rates are served from
/// the cache. Fails with `RoomNotFound` for missing or soft-deleted rooms.
pub async fn load_profile<S>(
    store: &S,
    cache: &AppCache,
    room_id: Uuid,
) -> Result<Arc<RoomPricingProfile>, AppError>
where
    S: RoomStore + ?Sized,
{
    let Some(room) = store.find_room_by_id(room_id).await? else {
        cache.invalidate_room(room_id).await;
        return Err(AppError::RoomNotFound(room_id));
    };

    if let Some(cached) = cache.pricing_profiles.get(&room_id).await {
        debug!("Cache HIT for pricing profile: {}", room_id);
        return Ok(Arc::new(RoomPricingProfile {
            room,
            peak_rates: cached.peak_rates.clone(),
        }));
    }
    debug!("Cache MISS for pricing profile: {}", room_id);

    let peak_rates = store.find_peak_rates_for_room(room_id, None).await?;

    let profile = Arc::new(RoomPricingProfile { room, peak_rates });
    cache
        .pricing_profiles
        .insert(room_id, Arc::clone(&profile))
        .await;

    Ok(profile)
}

/// Price every night of `[check_in, check_out)` against the stored calendar.
///
/// Read-only: availability flags are reported, never changed.
pub async fn quote_stay<S>(
    store: &S,
    cache: &AppCache,
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<StayQuote, AppError>
where
    S: RoomStore + ?Sized,
{
    ensure_stay(check_in, check_out)?;

    let profile = load_profile(store, cache, room_id).await?;
    let calendar = store
        .find_availability_days(room_id, check_in, check_out)
        .await?;

    let weekend_peak = profile.room.weekend_peak();
    let pricing = resolve_range_price(
        profile.room.base_price,
        &profile.peak_rates,
        &calendar,
        check_in,
        check_out,
        weekend_peak.as_ref(),
    );

    Ok(StayQuote {
        room_id,
        check_in,
        check_out,
        pricing,
    })
}

/// Price the whole stored horizon of a room with the weekend rule only.
pub async fn room_calendar<S>(
    store: &S,
    cache: &AppCache,
    room_id: Uuid,
) -> Result<RoomCalendar, AppError>
where
    S: RoomStore + ?Sized,
{
    let profile = load_profile(store, cache, room_id).await?;
    let calendar = store.find_all_availability_days(room_id).await?;

    let weekend_peak = profile.room.weekend_peak();
    let pricing = price_days(
        profile.room.base_price,
        &[],
        calendar.iter().map(|day| (day.date, day.is_available)),
        weekend_peak.as_ref(),
    );

    Ok(RoomCalendar {
        room_id,
        base_price: profile.room.base_price,
        weekend_peak,
        pricing,
    })
}

/// Seed one available row per day of `[today, today + months)`.
///
/// Existing days are skipped, so re-running only fills the gaps. Returns the
/// number of rows inserted.
pub async fn generate_availability_horizon<S>(
    store: &S,
    room_id: Uuid,
    today: NaiveDate,
    months: u32,
) -> Result<u64, AppError>
where
    S: RoomStore + ?Sized,
{
    if months == 0 || months > MAX_HORIZON_MONTHS {
        return Err(AppError::InvalidRange(format!(
            "horizon must be between 1 and {MAX_HORIZON_MONTHS} months, got {months}"
        )));
    }

    store
        .find_room_by_id(room_id)
        .await?
        .ok_or(AppError::RoomNotFound(room_id))?;

    let days = horizon_days(today, months)?;
    let inserted = store.insert_availability_days(room_id, &days).await?;

    info!(
        "Generated availability horizon for room {}: {} of {} days inserted",
        room_id,
        inserted,
        days.len()
    );
    Ok(inserted)
}

/// Block or unblock every stored day in `[start, end]`.
///
/// Days outside the generated horizon have no row and are skipped; a range
/// entirely outside the horizon is a no-op returning 0.
pub async fn set_availability<S>(
    store: &S,
    room_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    available: bool,
) -> Result<u64, AppError>
where
    S: RoomStore + ?Sized,
{
    ensure_inclusive(start, end)?;

    store
        .find_room_by_id(room_id)
        .await?
        .ok_or(AppError::RoomNotFound(room_id))?;

    let affected = store
        .update_availability(room_id, start, end, available)
        .await?;

    info!(
        "Set availability of room {} for {}..={} to {}: {} days",
        room_id, start, end, available, affected
    );
    Ok(affected)
}

/// Reserve every night of `[check_in, check_out)`, all or nothing.
///
/// Fails with `ConcurrentUpdateConflict` when any night is already taken.
pub async fn hold_stay<S>(
    store: &S,
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<u64, AppError>
where
    S: RoomStore + ?Sized,
{
    ensure_stay(check_in, check_out)?;

    let held = store.hold_availability(room_id, check_in, check_out).await?;
    info!(
        "Held room {} for {}..{}: {} nights",
        room_id, check_in, check_out, held
    );
    Ok(held)
}

/// Give back the nights of `[check_in, check_out)`.
pub async fn release_stay<S>(
    store: &S,
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<u64, AppError>
where
    S: RoomStore + ?Sized,
{
    ensure_stay(check_in, check_out)?;
    set_availability(store, room_id, check_in, previous_day(check_out), true).await
}

/// Replace all peak season rates of a room in one step.
pub async fn replace_peak_rates<S>(
    store: &S,
    cache: &AppCache,
    room_id: Uuid,
    rates: Vec<NewPeakSeasonRate>,
) -> Result<Vec<PeakSeasonRate>, AppError>
where
    S: RoomStore + ?Sized,
{
    for rate in &rates {
        ensure_inclusive(rate.start_date, rate.end_date)?;
        validate_change_value(rate.price_change_value).map_err(AppError::InvalidRule)?;
    }

    let stored = store.replace_peak_rates(room_id, &rates).await?;
    cache.invalidate_room(room_id).await;
    Ok(stored)
}

/// Set or clear the weekend rule of a room.
pub async fn set_weekend_peak<S>(
    store: &S,
    cache: &AppCache,
    room_id: Uuid,
    rule: Option<WeekendPeakRule>,
) -> Result<(), AppError>
where
    S: RoomStore + ?Sized,
{
    if let Some(rule) = &rule {
        validate_change_value(rule.price_change_value).map_err(AppError::InvalidRule)?;
    }

    if !store.set_weekend_peak(room_id, rule).await? {
        return Err(AppError::RoomNotFound(room_id));
    }
    cache.invalidate_room(room_id).await;
    Ok(())
}
