//! HTTP routes for the pricing engine.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

use super::models::NewPeakSeasonRate;
use super::requests::{
    GenerateHorizonRequest, PriceQuery, ReplacePeakRatesRequest, SetAvailabilityRequest,
    SetWeekendPeakRequest, StayRequest,
};
use super::responses::{
    AvailabilityChangeResponse, HorizonResponse, PeakRateResponse, PricesResponse,
    WeekendPeakResponse,
};
use super::services;
use super::store::RoomStore;

/// Pricing routes, to be nested under `/api`
pub fn router<S>() -> Router<AppState<S>>
where
    S: RoomStore + 'static,
{
    Router::new()
        .route("/rooms/:room_id/prices", get(get_prices::<S>))
        .route("/rooms/:room_id/availability", put(set_availability::<S>))
        .route(
            "/rooms/:room_id/availability/horizon",
            post(generate_horizon::<S>),
        )
        .route("/rooms/:room_id/availability/hold", post(hold_stay::<S>))
        .route(
            "/rooms/:room_id/availability/release",
            post(release_stay::<S>),
        )
        .route("/rooms/:room_id/peak-rates", put(replace_peak_rates::<S>))
        .route("/rooms/:room_id/weekend-peak", put(set_weekend_peak::<S>))
}

/// Stay quote with both dates, full-horizon calendar with neither
async fn get_prices<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PricesResponse>>
where
    S: RoomStore + 'static,
{
    let response = match (query.check_in.as_deref(), query.check_out.as_deref()) {
        (Some(check_in), Some(check_out)) => {
            let check_in = state.zone.parse_day(check_in)?;
            let check_out = state.zone.parse_day(check_out)?;
            let quote =
                services::quote_stay(state.store.as_ref(), &state.cache, room_id, check_in, check_out)
                    .await?;
            PricesResponse::Stay(quote.into())
        }
        (None, None) => {
            let calendar =
                services::room_calendar(state.store.as_ref(), &state.cache, room_id).await?;
            PricesResponse::Calendar(calendar.into())
        }
        _ => {
            return Err(AppError::InvalidRange(
                "check_in and check_out must be given together".to_string(),
            ))
        }
    };

    Ok(Json(response))
}

async fn set_availability<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<AvailabilityChangeResponse>>
where
    S: RoomStore + 'static,
{
    let start = state.zone.parse_day(&request.start_date)?;
    let end = state.zone.parse_day(&request.end_date)?;
    let affected_days =
        services::set_availability(state.store.as_ref(), room_id, start, end, request.is_available)
            .await?;

    Ok(Json(AvailabilityChangeResponse {
        room_id,
        affected_days,
    }))
}

async fn generate_horizon<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<HorizonResponse>>
where
    S: RoomStore + 'static,
{
    // An empty body means the configured default; anything else must parse.
    let months = if body.is_empty() {
        state.horizon_months
    } else {
        let Json(request) = Json::<GenerateHorizonRequest>::from_bytes(&body)
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
        request.months.unwrap_or(state.horizon_months)
    };
    let start_date = state.zone.today();
    let inserted_days =
        services::generate_availability_horizon(state.store.as_ref(), room_id, start_date, months)
            .await?;

    Ok(Json(HorizonResponse {
        room_id,
        start_date,
        months,
        inserted_days,
    }))
}

async fn hold_stay<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<StayRequest>,
) -> Result<Json<AvailabilityChangeResponse>>
where
    S: RoomStore + 'static,
{
    let check_in = state.zone.parse_day(&request.check_in)?;
    let check_out = state.zone.parse_day(&request.check_out)?;
    let affected_days =
        services::hold_stay(state.store.as_ref(), room_id, check_in, check_out).await?;

    Ok(Json(AvailabilityChangeResponse {
        room_id,
        affected_days,
    }))
}

async fn release_stay<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<StayRequest>,
) -> Result<Json<AvailabilityChangeResponse>>
where
    S: RoomStore + 'static,
{
    let check_in = state.zone.parse_day(&request.check_in)?;
    let check_out = state.zone.parse_day(&request.check_out)?;
    let affected_days =
        services::release_stay(state.store.as_ref(), room_id, check_in, check_out).await?;

    Ok(Json(AvailabilityChangeResponse {
        room_id,
        affected_days,
    }))
}

async fn replace_peak_rates<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<ReplacePeakRatesRequest>,
) -> Result<Json<Vec<PeakRateResponse>>>
where
    S: RoomStore + 'static,
{
    let rates = request
        .rates
        .into_iter()
        .map(|rate| -> Result<NewPeakSeasonRate> {
            Ok(NewPeakSeasonRate {
                start_date: state.zone.parse_day(&rate.start_date)?,
                end_date: state.zone.parse_day(&rate.end_date)?,
                price_change_type: rate.price_change_type,
                price_change_value: rate.price_change_value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let stored =
        services::replace_peak_rates(state.store.as_ref(), &state.cache, room_id, rates).await?;

    Ok(Json(stored.into_iter().map(Into::into).collect()))
}

async fn set_weekend_peak<S>(
    State(state): State<AppState<S>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<SetWeekendPeakRequest>,
) -> Result<Json<WeekendPeakResponse>>
where
    S: RoomStore + 'static,
{
    services::set_weekend_peak(state.store.as_ref(), &state.cache, room_id, request.rule).await?;

    Ok(Json(WeekendPeakResponse {
        room_id,
        weekend_peak: request.rule,
    }))
}
