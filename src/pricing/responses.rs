//! Response DTOs for pricing API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{AppliedRule, PricedDay};
use super::models::{PeakSeasonRate, PriceChangeType, WeekendPeakRule};
use super::services::{RoomCalendar, StayQuote};

/// One priced day
#[derive(Debug, Serialize)]
pub struct DayPriceResponse {
    pub date: NaiveDate,
    pub is_available: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub applied_rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_rate_id: Option<Uuid>,
}

impl From<&PricedDay> for DayPriceResponse {
    fn from(day: &PricedDay) -> Self {
        let (applied_rule, peak_rate_id) = match day.rule {
            AppliedRule::Base => ("base", None),
            AppliedRule::WeekendPeak => ("weekend_peak", None),
            AppliedRule::PeakSeason(id) => ("peak_season", Some(id)),
        };
        Self {
            date: day.date,
            is_available: day.is_available,
            price: day.price,
            applied_rule,
            peak_rate_id,
        }
    }
}

/// Response for a stay quote
#[derive(Debug, Serialize)]
pub struct StayQuoteResponse {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: usize,
    pub all_available: bool,
    pub dates: Vec<DayPriceResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub average_nightly: Decimal,
}

impl From<StayQuote> for StayQuoteResponse {
    fn from(quote: StayQuote) -> Self {
        Self {
            room_id: quote.room_id,
            check_in: quote.check_in,
            check_out: quote.check_out,
            nights: quote.pricing.nights(),
            all_available: quote.pricing.all_available(),
            dates: quote.pricing.dates.iter().map(Into::into).collect(),
            total: quote.pricing.total,
            average_nightly: quote.pricing.average_nightly(),
        }
    }
}

/// Response for the full-horizon calendar
#[derive(Debug, Serialize)]
pub struct RoomCalendarResponse {
    pub room_id: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    pub weekend_peak: Option<WeekendPeakRule>,
    pub dates: Vec<DayPriceResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl From<RoomCalendar> for RoomCalendarResponse {
    fn from(calendar: RoomCalendar) -> Self {
        Self {
            room_id: calendar.room_id,
            base_price: calendar.base_price,
            weekend_peak: calendar.weekend_peak,
            dates: calendar.pricing.dates.iter().map(Into::into).collect(),
            total: calendar.pricing.total,
        }
    }
}

/// Either shape of `GET /rooms/:id/prices`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PricesResponse {
    Stay(StayQuoteResponse),
    Calendar(RoomCalendarResponse),
}

/// Response for availability mutations
#[derive(Debug, Serialize)]
pub struct AvailabilityChangeResponse {
    pub room_id: Uuid,
    pub affected_days: u64,
}

/// Response for horizon generation
#[derive(Debug, Serialize)]
pub struct HorizonResponse {
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub months: u32,
    pub inserted_days: u64,
}

/// Response for a weekend rule update
#[derive(Debug, Serialize)]
pub struct WeekendPeakResponse {
    pub room_id: Uuid,
    pub weekend_peak: Option<WeekendPeakRule>,
}

/// A stored peak season rate
#[derive(Debug, Serialize)]
pub struct PeakRateResponse {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_change_type: PriceChangeType,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_change_value: Decimal,
}

impl From<PeakSeasonRate> for PeakRateResponse {
    fn from(rate: PeakSeasonRate) -> Self {
        Self {
            id: rate.id,
            start_date: rate.start_date,
            end_date: rate.end_date,
            price_change_type: rate.price_change_type,
            price_change_value: rate.price_change_value,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
}
