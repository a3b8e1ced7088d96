//! Request DTOs for pricing API endpoints.
//!
//! Dates arrive as strings and are parsed in the reference zone by the
//! handlers, so malformed input becomes an `InvalidRange` error rather than a
//! generic deserialization failure.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::{PriceChangeType, WeekendPeakRule};

/// Query for room prices; both dates or neither
#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
}

/// Request to block or unblock an inclusive date range
#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub start_date: String,
    pub end_date: String,
    pub is_available: bool,
}

/// Request to generate the availability horizon
#[derive(Debug, Default, Deserialize)]
pub struct GenerateHorizonRequest {
    #[serde(default)]
    pub months: Option<u32>,
}

/// Request to hold or release a stay
#[derive(Debug, Deserialize)]
pub struct StayRequest {
    pub check_in: String,
    pub check_out: String,
}

/// A peak season rate in the request
#[derive(Debug, Deserialize)]
pub struct PeakRateRequest {
    pub start_date: String,
    pub end_date: String,
    pub price_change_type: PriceChangeType,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_change_value: Decimal,
}

/// Request to replace every peak season rate of a room
#[derive(Debug, Deserialize)]
pub struct ReplacePeakRatesRequest {
    pub rates: Vec<PeakRateRequest>,
}

/// Request to set (or clear, with `null`) the weekend rule
#[derive(Debug, Deserialize)]
pub struct SetWeekendPeakRequest {
    pub rule: Option<WeekendPeakRule>,
}
