//! Database models for pricing queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a pricing rule changes the base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "price_change_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PriceChangeType {
    /// `value` is in percentage points of the base price
    Percentage,
    /// `value` is an absolute currency delta
    Nominal,
}

/// Room from rooms
#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub capacity: i32,
    pub total_rooms: i32,
    pub image_urls: Vec<String>,
    pub weekend_peak_type: Option<PriceChangeType>,
    pub weekend_peak_value: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Room {
    /// Soft-deleted rooms are invisible to pricing and availability.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// The room's weekend rule, when both columns are set.
    pub fn weekend_peak(&self) -> Option<WeekendPeakRule> {
        match (self.weekend_peak_type, self.weekend_peak_value) {
            (Some(price_change_type), Some(price_change_value)) => Some(WeekendPeakRule {
                price_change_type,
                price_change_value,
            }),
            _ => None,
        }
    }
}

/// AvailabilityDay from room_availability
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AvailabilityDay {
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub is_available: bool,
}

/// PeakSeasonRate from peak_season_rates
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PeakSeasonRate {
    pub id: Uuid,
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_change_type: PriceChangeType,
    pub price_change_value: Decimal,
    /// Index within the batch the rate was submitted in
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl PeakSeasonRate {
    /// Inclusive on both ends.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// A peak season rate that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPeakSeasonRate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_change_type: PriceChangeType,
    pub price_change_value: Decimal,
}

/// Saturday/Sunday surcharge configured on a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekendPeakRule {
    pub price_change_type: PriceChangeType,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_change_value: Decimal,
}

/// Everything needed to price a room: the room itself plus its peak rates in
/// precedence order. This is the unit cached per room.
#[derive(Debug, Clone)]
pub struct RoomPricingProfile {
    pub room: Room,
    pub peak_rates: Vec<PeakSeasonRate>,
}
