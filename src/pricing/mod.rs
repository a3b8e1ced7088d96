//! Pricing engine module for room rentals.
//!
//! Resolves nightly room prices from base price, weekend rule and peak season
//! rates, and keeps the per-day availability calendar of each room.

pub mod calculators;
pub mod memory;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used items
pub use calculators::{resolve_daily_price, resolve_range_price, round_money};
pub use memory::MemoryRoomStore;
pub use routes::router;
pub use store::{PgRoomStore, RoomStore};
