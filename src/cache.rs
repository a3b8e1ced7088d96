//! In-memory caching using moka
//!
//! Caches each room's pricing profile (room row plus peak season rates).
//! Availability is never cached: it changes with every hold and block.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::pricing::models::RoomPricingProfile;

const PROFILE_CAPACITY: u64 = 1_000;

/// Application cache holding room pricing profiles
#[derive(Clone)]
pub struct AppCache {
    /// Pricing profiles (room id -> RoomPricingProfile)
    pub pricing_profiles: Cache<Uuid, Arc<RoomPricingProfile>>,
}

impl AppCache {
    /// Create a new cache instance with the given profile TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            // Profiles: 1000 rooms, idle entries dropped after a third of the TTL
            pricing_profiles: Cache::builder()
                .max_capacity(PROFILE_CAPACITY)
                .time_to_live(ttl)
                .time_to_idle(ttl / 3)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pricing_profiles_size: self.pricing_profiles.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.pricing_profiles.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate the cached profile of one room
    pub async fn invalidate_room(&self, room_id: Uuid) {
        self.pricing_profiles.invalidate(&room_id).await;
        info!("Cache invalidated for room: {}", room_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub pricing_profiles_size: u64,
}
