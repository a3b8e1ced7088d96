//! Room pricing and availability engine.
//!
//! Library half of the `roomrate` service: the pricing engine, its stores and
//! the axum router. The binary wires these to Postgres and the environment.

pub mod cache;
pub mod calendar;
pub mod config;
pub mod error;
pub mod pricing;

use std::sync::Arc;

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::{AppCache, CacheStats};
use crate::calendar::ReferenceZone;
use crate::pricing::{PgRoomStore, RoomStore};

/// Shared application state
pub struct AppState<S = PgRoomStore> {
    pub store: Arc<S>,
    pub cache: AppCache,
    pub zone: ReferenceZone,
    pub horizon_months: u32,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            zone: self.zone,
            horizon_months: self.horizon_months,
        }
    }
}

/// Full HTTP application: pricing routes under `/api` plus health and cache
/// endpoints.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: RoomStore + 'static,
{
    let api = pricing::router::<S>()
        .route("/health", get(health))
        .route("/cache/stats", get(cache_stats::<S>))
        .route("/cache/invalidate", post(invalidate_cache::<S>));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn cache_stats<S>(State(state): State<AppState<S>>) -> Json<CacheStats>
where
    S: RoomStore + 'static,
{
    Json(state.cache.stats())
}

async fn invalidate_cache<S>(State(state): State<AppState<S>>) -> Json<Value>
where
    S: RoomStore + 'static,
{
    state.cache.invalidate_all();
    Json(json!({ "status": "ok" }))
}
