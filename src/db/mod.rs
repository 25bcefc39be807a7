use crate::config::AppConfig;
use crate::models::{NewTrip, Trip, TripFilter, TripUpdate};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryTripStore;
pub use postgres::PgTripStore;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(config: &AppConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Persistence boundary for trips.
///
/// `update` must fail with [`crate::error::StaleTrip`] when
/// `TripUpdate::expected_notes` is set and no longer matches.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create(&self, trip: NewTrip) -> Result<Trip>;
    async fn update(&self, id: Uuid, update: TripUpdate) -> Result<Trip>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Newest first.
    async fn list(&self, vehicle_id: Uuid, filter: &TripFilter) -> Result<Vec<Trip>>;
}
