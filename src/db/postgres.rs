use super::{queries, DbPool, TripStore};
use crate::error::StaleTrip;
use crate::models::{NewTrip, Trip, TripFilter, TripRow, TripUpdate};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::Row;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct PgTripStore {
    pool: DbPool,
}

impl PgTripStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripStore for PgTripStore {
    async fn create(&self, trip: NewTrip) -> Result<Trip> {
        let id = Uuid::new_v4();
        let row: TripRow = sqlx::query_as(queries::INSERT_TRIP)
            .bind(id)
            .bind(trip.vehicle_id)
            .bind(trip.trip_date)
            .bind(trip.trip_time)
            .bind(trip.trip_type.as_str())
            .bind(trip.start_km)
            .bind(trip.end_km)
            .bind(&trip.start_location)
            .bind(&trip.end_location)
            .bind(&trip.notes)
            .bind(trip.distance_km)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted trip {} for vehicle {}", id, trip.vehicle_id);
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, update: TripUpdate) -> Result<Trip> {
        let mut tx = self.pool.begin().await?;

        // Row lock so a concurrent completion sees our notes, not the old ones.
        let current = sqlx::query(queries::SELECT_TRIP_NOTES_FOR_UPDATE)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| anyhow!("trip {} not found", id))?;

        if let Some(expected) = &update.expected_notes {
            let stored: Option<String> = current.try_get("notes")?;
            if stored.as_deref().unwrap_or_default() != expected {
                warn!("Rejecting update of trip {}: notes changed since read", id);
                return Err(StaleTrip { id }.into());
            }
        }

        let row: TripRow = sqlx::query_as(queries::UPDATE_TRIP)
            .bind(id)
            .bind(update.end_km)
            .bind(&update.end_location)
            .bind(&update.notes)
            .bind(update.distance_km)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(queries::DELETE_TRIP)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, vehicle_id: Uuid, filter: &TripFilter) -> Result<Vec<Trip>> {
        let rows: Vec<TripRow> = sqlx::query_as(queries::LIST_TRIPS)
            .bind(vehicle_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.trip_type.map(|t| t.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Trip::from).collect())
    }
}
