use super::TripStore;
use crate::error::StaleTrip;
use crate::models::{NewTrip, Trip, TripFilter, TripUpdate};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store with the same contract as `PgTripStore`.
#[derive(Debug, Default)]
pub struct MemoryTripStore {
    trips: RwLock<HashMap<Uuid, Trip>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<Trip> {
        self.trips.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.trips.read().await.len()
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn create(&self, trip: NewTrip) -> Result<Trip> {
        let trip = Trip {
            id: Uuid::new_v4(),
            vehicle_id: trip.vehicle_id,
            trip_date: trip.trip_date,
            trip_time: trip.trip_time,
            trip_type: trip.trip_type,
            start_km: trip.start_km,
            end_km: trip.end_km,
            start_location: trip.start_location,
            end_location: trip.end_location,
            notes: trip.notes,
            distance_km: trip.distance_km,
        };
        self.trips.write().await.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn update(&self, id: Uuid, update: TripUpdate) -> Result<Trip> {
        let mut trips = self.trips.write().await;
        let trip = trips
            .get_mut(&id)
            .ok_or_else(|| anyhow!("trip {} not found", id))?;

        if let Some(expected) = &update.expected_notes {
            if trip.notes != *expected {
                return Err(StaleTrip { id }.into());
            }
        }

        if let Some(end_km) = update.end_km {
            trip.end_km = end_km;
        }
        if let Some(end_location) = update.end_location {
            trip.end_location = Some(end_location);
        }
        if let Some(notes) = update.notes {
            trip.notes = notes;
        }
        if let Some(distance_km) = update.distance_km {
            trip.distance_km = Some(distance_km);
        }
        Ok(trip.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.trips.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self, vehicle_id: Uuid, filter: &TripFilter) -> Result<Vec<Trip>> {
        let mut trips: Vec<Trip> = self
            .trips
            .read()
            .await
            .values()
            .filter(|t| t.vehicle_id == vehicle_id && filter.matches(t))
            .cloned()
            .collect();
        trips.sort_by(|a, b| (b.trip_date, b.trip_time).cmp(&(a.trip_date, a.trip_time)));
        Ok(trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripType;
    use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

    fn new_trip(vehicle_id: Uuid, day: u32, hour: u32) -> NewTrip {
        NewTrip {
            vehicle_id,
            trip_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            trip_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            trip_type: TripType::Work,
            start_km: 10.0,
            end_km: 20.0,
            start_location: None,
            end_location: None,
            notes: String::new(),
            distance_km: Some(10.0),
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_vehicle_and_newest_first() {
        let store = MemoryTripStore::new();
        let car = Uuid::new_v4();
        let bike = Uuid::new_v4();
        store.create(new_trip(car, 1, 9)).await.unwrap();
        store.create(new_trip(car, 3, 7)).await.unwrap();
        store.create(new_trip(car, 3, 18)).await.unwrap();
        store.create(new_trip(bike, 2, 9)).await.unwrap();

        let trips = store.list(car, &TripFilter::default()).await.unwrap();
        let order: Vec<_> = trips.iter().map(|t| (t.trip_date.day0(), t.trip_time.hour())).collect();
        assert_eq!(order, vec![(2, 18), (2, 7), (0, 9)]);
    }

    #[tokio::test]
    async fn update_with_stale_notes_is_rejected() {
        let store = MemoryTripStore::new();
        let trip = store.create(new_trip(Uuid::new_v4(), 1, 9)).await.unwrap();

        let err = store
            .update(
                trip.id,
                TripUpdate {
                    notes: Some("new".to_string()),
                    expected_notes: Some("something else".to_string()),
                    ..TripUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<StaleTrip>().is_some());
        assert_eq!(store.get(trip.id).await.unwrap().notes, "");
    }

    #[tokio::test]
    async fn delete_and_missing_update() {
        let store = MemoryTripStore::new();
        let trip = store.create(new_trip(Uuid::new_v4(), 1, 9)).await.unwrap();
        store.delete(trip.id).await.unwrap();
        assert_eq!(store.len().await, 0);
        assert!(store.update(trip.id, TripUpdate::default()).await.is_err());
    }
}
