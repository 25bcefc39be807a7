use crate::clock::Clock;
use crate::config::AppConfig;
use crate::db::TripStore;
use crate::error::{self, Result, TripError};
use crate::models::{
    GpsPoint, NewTrip, Trip, TripFilter, TripStatus, TripType, TripUpdate, WaypointRole,
};
use crate::notes::{metadata, NotesWriter, TripMeta, TripNotes};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct StartTrip {
    pub vehicle_id: Uuid,
    pub start_km: f64,
    pub trip_type: TripType,
    pub start_location: Option<String>,
    pub start_gps: Option<GpsPoint>,
    pub notes: Option<String>,
}

impl StartTrip {
    pub fn new(vehicle_id: Uuid, start_km: f64) -> Self {
        Self {
            vehicle_id,
            start_km,
            trip_type: TripType::Other,
            start_location: None,
            start_gps: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompleteTrip {
    pub end_km: f64,
    pub end_location: Option<String>,
    pub end_gps: Option<GpsPoint>,
}

impl CompleteTrip {
    pub fn new(end_km: f64) -> Self {
        Self {
            end_km,
            end_location: None,
            end_gps: None,
        }
    }
}

/// A trip entered after the fact, with both odometer readings known.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectTrip {
    pub vehicle_id: Uuid,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub trip_type: TripType,
    pub start_km: f64,
    pub end_km: f64,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub start_gps: Option<GpsPoint>,
    pub end_gps: Option<GpsPoint>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripDuration {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Rounded to the nearest minute. Negative when the timestamps are out of order.
    pub minutes: Option<i64>,
}

/// Start/complete state machine over the trip store.
pub struct TripLifecycle {
    store: Arc<dyn TripStore>,
    clock: Arc<dyn Clock>,
    writer: NotesWriter,
    offset: FixedOffset,
}

impl TripLifecycle {
    pub fn new(store: Arc<dyn TripStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            writer: NotesWriter::default(),
            offset: Utc.fix(),
        }
    }

    pub fn from_config(store: Arc<dyn TripStore>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self {
            store,
            clock,
            writer: NotesWriter::new(config.maps_base_url.clone()),
            offset: config.trip_offset(),
        }
    }

    pub async fn start_trip(&self, req: StartTrip) -> Result<Trip> {
        if !req.start_km.is_finite() || req.start_km < 0.0 {
            warn!("Rejected trip start for vehicle {}: start_km {}", req.vehicle_id, req.start_km);
            return Err(TripError::validation("start_km", "must be a non-negative number"));
        }

        let now = self.clock.now();
        let local = now.with_timezone(&self.offset);

        let mut meta = TripMeta::new();
        meta.set_status(TripStatus::InProgress);
        meta.set_started_at(now);

        let waypoints = gps_entry(WaypointRole::Start, req.start_gps);
        let notes = self.writer.compose(Some(&meta), &waypoints, req.notes.as_deref());

        let trip = self
            .store
            .create(NewTrip {
                vehicle_id: req.vehicle_id,
                trip_date: local.date_naive(),
                trip_time: whole_seconds(local.time()),
                trip_type: req.trip_type,
                start_km: req.start_km,
                end_km: req.start_km,
                start_location: clean_location(req.start_location),
                end_location: None,
                notes,
                distance_km: Some(0.0),
            })
            .await?;

        info!("Started trip {} for vehicle {} at {} km", trip.id, trip.vehicle_id, trip.start_km);
        Ok(trip)
    }

    /// Moves an in-progress trip to completed. Validation happens before any
    /// store call; a trip that is not in progress is rejected.
    pub async fn complete_trip(&self, trip: &Trip, req: CompleteTrip) -> Result<Trip> {
        if !req.end_km.is_finite() || req.end_km <= trip.start_km {
            warn!("Rejected completion of trip {}: end_km {} <= start_km {}", trip.id, req.end_km, trip.start_km);
            return Err(TripError::validation(
                "end_km",
                format!("must be greater than start_km ({})", trip.start_km),
            ));
        }

        let parsed = TripNotes::parse(&trip.notes);
        if !parsed.is_in_progress() {
            warn!("Rejected completion of trip {}: not in progress", trip.id);
            return Err(TripError::NotInProgress { id: trip.id });
        }

        let mut meta = parsed.meta().clone();
        meta.set_status(TripStatus::Completed);
        meta.set_completed_at(self.clock.now());

        let mut notes = metadata::replace(&trip.notes, &meta);
        for (role, point) in gps_entry(WaypointRole::End, req.end_gps) {
            notes = self.writer.insert_waypoint(&notes, role, point);
        }

        let completed = self
            .store
            .update(
                trip.id,
                TripUpdate {
                    end_km: Some(req.end_km),
                    end_location: clean_location(req.end_location),
                    notes: Some(notes),
                    distance_km: Some(req.end_km - trip.start_km),
                    expected_notes: Some(trip.notes.clone()),
                },
            )
            .await
            .map_err(error::from_store)?;

        info!(
            "Completed trip {} for vehicle {}: {} km",
            completed.id,
            completed.vehicle_id,
            completed.distance()
        );
        Ok(completed)
    }

    /// Creates a trip that is complete from the start; no metadata prefix is written.
    pub async fn direct_create(&self, req: DirectTrip) -> Result<Trip> {
        if !req.start_km.is_finite() || req.start_km < 0.0 {
            return Err(TripError::validation("start_km", "must be a non-negative number"));
        }
        if !req.end_km.is_finite() || req.end_km < req.start_km {
            warn!("Rejected trip for vehicle {}: end_km {} < start_km {}", req.vehicle_id, req.end_km, req.start_km);
            return Err(TripError::validation(
                "end_km",
                format!("must not be less than start_km ({})", req.start_km),
            ));
        }

        let mut waypoints = gps_entry(WaypointRole::Start, req.start_gps);
        waypoints.extend(gps_entry(WaypointRole::End, req.end_gps));
        let notes = self.writer.compose(None, &waypoints, req.notes.as_deref());

        let trip = self
            .store
            .create(NewTrip {
                vehicle_id: req.vehicle_id,
                trip_date: req.trip_date,
                trip_time: req.trip_time,
                trip_type: req.trip_type,
                start_km: req.start_km,
                end_km: req.end_km,
                start_location: clean_location(req.start_location),
                end_location: clean_location(req.end_location),
                notes,
                distance_km: Some(req.end_km - req.start_km),
            })
            .await?;

        info!("Recorded trip {} for vehicle {}: {} km", trip.id, trip.vehicle_id, trip.distance());
        Ok(trip)
    }

    pub async fn list(&self, vehicle_id: Uuid, filter: &TripFilter) -> Result<Vec<Trip>> {
        Ok(self.store.list(vehicle_id, filter).await?)
    }

    /// Most recent in-progress trip of the vehicle, for resuming in a new session.
    pub async fn active_trip(&self, vehicle_id: Uuid) -> Result<Option<Trip>> {
        let trips = self.store.list(vehicle_id, &TripFilter::default()).await?;
        Ok(trips.into_iter().find(is_in_progress))
    }

    /// Minutes since the trip started, using this lifecycle's clock.
    pub fn elapsed_minutes(&self, trip: &Trip) -> Option<i64> {
        elapsed_minutes(trip, self.clock.now())
    }
}

pub fn is_in_progress(trip: &Trip) -> bool {
    metadata::decode(&trip.notes).status() == Some(TripStatus::InProgress)
}

pub fn duration(trip: &Trip) -> TripDuration {
    let meta = metadata::decode(&trip.notes);
    let started_at = meta.started_at();
    let completed_at = meta.completed_at();
    let minutes = match (started_at, completed_at) {
        (Some(start), Some(end)) => {
            if end < start {
                warn!("Trip {} completedAt precedes startedAt", trip.id);
            }
            Some(round_minutes(end - start))
        }
        _ => None,
    };

    TripDuration {
        started_at,
        completed_at,
        minutes,
    }
}

/// Live duration of a running trip; `None` once completed or without a start time.
pub fn elapsed_minutes(trip: &Trip, now: DateTime<Utc>) -> Option<i64> {
    let meta = metadata::decode(&trip.notes);
    if meta.status() != Some(TripStatus::InProgress) {
        return None;
    }
    meta.started_at().map(|start| round_minutes(now - start))
}

fn round_minutes(span: chrono::Duration) -> i64 {
    // Halves round up, -30.5 becomes -30.
    (span.num_milliseconds() as f64 / 60_000.0 + 0.5).floor() as i64
}

fn gps_entry(role: WaypointRole, point: Option<GpsPoint>) -> Vec<(WaypointRole, GpsPoint)> {
    match point {
        Some(p) if p.is_valid() => vec![(role, p)],
        Some(p) => {
            warn!("Dropping invalid {:?} GPS fix ({}, {})", role, p.lat, p.lng);
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn clean_location(location: Option<String>) -> Option<String> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

fn whole_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}
