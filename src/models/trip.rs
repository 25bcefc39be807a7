use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Work,
    Business,
    Service,
    Leisure,
    Hometown,
    Other,
}

impl TripType {
    pub const ALL: [TripType; 6] = [
        TripType::Work,
        TripType::Business,
        TripType::Service,
        TripType::Leisure,
        TripType::Hometown,
        TripType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Work => "work",
            TripType::Business => "business",
            TripType::Service => "service",
            TripType::Leisure => "leisure",
            TripType::Hometown => "hometown",
            TripType::Other => "other",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown trip type: {}", s))
    }
}

/// Lifecycle state, derived from the notes metadata prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    InProgress,
    Completed,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(TripStatus::InProgress),
            "completed" => Some(TripStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub trip_type: TripType,
    pub start_km: f64,
    pub end_km: f64,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub notes: String,
    pub distance_km: Option<f64>,
}

impl Trip {
    /// Stored distance, or the odometer difference when none was stored.
    pub fn distance(&self) -> f64 {
        self.distance_km.unwrap_or(self.end_km - self.start_km)
    }
}

/// Raw `trips` row; `trip_type` is free text in the table.
#[derive(Debug, FromRow)]
pub struct TripRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub trip_type: String,
    pub start_km: f64,
    pub end_km: f64,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub notes: Option<String>,
    pub distance_km: Option<f64>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        let trip_type = row.trip_type.parse().unwrap_or_else(|_| {
            warn!("Trip {} has unknown trip_type '{}', using 'other'", row.id, row.trip_type);
            TripType::Other
        });

        Trip {
            id: row.id,
            vehicle_id: row.vehicle_id,
            trip_date: row.trip_date,
            trip_time: row.trip_time,
            trip_type,
            start_km: row.start_km,
            end_km: row.end_km,
            start_location: row.start_location,
            end_location: row.end_location,
            notes: row.notes.unwrap_or_default(),
            distance_km: row.distance_km,
        }
    }
}

/// Field set for `TripStore::create`; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub vehicle_id: Uuid,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub trip_type: TripType,
    pub start_km: f64,
    pub end_km: f64,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub notes: String,
    pub distance_km: Option<f64>,
}

/// Partial update. `None` leaves the stored column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripUpdate {
    pub end_km: Option<f64>,
    pub end_location: Option<String>,
    pub notes: Option<String>,
    pub distance_km: Option<f64>,
    /// When set, the store rejects the update unless the stored notes still equal this.
    pub expected_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub trip_type: Option<TripType>,
}

impl TripFilter {
    pub fn matches(&self, trip: &Trip) -> bool {
        self.from.map_or(true, |from| trip.trip_date >= from)
            && self.to.map_or(true, |to| trip.trip_date <= to)
            && self.trip_type.map_or(true, |t| trip.trip_type == t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(trip_type: &str) -> TripRow {
        TripRow {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            trip_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            trip_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            trip_type: trip_type.to_string(),
            start_km: 100.0,
            end_km: 142.5,
            start_location: Some("Home".to_string()),
            end_location: None,
            notes: None,
            distance_km: None,
        }
    }

    #[test]
    fn trip_type_parses_wire_names() {
        for t in TripType::ALL {
            assert_eq!(t.as_str().parse::<TripType>().unwrap(), t);
        }
        assert!("commute".parse::<TripType>().is_err());
    }

    #[test]
    fn trip_type_serializes_lowercase() {
        let json = serde_json::to_string(&TripType::Hometown).unwrap();
        assert_eq!(json, "\"hometown\"");
    }

    #[test]
    fn row_conversion_tolerates_unknown_type_and_null_notes() {
        let trip = Trip::from(row("roadtrip"));
        assert_eq!(trip.trip_type, TripType::Other);
        assert_eq!(trip.notes, "");
        assert_eq!(trip.distance(), 42.5);
    }

    #[test]
    fn stored_distance_wins_over_odometer() {
        let mut trip = Trip::from(row("work"));
        trip.distance_km = Some(40.0);
        assert_eq!(trip.distance(), 40.0);
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let trip = Trip::from(row("work"));
        let day = trip.trip_date;
        let filter = TripFilter {
            from: Some(day),
            to: Some(day),
            trip_type: Some(TripType::Work),
        };
        assert!(filter.matches(&trip));

        let other_type = TripFilter {
            trip_type: Some(TripType::Leisure),
            ..TripFilter::default()
        };
        assert!(!other_type.matches(&trip));
    }
}
