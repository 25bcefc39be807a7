//! Read-side filtering, grouping and totals over stored trips.

use super::lifecycle::is_in_progress;
use crate::models::{Trip, TripType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Closed interval of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// `first` 00:00:00 through `last` 23:59:59.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first.and_time(NaiveTime::MIN),
            end: last.and_time(end_of_day()),
        }
    }

    /// The whole calendar month; `None` for an invalid month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::days(first, next.pred_opt()?))
    }

    /// A trip date counts from its midnight.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let at = date.and_time(NaiveTime::MIN);
        self.start <= at && at <= self.end
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(TripType),
}

impl TypeFilter {
    pub fn matches(&self, trip: &Trip) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => trip.trip_type == *t,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TripSummary {
    pub count: usize,
    pub total_distance_km: f64,
}

pub fn filter_by_period<'a>(trips: impl IntoIterator<Item = &'a Trip>, period: &Period) -> Vec<&'a Trip> {
    trips
        .into_iter()
        .filter(|t| period.contains(t.trip_date))
        .collect()
}

pub fn filter_by_type<'a>(trips: impl IntoIterator<Item = &'a Trip>, filter: TypeFilter) -> Vec<&'a Trip> {
    trips.into_iter().filter(|t| filter.matches(t)).collect()
}

pub fn in_progress<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Vec<&'a Trip> {
    trips.into_iter().filter(|t| is_in_progress(t)).collect()
}

/// Groups by trip date, newest date first. Input order is kept inside a group.
pub fn group_by_date<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Vec<(NaiveDate, Vec<&'a Trip>)> {
    let mut groups: BTreeMap<NaiveDate, Vec<&'a Trip>> = BTreeMap::new();
    for trip in trips {
        groups.entry(trip.trip_date).or_default().push(trip);
    }
    groups.into_iter().rev().collect()
}

/// Distance a trip adds to totals; running trips add nothing.
pub fn counted_distance(trip: &Trip) -> f64 {
    if is_in_progress(trip) {
        0.0
    } else {
        trip.distance()
    }
}

pub fn aggregate<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> TripSummary {
    trips.into_iter().fold(TripSummary::default(), |mut acc, trip| {
        acc.count += 1;
        acc.total_distance_km += counted_distance(trip);
        acc
    })
}

pub fn summarize_by_type<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> BTreeMap<TripType, TripSummary> {
    let mut out: BTreeMap<TripType, TripSummary> = BTreeMap::new();
    for trip in trips {
        let entry = out.entry(trip.trip_type).or_default();
        entry.count += 1;
        entry.total_distance_km += counted_distance(trip);
    }
    out
}

/// "Today", "Yesterday", or e.g. "Monday, 15/01/2024".
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%A, %d/%m/%Y").to_string()
    }
}
