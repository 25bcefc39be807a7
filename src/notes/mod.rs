//! Everything the trip lifecycle keeps in the free-text `notes` column.
//!
//! Canonical write order is the metadata prefix line, then waypoint line
//! pairs, then user text. Readers scan line by line and accept any order.

pub mod gps;
pub mod metadata;
pub mod token;

pub use metadata::TripMeta;

use crate::models::{GpsPoint, TripStatus, Waypoint, WaypointRole};

/// Parsed view over a notes blob.
#[derive(Debug, Clone, PartialEq)]
pub struct TripNotes {
    meta: TripMeta,
    waypoints: Vec<Waypoint>,
    free_text: String,
}

impl TripNotes {
    pub fn parse(notes: &str) -> Self {
        let meta = metadata::decode(notes);
        let waypoints = gps::parse_waypoints(notes);
        let free_text = gps::strip_waypoints(&metadata::strip(notes))
            .trim()
            .to_string();

        Self {
            meta,
            waypoints,
            free_text,
        }
    }

    pub fn meta(&self) -> &TripMeta {
        &self.meta
    }

    /// No decodable status means the trip was created complete.
    pub fn status(&self) -> TripStatus {
        self.meta.status().unwrap_or(TripStatus::Completed)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status() == TripStatus::InProgress
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Last waypoint recorded for `role`.
    pub fn waypoint(&self, role: WaypointRole) -> Option<&Waypoint> {
        self.waypoints.iter().rev().find(|w| w.role == role)
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }
}

/// Produces notes text in canonical order.
#[derive(Debug, Clone)]
pub struct NotesWriter {
    maps_base_url: String,
}

impl NotesWriter {
    pub fn new(maps_base_url: impl Into<String>) -> Self {
        Self {
            maps_base_url: maps_base_url.into(),
        }
    }

    pub fn compose(
        &self,
        meta: Option<&TripMeta>,
        waypoints: &[(WaypointRole, GpsPoint)],
        free_text: Option<&str>,
    ) -> String {
        let mut notes = meta.map(metadata::encode).unwrap_or_default();
        for (role, point) in waypoints {
            notes = self.append_waypoint(&notes, *role, *point);
        }
        match free_text {
            Some(text) => append_text(&notes, text),
            None => notes,
        }
    }

    pub fn append_waypoint(&self, notes: &str, role: WaypointRole, point: GpsPoint) -> String {
        gps::append_waypoint(notes, role, point, &self.maps_base_url)
    }

    /// Adds a waypoint after the existing ones, ahead of any user text.
    pub fn insert_waypoint(&self, notes: &str, role: WaypointRole, point: GpsPoint) -> String {
        gps::insert_waypoint(notes, role, point, &self.maps_base_url)
    }
}

impl Default for NotesWriter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAPS_BASE_URL)
    }
}

fn append_text(notes: &str, text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        notes.to_string()
    } else if notes.is_empty() {
        text.to_string()
    } else {
        format!("{}\n{}", notes, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "[TRIPMETA:status=completed,startedAt=2024-01-01T08:00:00Z,completedAt=2024-01-01T08:30:00Z]\n[Start] 10.000000, 105.000000\nhttps://maps.example/?q=10.000000,105.000000\nGhi chú test";

    #[test]
    fn parses_meta_waypoint_and_text() {
        let notes = TripNotes::parse(SCENARIO);
        assert_eq!(notes.status(), TripStatus::Completed);
        assert_eq!(notes.meta().get("completedAt"), Some("2024-01-01T08:30:00Z"));
        assert_eq!(notes.waypoints().len(), 1);
        assert_eq!(notes.waypoints()[0].role, WaypointRole::Start);
        assert!(notes.waypoint(WaypointRole::End).is_none());
        assert_eq!(notes.free_text(), "Ghi chú test");
        assert_eq!(
            gps::strip_waypoints(&metadata::strip(SCENARIO)),
            "Ghi chú test"
        );
    }

    #[test]
    fn malformed_prefix_defaults_to_completed() {
        let notes = TripNotes::parse("[TRIPMETA:status=");
        assert!(notes.meta().is_empty());
        assert!(!notes.is_in_progress());
        assert_eq!(notes.free_text(), "[TRIPMETA:status=");
    }

    #[test]
    fn compose_writes_canonical_order() {
        let writer = NotesWriter::new("https://maps.example/?q=");
        let mut meta = TripMeta::new();
        meta.set_status(TripStatus::InProgress);

        let notes = writer.compose(
            Some(&meta),
            &[(WaypointRole::Start, GpsPoint::new(1.0, 2.0))],
            Some("  đi làm  "),
        );
        assert_eq!(
            notes,
            "[TRIPMETA:status=in_progress]\n[Start] 1.000000, 2.000000\nhttps://maps.example/?q=1.000000,2.000000\nđi làm"
        );
        assert!(TripNotes::parse(&notes).is_in_progress());
    }

    #[test]
    fn compose_without_anything_is_empty() {
        assert_eq!(NotesWriter::default().compose(None, &[], Some("   ")), "");
    }
}
