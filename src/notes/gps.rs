//! GPS waypoints stored as line pairs:
//!
//! ```text
//! [Start] 10.123456, 105.123456
//! https://www.google.com/maps?q=10.123456,105.123456
//! ```
//!
//! Writers always use 6 decimals; readers accept any precision.

use super::token::{self, LineToken};
use crate::models::{GpsPoint, Waypoint, WaypointRole};
use tracing::debug;

pub fn label_line(role: WaypointRole, point: GpsPoint) -> String {
    format!("{} {:.6}, {:.6}", role.label(), point.lat, point.lng)
}

pub fn map_link(maps_base_url: &str, point: GpsPoint) -> String {
    format!("{}{:.6},{:.6}", maps_base_url, point.lat, point.lng)
}

/// Appends a label line and its map link, leaving existing text untouched.
pub fn append_waypoint(
    notes: &str,
    role: WaypointRole,
    point: GpsPoint,
    maps_base_url: &str,
) -> String {
    let mut out = String::with_capacity(notes.len() + 96);
    out.push_str(notes);
    if !notes.is_empty() && !notes.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&label_line(role, point));
    out.push('\n');
    out.push_str(&map_link(maps_base_url, point));
    out
}

/// Inserts a label line and its map link after the last existing waypoint
/// pair, or after the metadata prefix when there is none, so user text stays
/// last.
pub fn insert_waypoint(
    notes: &str,
    role: WaypointRole,
    point: GpsPoint,
    maps_base_url: &str,
) -> String {
    if notes.is_empty() {
        return append_waypoint(notes, role, point, maps_base_url);
    }

    let mut lines: Vec<String> = token::lines(notes).map(str::to_string).collect();
    let at = match pairs(notes).last() {
        Some((i, _)) => i + 2,
        None if matches!(token::classify(&lines[0]), LineToken::Meta(_)) => 1,
        None => 0,
    };
    lines.insert(at, map_link(maps_base_url, point));
    lines.insert(at, label_line(role, point));
    lines.join("\n")
}

pub fn parse_waypoints(notes: &str) -> Vec<Waypoint> {
    pairs(notes).into_iter().map(|(_, wp)| wp).collect()
}

/// Removes every recognised label+link pair; other lines keep their order.
pub fn strip_waypoints(notes: &str) -> String {
    let found = pairs(notes);
    if found.is_empty() {
        return notes.to_string();
    }

    let mut skip = found.iter().flat_map(|(i, _)| [*i, i + 1]).peekable();
    token::lines(notes)
        .enumerate()
        .filter(|(i, _)| {
            if skip.peek() == Some(i) {
                skip.next();
                false
            } else {
                true
            }
        })
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same coordinate once both are rounded to 6 decimals.
fn same_point(a: GpsPoint, b: GpsPoint) -> bool {
    let micro = |v: f64| (v * 1e6).round() as i64;
    micro(a.lat) == micro(b.lat) && micro(a.lng) == micro(b.lng)
}

/// Line index of each label that is immediately followed by its link.
fn pairs(notes: &str) -> Vec<(usize, Waypoint)> {
    let lines: Vec<&str> = token::lines(notes).collect();
    let mut found = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if let LineToken::WaypointLabel { role, point } = token::classify(lines[i]) {
            let link = lines.get(i + 1).map(|l| (l, token::classify(l)));
            match link {
                Some((raw, LineToken::WaypointLink(linked))) if same_point(point, linked) => {
                    found.push((
                        i,
                        Waypoint {
                            role,
                            lat: point.lat,
                            lng: point.lng,
                            map_url: raw.trim().to_string(),
                        },
                    ));
                    i += 2;
                    continue;
                }
                _ => debug!("Waypoint label on line {} has no matching map link", i + 1),
            }
        }
        i += 1;
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://maps.example/?q=";

    #[test]
    fn start_then_end_parses_back() {
        let notes = append_waypoint("", WaypointRole::Start, GpsPoint::new(10.123456, 105.123456), BASE);
        let notes = append_waypoint(&notes, WaypointRole::End, GpsPoint::new(10.654321, 105.654321), BASE);

        let wps = parse_waypoints(&notes);
        assert_eq!(wps.len(), 2);
        assert_eq!(wps[0].role, WaypointRole::Start);
        assert_eq!(wps[0].point(), GpsPoint::new(10.123456, 105.123456));
        assert_eq!(wps[0].map_url, "https://maps.example/?q=10.123456,105.123456");
        assert_eq!(wps[1].role, WaypointRole::End);
        assert_eq!(wps[1].point(), GpsPoint::new(10.654321, 105.654321));
    }

    #[test]
    fn append_writes_six_decimals_after_existing_text() {
        let notes = append_waypoint("[TRIPMETA:status=in_progress]", WaypointRole::Start, GpsPoint::new(10.5, -0.25), BASE);
        assert_eq!(
            notes,
            "[TRIPMETA:status=in_progress]\n[Start] 10.500000, -0.250000\nhttps://maps.example/?q=10.500000,-0.250000"
        );
    }

    #[test]
    fn round_trips_with_bases_without_q_param() {
        for base in [
            "https://www.google.com/maps/search/?api=1&query=",
            "https://www.openstreetmap.org/?mlat=",
            "geo:",
        ] {
            let notes = append_waypoint("trip note", WaypointRole::Start, GpsPoint::new(10.123456, 105.123456), base);
            let notes = append_waypoint(&notes, WaypointRole::End, GpsPoint::new(-10.654321, -105.654321), base);

            let wps = parse_waypoints(&notes);
            assert_eq!(wps.len(), 2, "{}", base);
            assert_eq!(wps[0].point(), GpsPoint::new(10.123456, 105.123456));
            assert_eq!(wps[1].point(), GpsPoint::new(-10.654321, -105.654321));
            assert_eq!(wps[1].map_url, format!("{}-10.654321,-105.654321", base));
            assert_eq!(strip_waypoints(&notes), "trip note");
        }
    }

    #[test]
    fn insert_keeps_free_text_last() {
        let started = "[TRIPMETA:status=in_progress]\n[Start] 1.000000, 2.000000\nhttps://maps.example/?q=1.000000,2.000000\nđi làm";
        assert_eq!(
            insert_waypoint(started, WaypointRole::End, GpsPoint::new(3.0, 4.0), BASE),
            "[TRIPMETA:status=in_progress]\n[Start] 1.000000, 2.000000\nhttps://maps.example/?q=1.000000,2.000000\n[End] 3.000000, 4.000000\nhttps://maps.example/?q=3.000000,4.000000\nđi làm"
        );
        assert_eq!(
            insert_waypoint("[TRIPMETA:status=in_progress]\nđi làm", WaypointRole::End, GpsPoint::new(3.0, 4.0), BASE),
            "[TRIPMETA:status=in_progress]\n[End] 3.000000, 4.000000\nhttps://maps.example/?q=3.000000,4.000000\nđi làm"
        );
        assert_eq!(
            insert_waypoint("đi làm", WaypointRole::End, GpsPoint::new(3.0, 4.0), BASE),
            "[End] 3.000000, 4.000000\nhttps://maps.example/?q=3.000000,4.000000\nđi làm"
        );
        assert_eq!(
            insert_waypoint("", WaypointRole::End, GpsPoint::new(3.0, 4.0), BASE),
            "[End] 3.000000, 4.000000\nhttps://maps.example/?q=3.000000,4.000000"
        );
    }

    #[test]
    fn label_without_link_is_not_a_waypoint() {
        let notes = "[Start] 10.000000, 105.000000\nforgot the link";
        assert!(parse_waypoints(notes).is_empty());
        assert_eq!(strip_waypoints(notes), notes);
    }

    #[test]
    fn link_for_other_coordinates_does_not_pair() {
        let notes = "[End] 10.000000, 105.000000\nhttps://maps.example/?q=11.000000,105.000000";
        assert!(parse_waypoints(notes).is_empty());
    }

    #[test]
    fn hand_edited_precision_is_accepted() {
        let notes = "[Start] 10.5, 105.25\nhttps://maps.example/?q=10.500000,105.250000";
        let wps = parse_waypoints(notes);
        assert_eq!(wps.len(), 1);
        assert_eq!(wps[0].lat, 10.5);
    }

    #[test]
    fn unrelated_lines_do_not_interrupt_scan() {
        let notes = "[TRIPMETA:status=completed]\nmorning\n[Start] 1.000000, 2.000000\nhttps://maps.example/?q=1.000000,2.000000\nlunch\n[End] 3.000000, 4.000000\nhttps://maps.example/?q=3.000000,4.000000\nevening";
        let wps = parse_waypoints(notes);
        assert_eq!(wps.len(), 2);
        assert_eq!(
            strip_waypoints(notes),
            "[TRIPMETA:status=completed]\nmorning\nlunch\nevening"
        );
    }

    #[test]
    fn dangling_label_before_real_pair() {
        let notes = "[Start] 1.000000, 2.000000\n[Start] 5.000000, 6.000000\nhttps://maps.example/?q=5.000000,6.000000";
        let wps = parse_waypoints(notes);
        assert_eq!(wps.len(), 1);
        assert_eq!(wps[0].lat, 5.0);
        assert_eq!(strip_waypoints(notes), "[Start] 1.000000, 2.000000");
    }
}
