pub mod trip;
pub mod waypoint;

pub use trip::{NewTrip, Trip, TripFilter, TripRow, TripStatus, TripType, TripUpdate};
pub use waypoint::{GpsPoint, Waypoint, WaypointRole};
