//! Vehicle trip logging: start a trip now, complete it later, and report on
//! the results. Lifecycle state and GPS fixes live inside the trip's `notes`
//! text so existing records stay readable.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notes;
pub mod processor;
pub mod telemetry;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use db::{MemoryTripStore, PgTripStore, TripStore};
pub use error::{Result, TripError};
pub use models::{GpsPoint, Trip, TripStatus, TripType, Waypoint, WaypointRole};
pub use notes::{TripMeta, TripNotes};
pub use processor::{CompleteTrip, DirectTrip, StartTrip, TripLifecycle};
