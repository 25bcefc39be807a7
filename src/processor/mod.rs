pub mod aggregator;
pub mod lifecycle;

pub use aggregator::{Period, TripSummary, TypeFilter};
pub use lifecycle::{CompleteTrip, DirectTrip, StartTrip, TripDuration, TripLifecycle};
