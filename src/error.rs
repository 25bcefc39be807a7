use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the trip lifecycle.
///
/// Malformed notes text is never an error: the codec degrades to "absent"
/// instead. Only the mutators validate and reject.
#[derive(Debug, Error)]
pub enum TripError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Trip {id} is not in progress")]
    NotInProgress { id: Uuid },

    #[error("Trip {id} was modified by another writer")]
    Conflict { id: Uuid },

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl TripError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Returned by a store when `TripUpdate::expected_notes` no longer matches
/// the stored record.
#[derive(Debug, Error)]
#[error("stale trip {id}: stored notes changed")]
pub struct StaleTrip {
    pub id: Uuid,
}

pub type Result<T> = std::result::Result<T, TripError>;

/// Lifts a store error, turning a `StaleTrip` into `TripError::Conflict`.
pub(crate) fn from_store(err: anyhow::Error) -> TripError {
    match err.downcast_ref::<StaleTrip>() {
        Some(stale) => TripError::Conflict { id: stale.id },
        None => TripError::Persistence(err),
    }
}
