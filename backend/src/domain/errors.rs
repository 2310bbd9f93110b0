//! Error types shared by all station domain services.
//!
//! Every failure is local and recoverable: the rejected operation leaves the
//! owning service's collections exactly as they were, and the caller turns the
//! error into a user-facing notification.

use serde::{Deserialize, Serialize};

/// Coarse classification of a domain failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationFailed,
    InvalidMeterOrder,
    CapacityExceeded,
    NegativeVolume,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Closing meter ({closing}) is lower than opening meter ({opening})")]
    InvalidMeterOrder { opening: f64, closing: f64 },
    #[error("Tank level {level} exceeds capacity {capacity}")]
    CapacityExceeded { level: f64, capacity: f64 },
    #[error("{field} cannot be negative (got {value})")]
    NegativeVolume { field: &'static str, value: f64 },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

pub type StationResult<T> = Result<T, StationError>;

impl StationError {
    pub fn validation(message: impl Into<String>) -> Self {
        StationError::ValidationFailed(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StationError::NotFound { entity, id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StationError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            StationError::InvalidMeterOrder { .. } => ErrorKind::InvalidMeterOrder,
            StationError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            StationError::NegativeVolume { .. } => ErrorKind::NegativeVolume,
            StationError::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Text for the toast shown by the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            StationError::ValidationFailed(message) => message.clone(),
            StationError::InvalidMeterOrder { .. } => {
                "Closing meter reading must not be lower than the opening reading".to_string()
            }
            StationError::CapacityExceeded { capacity, .. } => {
                format!("Tank level cannot exceed its capacity of {} L", capacity)
            }
            StationError::NegativeVolume { field, .. } => {
                format!("{} must be zero or greater", field.replace('_', " "))
            }
            StationError::NotFound { entity, .. } => format!("{} no longer exists", entity),
        }
    }
}
