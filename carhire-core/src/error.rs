use serde::Serialize;
use uuid::Uuid;
use carhire_booking::{PeriodError, TransitionError};
use carhire_catalog::PricingError;

use crate::repository::StoreError;

/// Failures a booking operation hands back to its caller.
///
/// Every variant is per-request; none of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Car not found: {0}")]
    CarNotFound(String),

    #[error("Car {car_id} is not available for the selected dates")]
    BookingConflict {
        car_id: Uuid,
        conflicting: Vec<Uuid>,
    },

    #[error("User is not authenticated")]
    UserNotAuthenticated,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("Not permitted: {0}")]
    NotPermitted(String),
}

/// Machine-readable tag for [`BookingError`]
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidDateRange,
    CarNotFound,
    BookingConflict,
    UserNotAuthenticated,
    StoreUnavailable,
    BookingNotFound,
    InvalidTransition,
    NotPermitted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidDateRange => "invalid_date_range",
            ErrorKind::CarNotFound => "car_not_found",
            ErrorKind::BookingConflict => "booking_conflict",
            ErrorKind::UserNotAuthenticated => "user_not_authenticated",
            ErrorKind::StoreUnavailable => "store_unavailable",
            ErrorKind::BookingNotFound => "booking_not_found",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::NotPermitted => "not_permitted",
        }
    }
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::InvalidDateRange(_) => ErrorKind::InvalidDateRange,
            BookingError::CarNotFound(_) => ErrorKind::CarNotFound,
            BookingError::BookingConflict { .. } => ErrorKind::BookingConflict,
            BookingError::UserNotAuthenticated => ErrorKind::UserNotAuthenticated,
            BookingError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            BookingError::BookingNotFound(_) => ErrorKind::BookingNotFound,
            BookingError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            BookingError::NotPermitted(_) => ErrorKind::NotPermitted,
        }
    }

    /// Text safe to show an end user as-is. Store details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::InvalidDateRange(reason) => reason.clone(),
            BookingError::CarNotFound(_) => "Car not found".to_string(),
            BookingError::BookingConflict { .. } => "Car is not available for the selected dates".to_string(),
            BookingError::UserNotAuthenticated => "Not authorized, please log in".to_string(),
            BookingError::StoreUnavailable(_) => "Service temporarily unavailable, please try again".to_string(),
            BookingError::BookingNotFound(_) => "Booking not found".to_string(),
            BookingError::InvalidTransition(e) => format!("Booking cannot move from {} to {}", e.from, e.to),
            BookingError::NotPermitted(reason) => reason.clone(),
        }
    }

    /// Only store outages are worth retrying, and the caller owns that policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, BookingError::StoreUnavailable(_))
    }
}

impl From<PeriodError> for BookingError {
    fn from(err: PeriodError) -> Self {
        BookingError::InvalidDateRange(err.to_string())
    }
}

impl From<PricingError> for BookingError {
    fn from(err: PricingError) -> Self {
        BookingError::InvalidDateRange(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carhire_booking::BookingStatus;

    #[test]
    fn test_kinds_and_messages() {
        let conflict = BookingError::BookingConflict { car_id: Uuid::nil(), conflicting: vec![] };
        assert_eq!(conflict.kind(), ErrorKind::BookingConflict);
        assert_eq!(conflict.user_message(), "Car is not available for the selected dates");
        assert_eq!(serde_json::to_value(conflict.kind()).unwrap(), "booking_conflict");

        let store = BookingError::from(StoreError::Unavailable("pool timed out".to_string()));
        assert!(store.is_transient());
        assert!(!store.user_message().contains("pool"));

        let transition = BookingError::from(TransitionError {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Confirmed,
        });
        assert_eq!(transition.kind(), ErrorKind::InvalidTransition);
        assert_eq!(transition.user_message(), "Booking cannot move from cancelled to confirmed");
    }

    #[test]
    fn test_period_errors_become_invalid_date_range() {
        let err: BookingError = PeriodError::Unparseable("31/02".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidDateRange);
        assert_eq!(err.user_message(), "'31/02' is not a valid date");
        assert_eq!(ErrorKind::InvalidDateRange.as_str(), "invalid_date_range");
    }
}
