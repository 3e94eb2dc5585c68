use chrono::Utc;

use crate::models::{Booking, BookingStatus};

impl BookingStatus {
    /// Allowed moves:
    ///
    /// - `pending -> confirmed` (owner accepts)
    /// - `pending -> cancelled`, `confirmed -> cancelled` (user or owner)
    ///
    /// `cancelled` is terminal. Nothing moves back into an active state, so a
    /// status change can never create an overlap between active bookings.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl Booking {
    pub fn transition_to(&mut self, next: BookingStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), TransitionError> {
        self.transition_to(BookingStatus::Confirmed)
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.transition_to(BookingStatus::Cancelled)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid state transition from {from} to {to}")]
pub struct TransitionError {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::RentalPeriod;
    use uuid::Uuid;

    fn pending() -> Booking {
        let period = RentalPeriod::parse("2025-06-01", "2025-06-05").unwrap();
        Booking::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), period, 40_000)
    }

    #[test]
    fn test_booking_lifecycle() {
        let mut booking = pending();

        // Pending -> Confirmed
        booking.confirm().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);

        // Confirmed -> Cancelled
        booking.cancel().unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking.updated_at >= booking.created_at);
    }

    #[test]
    fn test_invalid_transition() {
        let mut booking = pending();
        booking.cancel().unwrap();

        // Cancelled is terminal
        let err = booking.confirm().unwrap_err();
        assert_eq!(err, TransitionError { from: BookingStatus::Cancelled, to: BookingStatus::Confirmed });
        assert_eq!(err.to_string(), "Invalid state transition from cancelled to confirmed");

        let mut booking = pending();
        assert!(booking.transition_to(BookingStatus::Pending).is_err());
    }

    #[test]
    fn test_no_transition_reactivates() {
        let all = [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Cancelled];
        for next in all {
            assert!(!BookingStatus::Cancelled.can_transition_to(next));
        }
    }
}
