use std::sync::Arc;
use uuid::Uuid;
use carhire_booking::{Booking, BookingStatus, TransitionError};

use crate::error::BookingError;
use crate::identity::CallerIdentity;
use crate::repository::BookingRepository;

/// Status changes after creation: owners confirm or cancel bookings on
/// their cars, customers cancel their own.
#[derive(Clone)]
pub struct BookingStatusService {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingStatusService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn change_status_as_owner(
        &self,
        caller: &CallerIdentity,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self.load(booking_id).await?;
        if !caller.is_owner() || booking.owner_id != caller.user_id {
            return Err(BookingError::NotPermitted(
                "Only the car's owner can change this booking".to_string(),
            ));
        }
        self.apply(booking, next).await
    }

    pub async fn cancel_as_customer(
        &self,
        caller: &CallerIdentity,
        booking_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.load(booking_id).await?;
        if booking.user_id != caller.user_id {
            return Err(BookingError::NotPermitted(
                "You can only cancel your own bookings".to_string(),
            ));
        }
        self.apply(booking, BookingStatus::Cancelled).await
    }

    async fn load(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.bookings
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))
    }

    async fn apply(&self, booking: Booking, next: BookingStatus) -> Result<Booking, BookingError> {
        let from = booking.status;
        if !from.can_transition_to(next) {
            return Err(TransitionError { from, to: next }.into());
        }

        match self.bookings.update_status(booking.id, from, next).await? {
            Some(updated) => {
                tracing::info!(booking_id = %updated.id, from = %from, to = %next, "Booking status changed");
                Ok(updated)
            }
            None => {
                // Lost a race with another status change; report against what is stored now.
                let current = self.load(booking.id).await?;
                Err(TransitionError { from: current.status, to: next }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::memory::MemoryStore;
    use carhire_booking::RentalPeriod;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: BookingStatusService,
        booking: Booking,
        owner: CallerIdentity,
        customer: CallerIdentity,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let owner = CallerIdentity { user_id: Uuid::new_v4(), role: Role::Owner };
        let customer = CallerIdentity { user_id: Uuid::new_v4(), role: Role::User };
        let period = RentalPeriod::parse("2025-06-01", "2025-06-05").unwrap();
        let booking = Booking::new(Uuid::new_v4(), customer.user_id, owner.user_id, period, 40_000);
        store.put_booking(booking.clone()).await;
        let service = BookingStatusService::new(store.clone());
        Fixture { store, service, booking, owner, customer }
    }

    #[tokio::test]
    async fn test_owner_confirms_then_cancels() {
        let f = fixture().await;

        let confirmed = f.service
            .change_status_as_owner(&f.owner, f.booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let cancelled = f.service
            .change_status_as_owner(&f.owner, f.booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let stored = f.store.get_booking(f.booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_is_terminal() {
        let f = fixture().await;
        f.service.cancel_as_customer(&f.customer, f.booking.id).await.unwrap();

        let revived = f.service
            .change_status_as_owner(&f.owner, f.booking.id, BookingStatus::Confirmed)
            .await;
        assert!(matches!(revived, Err(BookingError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_strangers_are_refused() {
        let f = fixture().await;
        let other_owner = CallerIdentity { user_id: Uuid::new_v4(), role: Role::Owner };

        let by_other_owner = f.service
            .change_status_as_owner(&other_owner, f.booking.id, BookingStatus::Confirmed)
            .await;
        assert!(matches!(by_other_owner, Err(BookingError::NotPermitted(_))));

        let by_stranger = f.service.cancel_as_customer(&other_owner, f.booking.id).await;
        assert!(matches!(by_stranger, Err(BookingError::NotPermitted(_))));

        let missing = f.service.cancel_as_customer(&f.customer, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(BookingError::BookingNotFound(_))));
    }
}
