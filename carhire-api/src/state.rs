use std::sync::Arc;
use chrono::Utc;
use tokio::sync::broadcast;
use carhire_booking::Booking;
use carhire_core::{AvailabilityChecker, BookingCreator, BookingStatusService};
use carhire_shared::models::events::{BookingEvent, BookingEventKind};
use carhire_store::app_config::BusinessRules;
use carhire_store::{RedisClient, Repositories};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub availability: AvailabilityChecker,
    pub creator: BookingCreator,
    pub status: BookingStatusService,
    pub redis: Option<Arc<RedisClient>>,
    pub sse_tx: broadcast::Sender<BookingEvent>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        redis: Option<Arc<RedisClient>>,
        auth: AuthConfig,
        business_rules: BusinessRules,
    ) -> Self {
        let (sse_tx, _) = broadcast::channel(100);
        let availability = AvailabilityChecker::new(repos.cars.clone(), repos.bookings.clone());
        let creator = BookingCreator::new(repos.cars.clone(), repos.bookings.clone())
            .with_max_rental_days(business_rules.max_rental_days);
        let status = BookingStatusService::new(repos.bookings.clone());

        Self {
            repos,
            availability,
            creator,
            status,
            redis,
            sse_tx,
            auth,
            business_rules,
        }
    }

    /// ISO 4217 code that every money amount in a response is denominated in.
    pub fn currency(&self) -> String {
        self.business_rules.currency.clone()
    }

    /// Fans a booking change out to SSE listeners. Having none is fine.
    pub fn publish(&self, kind: BookingEventKind, booking: &Booking) {
        let event = BookingEvent {
            kind,
            booking_id: booking.id,
            car_id: booking.car_id,
            status: booking.status.to_string(),
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            occurred_at: Utc::now().timestamp(),
        };
        let _ = self.sse_tx.send(event);
    }
}
