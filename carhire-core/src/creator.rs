use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;
use carhire_booking::{Booking, RentalPeriod};

use crate::error::BookingError;
use crate::identity::{require_caller, CallerIdentity};
use crate::repository::{BookingRepository, CarRepository, InsertOutcome};

/// A booking request after boundary parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRequest {
    pub car_id: Uuid,
    pub period: RentalPeriod,
}

impl BookingRequest {
    /// Unparseable, missing (empty) or inverted dates are reported as
    /// `InvalidDateRange`, an unparseable car id as `CarNotFound`. Dates are
    /// checked first.
    pub fn parse(car: &str, pickup_date: &str, return_date: &str) -> Result<Self, BookingError> {
        let period = RentalPeriod::parse(pickup_date, return_date)?;
        let car_id = Uuid::parse_str(car.trim()).map_err(|_| BookingError::CarNotFound(car.to_string()))?;
        Ok(Self { car_id, period })
    }
}

#[derive(Clone)]
pub struct BookingCreator {
    cars: Arc<dyn CarRepository>,
    bookings: Arc<dyn BookingRepository>,
    max_rental_days: Option<i64>,
}

impl BookingCreator {
    pub fn new(cars: Arc<dyn CarRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self {
            cars,
            bookings,
            max_rental_days: None,
        }
    }

    pub fn with_max_rental_days(mut self, days: i64) -> Self {
        self.max_rental_days = Some(days);
        self
    }

    /// Creates a pending booking for the caller.
    ///
    /// `today` is the server's current date. The conflict check runs inside
    /// the store's conditional insert, so of two overlapping requests racing
    /// for the same car exactly one succeeds.
    pub async fn create_booking(
        &self,
        caller: Option<&CallerIdentity>,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let caller = require_caller(caller)?;
        let period = request.period;
        period.ensure_not_past(today)?;

        if let Some(max) = self.max_rental_days {
            if period.days() > max {
                return Err(BookingError::InvalidDateRange(format!(
                    "Rentals are limited to {} days",
                    max
                )));
            }
        }

        let car = self
            .cars
            .get_car(request.car_id)
            .await?
            .filter(|car| car.is_available)
            .ok_or_else(|| BookingError::CarNotFound(request.car_id.to_string()))?;

        let booking = Booking::for_car(&car, caller.user_id, period)?;

        match self.bookings.insert_if_vacant(&booking).await? {
            InsertOutcome::Inserted => {
                tracing::info!(
                    booking_id = %booking.id,
                    car_id = %car.id,
                    period = %period,
                    total_price = booking.total_price,
                    "Booking created"
                );
                Ok(booking)
            }
            InsertOutcome::Conflict(existing) => {
                tracing::info!(
                    car_id = %car.id,
                    period = %period,
                    conflicts = existing.len(),
                    "Booking rejected: dates taken"
                );
                Err(BookingError::BookingConflict {
                    car_id: car.id,
                    conflicting: existing.into_iter().map(|b| b.id).collect(),
                })
            }
        }
    }
}
