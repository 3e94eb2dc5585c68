use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use carhire_booking::{Booking, BookingStatus};
use carhire_catalog::Car;

const RECENT_BOOKINGS: usize = 5;

/// Summary shown on an owner's dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub total_cars: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub confirmed_bookings: usize,
    pub recent_bookings: Vec<Booking>,
    /// Confirmed bookings made in `today`'s calendar month, minor units
    pub monthly_revenue: i64,
}

impl OwnerDashboard {
    /// `bookings` must be newest first, as the repositories return them.
    pub fn build(cars: &[Car], bookings: Vec<Booking>, today: NaiveDate) -> Self {
        let count = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();

        let monthly_revenue = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .filter(|b| {
                let made = b.created_at.date_naive();
                made.year() == today.year() && made.month() == today.month()
            })
            .map(|b| b.total_price)
            .sum();

        Self {
            total_cars: cars.len(),
            total_bookings: bookings.len(),
            pending_bookings: count(BookingStatus::Pending),
            confirmed_bookings: count(BookingStatus::Confirmed),
            monthly_revenue,
            recent_bookings: bookings.into_iter().take(RECENT_BOOKINGS).collect(),
        }
    }
}
