use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use carhire_catalog::{Car, PricingError};

use crate::period::RentalPeriod;

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Active bookings hold the car and take part in conflict checks.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

/// A customer's reservation of one car over a date range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    /// Copied from the car when the booking is made
    pub owner_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub status: BookingStatus,
    /// Minor currency units (cents)
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// New bookings always start out pending.
    pub fn new(
        car_id: Uuid,
        user_id: Uuid,
        owner_id: Uuid,
        period: RentalPeriod,
        total_price: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            car_id,
            user_id,
            owner_id,
            pickup_date: period.pickup(),
            return_date: period.return_date(),
            status: BookingStatus::Pending,
            total_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Prices the rental from the car's daily rate and takes the owner from the car.
    pub fn for_car(car: &Car, user_id: Uuid, period: RentalPeriod) -> Result<Self, PricingError> {
        let total_price = car.quote(period.days())?;
        Ok(Self::new(car.id, user_id, car.owner_id, period, total_price))
    }

    pub fn period(&self) -> RentalPeriod {
        RentalPeriod::from_stored(self.pickup_date, self.return_date)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// True when this booking holds the car during any day of `period`.
    pub fn blocks(&self, period: &RentalPeriod) -> bool {
        self.is_active() && self.period().overlaps(period)
    }
}
