use async_trait::async_trait;
use uuid::Uuid;
use carhire_booking::{Booking, BookingStatus, RentalPeriod};
use carhire_catalog::Car;

use crate::identity::{Role, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a conditional booking insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted,
    /// Active bookings on the same car that overlap the requested period
    Conflict(Vec<Booking>),
}

/// Repository trait for the car catalog
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn create_car(&self, car: &Car) -> StoreResult<()>;

    async fn get_car(&self, id: Uuid) -> StoreResult<Option<Car>>;

    /// Cars with the availability flag set, optionally limited to one location.
    /// Ordered by creation time.
    async fn list_listed_cars(&self, location: Option<&str>) -> StoreResult<Vec<Car>>;

    async fn list_owner_cars(&self, owner_id: Uuid) -> StoreResult<Vec<Car>>;

    async fn set_car_availability(&self, id: Uuid, is_available: bool) -> StoreResult<()>;
}

/// Repository trait for bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Active bookings on any of `car_ids` that overlap `period`.
    async fn find_conflicts(
        &self,
        car_ids: &[Uuid],
        period: &RentalPeriod,
    ) -> StoreResult<Vec<Booking>>;

    /// Inserts `booking` unless an active booking on the same car overlaps it.
    ///
    /// Implementations must run the overlap check and the insert as one
    /// atomic unit with respect to other inserts for the same car.
    async fn insert_if_vacant(&self, booking: &Booking) -> StoreResult<InsertOutcome>;

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    /// Newest first
    async fn list_user_bookings(&self, user_id: Uuid) -> StoreResult<Vec<Booking>>;

    /// Newest first
    async fn list_owner_bookings(&self, owner_id: Uuid) -> StoreResult<Vec<Booking>>;

    /// Moves a booking to `next` only if its current status is still `expected`.
    /// Returns the updated booking, or `None` when the status had already changed.
    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> StoreResult<Option<Booking>>;
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn create_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>>;
}
