use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use carhire_booking::{Booking, RentalPeriod};
use carhire_catalog::Car;

use crate::error::BookingError;
use crate::repository::{BookingRepository, CarRepository};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub car_id: Uuid,
    pub available: bool,
    pub conflicting_bookings: Vec<Booking>,
}

/// Read-only availability queries.
///
/// Nothing is locked: a result can go stale as soon as it is returned.
/// [`crate::BookingCreator`] re-checks inside the insert.
#[derive(Clone)]
pub struct AvailabilityChecker {
    cars: Arc<dyn CarRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl AvailabilityChecker {
    pub fn new(cars: Arc<dyn CarRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { cars, bookings }
    }

    /// Single-car check. A car whose listing is switched off is reported
    /// unavailable with no conflicts.
    pub async fn check_availability(
        &self,
        car_id: Uuid,
        period: &RentalPeriod,
    ) -> Result<AvailabilityReport, BookingError> {
        let car = self
            .cars
            .get_car(car_id)
            .await?
            .ok_or_else(|| BookingError::CarNotFound(car_id.to_string()))?;

        if !car.is_available {
            return Ok(AvailabilityReport {
                car_id,
                available: false,
                conflicting_bookings: Vec::new(),
            });
        }

        let conflicting_bookings = self.bookings.find_conflicts(&[car_id], period).await?;
        tracing::debug!(
            car_id = %car_id,
            period = %period,
            conflicts = conflicting_bookings.len(),
            "Checked car availability"
        );

        Ok(AvailabilityReport {
            car_id,
            available: conflicting_bookings.is_empty(),
            conflicting_bookings,
        })
    }

    /// Listed cars at `location` with no active booking overlapping `period`.
    /// An unknown location simply has no candidates.
    pub async fn list_available_cars(
        &self,
        location: &str,
        period: &RentalPeriod,
    ) -> Result<Vec<Car>, BookingError> {
        let candidates = self.cars.list_listed_cars(Some(location)).await?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let ids: Vec<Uuid> = candidates.iter().map(|car| car.id).collect();
        let busy: HashSet<Uuid> = self
            .bookings
            .find_conflicts(&ids, period)
            .await?
            .into_iter()
            .map(|booking| booking.car_id)
            .collect();

        let available: Vec<Car> = candidates
            .into_iter()
            .filter(|car| !busy.contains(&car.id))
            .collect();

        tracing::debug!(
            location,
            period = %period,
            candidates = ids.len(),
            available = available.len(),
            "Listed available cars"
        );

        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::repository::StoreError;
    use carhire_booking::BookingStatus;
    use carhire_catalog::{CarCategory, FuelType, NewCar, Transmission};

    fn car(location: &str) -> Car {
        NewCar {
            brand: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2022,
            category: CarCategory::Sedan,
            transmission: Transmission::Manual,
            fuel_type: FuelType::Petrol,
            seating_capacity: 5,
            price_per_day: 10_000,
            location: location.to_string(),
            description: String::new(),
            image_url: None,
        }
        .into_car(Uuid::new_v4())
    }

    fn period(a: &str, b: &str) -> RentalPeriod {
        RentalPeriod::parse(a, b).unwrap()
    }

    async fn seeded() -> (Arc<MemoryStore>, AvailabilityChecker) {
        let store = Arc::new(MemoryStore::new());
        let checker = AvailabilityChecker::new(store.clone(), store.clone());
        (store, checker)
    }

    async fn book(store: &MemoryStore, car: &Car, a: &str, b: &str, status: BookingStatus) -> Booking {
        let mut booking = Booking::for_car(car, Uuid::new_v4(), period(a, b)).unwrap();
        booking.status = status;
        store.put_booking(booking.clone()).await;
        booking
    }

    #[tokio::test]
    async fn test_single_car_reports_conflicts() {
        let (store, checker) = seeded().await;
        let c = car("New York");
        store.create_car(&c).await.unwrap();
        let existing = book(&store, &c, "2025-06-01", "2025-06-05", BookingStatus::Confirmed).await;

        let report = checker.check_availability(c.id, &period("2025-06-04", "2025-06-06")).await.unwrap();
        assert!(!report.available);
        assert_eq!(report.conflicting_bookings, vec![existing]);

        let report = checker.check_availability(c.id, &period("2025-06-05", "2025-06-07")).await.unwrap();
        assert!(report.available);
        assert!(report.conflicting_bookings.is_empty());
    }

    #[tokio::test]
    async fn test_check_is_idempotent() {
        let (store, checker) = seeded().await;
        let c = car("Chicago");
        store.create_car(&c).await.unwrap();
        book(&store, &c, "2025-06-01", "2025-06-05", BookingStatus::Pending).await;

        let p = period("2025-06-02", "2025-06-03");
        let first = checker.check_availability(c.id, &p).await.unwrap();
        let second = checker.check_availability(c.id, &p).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_and_unlisted_cars() {
        let (store, checker) = seeded().await;
        let p = period("2025-06-01", "2025-06-02");

        let missing = checker.check_availability(Uuid::new_v4(), &p).await;
        assert!(matches!(missing, Err(BookingError::CarNotFound(_))));

        let mut hidden = car("Chicago");
        hidden.is_available = false;
        store.create_car(&hidden).await.unwrap();
        let report = checker.check_availability(hidden.id, &p).await.unwrap();
        assert!(!report.available);
        assert!(report.conflicting_bookings.is_empty());
    }

    #[tokio::test]
    async fn test_list_available_cars_in_new_york() {
        let (store, checker) = seeded().await;
        let free = car("New York");
        let busy = car("New York");
        let cancelled_only = car("New York");
        let elsewhere = car("Los Angeles");
        let mut unlisted = car("New York");
        unlisted.is_available = false;
        for c in [&free, &busy, &cancelled_only, &elsewhere, &unlisted] {
            store.create_car(c).await.unwrap();
        }
        book(&store, &busy, "2025-06-30", "2025-07-02", BookingStatus::Confirmed).await;
        book(&store, &cancelled_only, "2025-07-01", "2025-07-03", BookingStatus::Cancelled).await;
        // ends exactly on the requested pickup
        book(&store, &free, "2025-06-25", "2025-07-01", BookingStatus::Pending).await;

        let cars = checker
            .list_available_cars("New York", &period("2025-07-01", "2025-07-03"))
            .await
            .unwrap();
        let ids: HashSet<Uuid> = cars.iter().map(|c| c.id).collect();

        assert_eq!(ids, HashSet::from([free.id, cancelled_only.id]));
        assert!(cars.iter().all(|c| c.location == "New York"));

        let nowhere = checker.list_available_cars("Atlantis", &period("2025-07-01", "2025-07-03")).await;
        assert!(nowhere.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_is_reported() {
        let (store, checker) = seeded().await;
        store.set_offline(true);
        let result = checker.list_available_cars("New York", &period("2025-07-01", "2025-07-03")).await;
        assert!(matches!(result, Err(BookingError::StoreUnavailable(StoreError::Unavailable(_)))));
    }
}
