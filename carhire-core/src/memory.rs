use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;
use carhire_booking::{Booking, BookingStatus, RentalPeriod};
use carhire_catalog::Car;

use crate::identity::{Role, User};
use crate::repository::{
    BookingRepository, CarRepository, InsertOutcome, StoreError, StoreResult, UserRepository,
};

/// In-process store backing every repository trait.
///
/// Used by tests and by `storage.backend = "memory"`. Each collection sits
/// behind its own lock; `insert_if_vacant` holds the bookings write lock
/// across the overlap check and the insert.
#[derive(Default)]
pub struct MemoryStore {
    cars: RwLock<HashMap<Uuid, Car>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    users: RwLock<HashMap<Uuid, User>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with [`StoreError::Unavailable`] until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Seeds a booking without any conflict check, for fixtures.
    pub async fn put_booking(&self, booking: Booking) {
        self.bookings.write().await.insert(booking.id, booking);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    bookings
}

fn oldest_first(mut cars: Vec<Car>) -> Vec<Car> {
    cars.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    cars
}

#[async_trait]
impl CarRepository for MemoryStore {
    async fn create_car(&self, car: &Car) -> StoreResult<()> {
        self.ensure_online()?;
        let mut cars = self.cars.write().await;
        if cars.contains_key(&car.id) {
            return Err(StoreError::Duplicate(format!("car {}", car.id)));
        }
        cars.insert(car.id, car.clone());
        Ok(())
    }

    async fn get_car(&self, id: Uuid) -> StoreResult<Option<Car>> {
        self.ensure_online()?;
        Ok(self.cars.read().await.get(&id).cloned())
    }

    async fn list_listed_cars(&self, location: Option<&str>) -> StoreResult<Vec<Car>> {
        self.ensure_online()?;
        let cars = self.cars.read().await;
        let listed = cars
            .values()
            .filter(|car| car.is_available)
            .filter(|car| location.map_or(true, |loc| car.location == loc))
            .cloned()
            .collect();
        Ok(oldest_first(listed))
    }

    async fn list_owner_cars(&self, owner_id: Uuid) -> StoreResult<Vec<Car>> {
        self.ensure_online()?;
        let cars = self.cars.read().await;
        let owned = cars.values().filter(|car| car.owner_id == owner_id).cloned().collect();
        Ok(oldest_first(owned))
    }

    async fn set_car_availability(&self, id: Uuid, is_available: bool) -> StoreResult<()> {
        self.ensure_online()?;
        if let Some(car) = self.cars.write().await.get_mut(&id) {
            car.is_available = is_available;
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find_conflicts(
        &self,
        car_ids: &[Uuid],
        period: &RentalPeriod,
    ) -> StoreResult<Vec<Booking>> {
        self.ensure_online()?;
        let bookings = self.bookings.read().await;
        let mut conflicts: Vec<Booking> = bookings
            .values()
            .filter(|b| car_ids.contains(&b.car_id) && b.blocks(period))
            .cloned()
            .collect();
        conflicts.sort_by(|a, b| a.pickup_date.cmp(&b.pickup_date).then(a.id.cmp(&b.id)));
        Ok(conflicts)
    }

    async fn insert_if_vacant(&self, booking: &Booking) -> StoreResult<InsertOutcome> {
        self.ensure_online()?;
        let mut bookings = self.bookings.write().await;
        let period = booking.period();
        let conflicts: Vec<Booking> = bookings
            .values()
            .filter(|b| b.car_id == booking.car_id && b.blocks(&period))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Ok(InsertOutcome::Conflict(conflicts));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        self.ensure_online()?;
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_user_bookings(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        self.ensure_online()?;
        let bookings = self.bookings.read().await;
        Ok(newest_first(bookings.values().filter(|b| b.user_id == user_id).cloned().collect()))
    }

    async fn list_owner_bookings(&self, owner_id: Uuid) -> StoreResult<Vec<Booking>> {
        self.ensure_online()?;
        let bookings = self.bookings.read().await;
        Ok(newest_first(bookings.values().filter(|b| b.owner_id == owner_id).cloned().collect()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> StoreResult<Option<Booking>> {
        self.ensure_online()?;
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            Some(booking) if booking.status == expected => {
                booking.status = next;
                booking.updated_at = Utc::now();
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        self.ensure_online()?;
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email already registered".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        self.ensure_online()?;
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carhire_catalog::{CarCategory, FuelType, NewCar, Transmission};

    fn car(location: &str) -> Car {
        NewCar {
            brand: "Kia".to_string(),
            model: "Soul".to_string(),
            year: 2023,
            category: CarCategory::Suv,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Electric,
            seating_capacity: 5,
            price_per_day: 8_000,
            location: location.to_string(),
            description: String::new(),
            image_url: None,
        }
        .into_car(Uuid::new_v4())
    }

    fn booking_for(car: &Car, pickup: &str, ret: &str) -> Booking {
        Booking::for_car(car, Uuid::new_v4(), RentalPeriod::parse(pickup, ret).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_if_vacant_rejects_overlap_only_on_same_car() {
        let store = MemoryStore::new();
        let a = car("Chicago");
        let b = car("Chicago");

        let first = booking_for(&a, "2025-06-01", "2025-06-05");
        assert_eq!(store.insert_if_vacant(&first).await.unwrap(), InsertOutcome::Inserted);

        let clash = booking_for(&a, "2025-06-03", "2025-06-04");
        match store.insert_if_vacant(&clash).await.unwrap() {
            InsertOutcome::Conflict(found) => assert_eq!(found, vec![first.clone()]),
            other => panic!("expected conflict, got {:?}", other),
        }

        let other_car = booking_for(&b, "2025-06-03", "2025-06-04");
        assert_eq!(store.insert_if_vacant(&other_car).await.unwrap(), InsertOutcome::Inserted);

        let back_to_back = booking_for(&a, "2025-06-05", "2025-06-06");
        assert_eq!(store.insert_if_vacant(&back_to_back).await.unwrap(), InsertOutcome::Inserted);
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_the_dates() {
        let store = MemoryStore::new();
        let a = car("Houston");
        let first = booking_for(&a, "2025-06-01", "2025-06-05");
        store.insert_if_vacant(&first).await.unwrap();

        let cancelled = store
            .update_status(first.id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.unwrap().status, BookingStatus::Cancelled);

        // Stale expectation loses the compare-and-set
        let stale = store
            .update_status(first.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert!(stale.is_none());

        let again = booking_for(&a, "2025-06-02", "2025-06-03");
        assert_eq!(store.insert_if_vacant(&again).await.unwrap(), InsertOutcome::Inserted);
    }

    #[tokio::test]
    async fn test_listed_cars_filter_by_flag_and_location() {
        let store = MemoryStore::new();
        let ny = car("New York");
        let la = car("Los Angeles");
        let mut hidden = car("New York");
        hidden.is_available = false;
        for c in [&ny, &la, &hidden] {
            store.create_car(c).await.unwrap();
        }

        let listed = store.list_listed_cars(Some("New York")).await.unwrap();
        assert_eq!(listed, vec![ny.clone()]);
        assert_eq!(store.list_listed_cars(None).await.unwrap().len(), 2);
        assert!(store.list_listed_cars(Some("Atlantis")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_and_offline_mode() {
        let store = MemoryStore::new();
        let user = User::new("A".to_string(), "a@example.com".to_string(), "h".to_string());
        store.create_user(&user).await.unwrap();

        let twin = User::new("B".to_string(), "a@example.com".to_string(), "h".to_string());
        assert!(matches!(store.create_user(&twin).await, Err(StoreError::Duplicate(_))));

        store.set_offline(true);
        assert!(matches!(store.get_user(user.id).await, Err(StoreError::Unavailable(_))));
        store.set_offline(false);
        assert!(store.get_user(user.id).await.unwrap().is_some());
    }
}
