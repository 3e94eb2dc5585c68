pub mod app_config;
pub mod database;
pub mod car_repo;
pub mod booking_repo;
pub mod user_repo;
pub mod redis_repo;

use std::sync::Arc;
use carhire_core::{BookingRepository, CarRepository, MemoryStore, UserRepository};

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use car_repo::PgCarRepository;
pub use booking_repo::PgBookingRepository;
pub use user_repo::PgUserRepository;

/// Repository handles shared by request handlers
#[derive(Clone)]
pub struct Repositories {
    pub cars: Arc<dyn CarRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(db: &DbClient) -> Self {
        Self {
            cars: Arc::new(PgCarRepository::new(db.pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
            users: Arc::new(PgUserRepository::new(db.pool.clone())),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            cars: store.clone(),
            bookings: store.clone(),
            users: store,
        }
    }
}

pub(crate) fn store_error(err: sqlx::Error) -> carhire_core::StoreError {
    use carhire_core::StoreError;

    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Duplicate(db.message().to_string());
        }
    }
    StoreError::Unavailable(err.to_string())
}

pub(crate) const UNIQUE_VIOLATION: &str = "23505";
pub(crate) const EXCLUSION_VIOLATION: &str = "23P01";

#[cfg(test)]
mod tests {
    use super::*;
    use carhire_core::User;

    #[tokio::test]
    async fn test_memory_repositories_share_one_store() {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::memory(store.clone());

        let user = User::new("Sam".to_string(), "sam@example.com".to_string(), "hash".to_string());
        repos.users.create_user(&user).await.unwrap();

        assert!(store.find_user_by_email("sam@example.com").await.unwrap().is_some());
        assert!(repos.cars.list_listed_cars(None).await.unwrap().is_empty());
    }
}
