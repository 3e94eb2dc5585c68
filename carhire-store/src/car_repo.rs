use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use carhire_catalog::Car;
use carhire_core::{CarRepository, StoreError, StoreResult};

use crate::store_error;

pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CAR_COLUMNS: &str = "id, owner_id, brand, model, year, category, transmission, fuel_type, \
    seating_capacity, price_per_day, location, description, image_url, is_available, created_at";

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    owner_id: Uuid,
    brand: String,
    model: String,
    year: i32,
    category: String,
    transmission: String,
    fuel_type: String,
    seating_capacity: i32,
    price_per_day: i64,
    location: String,
    description: String,
    image_url: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CarRow> for Car {
    type Error = StoreError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        let corrupt = |e: carhire_catalog::CatalogError| StoreError::Corrupt(format!("car {}: {}", row.id, e));
        Ok(Car {
            category: row.category.parse().map_err(corrupt)?,
            transmission: row.transmission.parse().map_err(corrupt)?,
            fuel_type: row.fuel_type.parse().map_err(corrupt)?,
            id: row.id,
            owner_id: row.owner_id,
            brand: row.brand,
            model: row.model,
            year: row.year,
            seating_capacity: row.seating_capacity,
            price_per_day: row.price_per_day,
            location: row.location,
            description: row.description,
            image_url: row.image_url,
            is_available: row.is_available,
            created_at: row.created_at,
        })
    }
}

fn into_cars(rows: Vec<CarRow>) -> StoreResult<Vec<Car>> {
    rows.into_iter().map(Car::try_from).collect()
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn create_car(&self, car: &Car) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cars (id, owner_id, brand, model, year, category, transmission, fuel_type,
                              seating_capacity, price_per_day, location, description, image_url, is_available, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(car.id)
        .bind(car.owner_id)
        .bind(&car.brand)
        .bind(&car.model)
        .bind(car.year)
        .bind(car.category.as_str())
        .bind(car.transmission.as_str())
        .bind(car.fuel_type.as_str())
        .bind(car.seating_capacity)
        .bind(car.price_per_day)
        .bind(&car.location)
        .bind(&car.description)
        .bind(&car.image_url)
        .bind(car.is_available)
        .bind(car.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn get_car(&self, id: Uuid) -> StoreResult<Option<Car>> {
        let row: Option<CarRow> = sqlx::query_as(&format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Car::try_from).transpose()
    }

    async fn list_listed_cars(&self, location: Option<&str>) -> StoreResult<Vec<Car>> {
        let rows: Vec<CarRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cars WHERE is_available AND ($1::TEXT IS NULL OR location = $1) ORDER BY created_at, id",
            CAR_COLUMNS
        ))
        .bind(location)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_cars(rows)
    }

    async fn list_owner_cars(&self, owner_id: Uuid) -> StoreResult<Vec<Car>> {
        let rows: Vec<CarRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cars WHERE owner_id = $1 ORDER BY created_at, id",
            CAR_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_cars(rows)
    }

    async fn set_car_availability(&self, id: Uuid, is_available: bool) -> StoreResult<()> {
        sqlx::query("UPDATE cars SET is_available = $1 WHERE id = $2")
            .bind(is_available)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(())
    }
}
