use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use carhire_booking::{Booking, BookingStatus, RentalPeriod};
use carhire_core::{BookingRepository, InsertOutcome, StoreError, StoreResult};

use crate::{store_error, EXCLUSION_VIOLATION};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str =
    "id, car_id, user_id, owner_id, pickup_date, return_date, status, total_price, created_at, updated_at";

// Half-open overlap against active bookings: $2 is the pickup, $3 the return
const OVERLAP_FILTER: &str =
    "status IN ('pending', 'confirmed') AND pickup_date < $3 AND return_date > $2";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    car_id: Uuid,
    user_id: Uuid,
    owner_id: Uuid,
    pickup_date: NaiveDate,
    return_date: NaiveDate,
    status: String,
    total_price: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("booking {}: {}", row.id, e)))?;

        Ok(Booking {
            id: row.id,
            car_id: row.car_id,
            user_id: row.user_id,
            owner_id: row.owner_id,
            pickup_date: row.pickup_date,
            return_date: row.return_date,
            status,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

fn is_exclusion_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION))
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_conflicts(
        &self,
        car_ids: &[Uuid],
        period: &RentalPeriod,
    ) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE car_id = ANY($1) AND {} ORDER BY pickup_date, id",
            BOOKING_COLUMNS, OVERLAP_FILTER
        ))
        .bind(car_ids)
        .bind(period.pickup())
        .bind(period.return_date())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn insert_if_vacant(&self, booking: &Booking) -> StoreResult<InsertOutcome> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // Serializes concurrent inserts for the same car until commit
        let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM cars WHERE id = $1 FOR UPDATE")
            .bind(booking.car_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?;

        if locked.is_none() {
            return Err(StoreError::Corrupt(format!("car {} does not exist", booking.car_id)));
        }

        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE car_id = $1 AND {} ORDER BY pickup_date, id",
            BOOKING_COLUMNS, OVERLAP_FILTER
        ))
        .bind(booking.car_id)
        .bind(booking.pickup_date)
        .bind(booking.return_date)
        .fetch_all(&mut *tx)
        .await
        .map_err(store_error)?;

        if !rows.is_empty() {
            tx.rollback().await.map_err(store_error)?;
            return Ok(InsertOutcome::Conflict(into_bookings(rows)?));
        }

        let inserted = sqlx::query(&format!(
            "INSERT INTO bookings ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            BOOKING_COLUMNS
        ))
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(booking.user_id)
        .bind(booking.owner_id)
        .bind(booking.pickup_date)
        .bind(booking.return_date)
        .bind(booking.status.as_str())
        .bind(booking.total_price)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // The exclusion constraint caught an overlap the row lock did not
            Err(e) if is_exclusion_violation(&e) => {
                tracing::warn!(car_id = %booking.car_id, "Booking overlap rejected by exclusion constraint");
                return Ok(InsertOutcome::Conflict(Vec::new()));
            }
            Err(e) => return Err(store_error(e)),
        }

        tx.commit().await.map_err(store_error)?;
        Ok(InsertOutcome::Inserted)
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_user_bookings(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn list_owner_bookings(&self, owner_id: Uuid) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> StoreResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(next.as_str())
        .bind(id)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }
}
