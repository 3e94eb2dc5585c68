use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;
use carhire_booking::{Booking, RentalPeriod};
use carhire_catalog::Car;
use carhire_core::{BookingError, BookingRequest, CallerIdentity};
use carhire_shared::models::events::BookingEventKind;

use crate::error::AppError;
use crate::extract::{field_text, AppJson, AppPath};
use crate::middleware::user_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

// Fields stay loosely typed so a missing or mistyped value reaches the
// domain parsers and comes back as `invalid_date_range` or `car_not_found`.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    #[serde(default)]
    pub location: Value,
    #[serde(default)]
    pub pickup_date: Value,
    #[serde(default)]
    pub return_date: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityResponse {
    pub success: bool,
    pub currency: String,
    pub available_cars: Vec<Car>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub car: Value,
    #[serde(default)]
    pub pickup_date: Value,
    #[serde(default)]
    pub return_date: Value,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub currency: String,
    pub booking: Booking,
}

/// A booking together with the car it reserves. The car is absent only if
/// it has since disappeared from the store.
#[derive(Debug, Serialize)]
pub struct BookingWithCar {
    #[serde(flatten)]
    pub booking: Booking,
    pub car: Option<Car>,
}

#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub success: bool,
    pub currency: String,
    pub bookings: Vec<BookingWithCar>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/bookings/create", post(create_booking))
        .route("/api/bookings/user", get(user_bookings))
        .route("/api/bookings/{id}/cancel", post(cancel_booking))
        .route_layer(from_fn_with_state(state, user_auth_middleware));

    Router::new()
        .route("/api/bookings/check-availability", post(check_availability))
        .merge(protected)
}

/// Looks each distinct car up once.
pub(crate) async fn with_cars(
    state: &AppState,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingWithCar>, AppError> {
    let mut cars: HashMap<Uuid, Option<Car>> = HashMap::new();
    let mut joined = Vec::with_capacity(bookings.len());

    for booking in bookings {
        let car = match cars.get(&booking.car_id) {
            Some(car) => car.clone(),
            None => {
                let car = state.repos.cars.get_car(booking.car_id).await?;
                cars.insert(booking.car_id, car.clone());
                car
            }
        };
        joined.push(BookingWithCar { booking, car });
    }

    Ok(joined)
}

pub async fn check_availability(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckAvailabilityRequest>,
) -> Result<Json<CheckAvailabilityResponse>, AppError> {
    let period = RentalPeriod::parse(&field_text(&payload.pickup_date), &field_text(&payload.return_date))
        .map_err(BookingError::from)?;
    let location = field_text(&payload.location);
    let available_cars = state
        .availability
        .list_available_cars(location.trim(), &period)
        .await?;

    Ok(Json(CheckAvailabilityResponse {
        success: true,
        currency: state.currency(),
        available_cars,
    }))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    AppJson(payload): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let request = BookingRequest::parse(
        &field_text(&payload.car),
        &field_text(&payload.pickup_date),
        &field_text(&payload.return_date),
    )?;
    let today = Utc::now().date_naive();

    let booking = state.creator.create_booking(Some(&caller), request, today).await?;
    state.publish(BookingEventKind::Created, &booking);

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            message: "Booking created".to_string(),
            currency: state.currency(),
            booking,
        }),
    ))
}

pub async fn user_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<BookingsResponse>, AppError> {
    let bookings = state.repos.bookings.list_user_bookings(caller.user_id).await?;
    let bookings = with_cars(&state, bookings).await?;
    Ok(Json(BookingsResponse {
        success: true,
        currency: state.currency(),
        bookings,
    }))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.status.cancel_as_customer(&caller, id).await?;
    state.publish(BookingEventKind::StatusChanged, &booking);

    Ok(Json(BookingResponse {
        success: true,
        message: "Booking cancelled".to_string(),
        currency: state.currency(),
        booking,
    }))
}
