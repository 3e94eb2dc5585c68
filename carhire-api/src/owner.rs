use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use carhire_booking::BookingStatus;
use carhire_catalog::{Car, NewCar};
use carhire_core::{BookingError, CallerIdentity, OwnerDashboard};
use carhire_shared::models::events::BookingEventKind;

use crate::bookings::{with_cars, BookingResponse, BookingsResponse};
use crate::cars::{parse_car_id, CarResponse, CarsResponse};
use crate::error::AppError;
use crate::extract::{field_text, AppJson};
use crate::middleware::owner_auth_middleware;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleCarRequest {
    #[serde(default)]
    pub car_id: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    #[serde(default)]
    pub booking_id: Value,
    #[serde(default)]
    pub status: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub currency: String,
    pub dashboard_data: OwnerDashboard,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/owner/add-car", post(add_car))
        .route("/api/owner/cars", get(owner_cars))
        .route("/api/owner/toggle-car", post(toggle_car))
        .route("/api/owner/bookings", get(owner_bookings))
        .route("/api/owner/change-status", post(change_status))
        .route("/api/owner/dashboard", get(dashboard))
        .route_layer(from_fn_with_state(state, owner_auth_middleware))
}

pub async fn add_car(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    AppJson(payload): AppJson<NewCar>,
) -> Result<(StatusCode, Json<CarResponse>), AppError> {
    payload.validate(Utc::now().year())?;
    let car = payload.into_car(caller.user_id);
    state.repos.cars.create_car(&car).await?;

    tracing::info!(car_id = %car.id, owner_id = %car.owner_id, location = %car.location, "Car listed");
    Ok((
        StatusCode::CREATED,
        Json(CarResponse {
            success: true,
            currency: state.currency(),
            car,
        }),
    ))
}

pub async fn owner_cars(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<CarsResponse>, AppError> {
    let cars = state.repos.cars.list_owner_cars(caller.user_id).await?;
    Ok(Json(CarsResponse {
        success: true,
        currency: state.currency(),
        cars,
    }))
}

/// Flips the listing switch. Existing bookings are untouched.
pub async fn toggle_car(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    AppJson(payload): AppJson<ToggleCarRequest>,
) -> Result<Json<CarResponse>, AppError> {
    let raw = field_text(&payload.car_id);
    let car_id = parse_car_id(&raw)?;
    let mut car: Car = state
        .repos
        .cars
        .get_car(car_id)
        .await?
        .ok_or(BookingError::CarNotFound(raw))?;

    if car.owner_id != caller.user_id {
        return Err(BookingError::NotPermitted("You do not own this car".to_string()).into());
    }

    car.is_available = !car.is_available;
    state.repos.cars.set_car_availability(car.id, car.is_available).await?;

    tracing::info!(car_id = %car.id, is_available = car.is_available, "Car listing toggled");
    Ok(Json(CarResponse {
        success: true,
        currency: state.currency(),
        car,
    }))
}

pub async fn owner_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<BookingsResponse>, AppError> {
    let bookings = state.repos.bookings.list_owner_bookings(caller.user_id).await?;
    let bookings = with_cars(&state, bookings).await?;
    Ok(Json(BookingsResponse {
        success: true,
        currency: state.currency(),
        bookings,
    }))
}

pub async fn change_status(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    AppJson(payload): AppJson<ChangeStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking_id = Uuid::parse_str(field_text(&payload.booking_id).trim())
        .map_err(|_| AppError::Validation("bookingId must be a booking id".to_string()))?;
    let next: BookingStatus = field_text(&payload.status)
        .parse()
        .map_err(|e: carhire_booking::UnknownStatus| AppError::Validation(e.to_string()))?;
    if next == BookingStatus::Pending {
        return Err(AppError::Validation("Status must be confirmed or cancelled".to_string()));
    }

    let booking = state
        .status
        .change_status_as_owner(&caller, booking_id, next)
        .await?;
    state.publish(BookingEventKind::StatusChanged, &booking);

    Ok(Json(BookingResponse {
        success: true,
        message: "Status updated".to_string(),
        currency: state.currency(),
        booking,
    }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<DashboardResponse>, AppError> {
    let cars = state.repos.cars.list_owner_cars(caller.user_id).await?;
    let bookings = state.repos.bookings.list_owner_bookings(caller.user_id).await?;
    let dashboard_data = OwnerDashboard::build(&cars, bookings, Utc::now().date_naive());

    Ok(Json(DashboardResponse {
        success: true,
        currency: state.currency(),
        dashboard_data,
    }))
}
