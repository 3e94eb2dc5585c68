use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;
use carhire_booking::{Booking, RentalPeriod};
use carhire_catalog::Car;
use carhire_core::BookingError;

use crate::error::AppError;
use crate::extract::{AppPath, AppQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CarsResponse {
    pub success: bool,
    pub currency: String,
    pub cars: Vec<Car>,
}

#[derive(Debug, Serialize)]
pub struct CarResponse {
    pub success: bool,
    pub currency: String,
    pub car: Car,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarAvailabilityResponse {
    pub success: bool,
    pub currency: String,
    pub car_id: Uuid,
    pub available: bool,
    pub conflicting_bookings: Vec<Booking>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/cars", get(list_cars))
        .route("/api/cars/{id}", get(get_car))
        .route("/api/cars/{id}/availability", get(car_availability))
        .route("/api/cars/{id}/stream", get(car_stream))
}

/// Car ids arrive as free text; anything that is not a UUID names no car.
pub(crate) fn parse_car_id(raw: &str) -> Result<Uuid, BookingError> {
    Uuid::parse_str(raw.trim()).map_err(|_| BookingError::CarNotFound(raw.to_string()))
}

pub async fn list_cars(State(state): State<AppState>) -> Result<Json<CarsResponse>, AppError> {
    let cars = state.repos.cars.list_listed_cars(None).await?;
    Ok(Json(CarsResponse {
        success: true,
        currency: state.currency(),
        cars,
    }))
}

pub async fn get_car(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<CarResponse>, AppError> {
    let car_id = parse_car_id(&id)?;
    let car = state
        .repos
        .cars
        .get_car(car_id)
        .await?
        .ok_or(BookingError::CarNotFound(id))?;

    Ok(Json(CarResponse {
        success: true,
        currency: state.currency(),
        car,
    }))
}

pub async fn car_availability(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> Result<Json<CarAvailabilityResponse>, AppError> {
    let car_id = parse_car_id(&id)?;
    let period = RentalPeriod::parse(
        query.pickup_date.as_deref().unwrap_or_default(),
        query.return_date.as_deref().unwrap_or_default(),
    )
    .map_err(BookingError::from)?;
    let report = state.availability.check_availability(car_id, &period).await?;

    Ok(Json(CarAvailabilityResponse {
        success: true,
        currency: state.currency(),
        car_id: report.car_id,
        available: report.available,
        conflicting_bookings: report.conflicting_bookings,
    }))
}

/// Live booking changes for one car as server-sent events.
pub async fn car_stream(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let car_id = parse_car_id(&id)?;
    if state.repos.cars.get_car(car_id).await?.is_none() {
        return Err(BookingError::CarNotFound(id).into());
    }

    let rx = state.sse_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.car_id == car_id => Event::default()
                .event(event.kind.as_str())
                .json_data(&event)
                .ok()
                .map(Ok),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(car_id = %car_id, "SSE listener fell behind: {}", e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
