use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use carhire_catalog::CatalogError;
use carhire_core::{BookingError, ErrorKind, StoreError};

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Validation(String),
    AlreadyExists(String),
    InvalidCredentials,
    Internal(anyhow::Error),
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidDateRange => StatusCode::BAD_REQUEST,
        ErrorKind::CarNotFound | ErrorKind::BookingNotFound => StatusCode::NOT_FOUND,
        ErrorKind::BookingConflict | ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::UserNotAuthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::NotPermitted => StatusCode::FORBIDDEN,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Booking(err) => {
                if err.is_transient() {
                    tracing::error!("Store unavailable: {}", err);
                } else {
                    tracing::debug!("Request rejected: {}", err);
                }
                let kind = err.kind();
                (status_for(kind), kind.as_str(), err.user_message())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, "already_exists", msg),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Booking(BookingError::StoreUnavailable(err))
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_booking_errors_map_to_http_status() {
        let cases = [
            (BookingError::InvalidDateRange("x".into()), StatusCode::BAD_REQUEST),
            (BookingError::CarNotFound("x".into()), StatusCode::NOT_FOUND),
            (BookingError::BookingConflict { car_id: Uuid::nil(), conflicting: vec![] }, StatusCode::CONFLICT),
            (BookingError::UserNotAuthenticated, StatusCode::UNAUTHORIZED),
            (BookingError::NotPermitted("x".into()), StatusCode::FORBIDDEN),
            (BookingError::StoreUnavailable(StoreError::Unavailable("down".into())), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).into_response().status(), expected);
        }
    }
}
